use crate::checker::CheckerConfig;
use crate::error::{DeskError, Result};
use crate::scanner::ScannerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Settings directory (default: ~/.deskctl)
    #[serde(skip)]
    pub settings_dir: PathBuf,
    /// Binaries used by `check`
    #[serde(default)]
    pub checker: CheckerConfig,
    /// Known-hash list used by `scan`
    #[serde(default)]
    pub scanner: ScannerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_dir: default_settings_dir(),
            checker: CheckerConfig::default(),
            scanner: ScannerConfig::default(),
        }
    }
}

fn default_settings_dir() -> PathBuf {
    let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home_dir.join(".deskctl")
}

impl Config {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| default_settings_dir().join("config.toml"));

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|source| DeskError::Io {
            path: config_path.clone(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|e| DeskError::Config {
            path: config_path.clone(),
            message: e.to_string(),
        })?;
        config.settings_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(default_settings_dir);
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// The config file inside the settings directory.
    pub fn file_path(&self) -> PathBuf {
        self.settings_dir.join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = path.unwrap_or_else(|| self.file_path());

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DeskError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| DeskError::Config {
            path: config_path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&config_path, content).map_err(|source| DeskError::Io {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }
}
