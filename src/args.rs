use crate::config::Config;
use clap::{ArgAction, Args};
use std::path::PathBuf;

// Global flags shared across every subcommand.
//
//   -c / --config      Path to a config.toml file
//   --settings-dir     Root state directory override
//   --no-color         Disable coloured terminal output
//   -v / --verbose     Debug logging
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Path to a config.toml file
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        env = "DESKCTL_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// Settings directory (default: ~/.deskctl)
    #[arg(long, value_name = "DIR", env = "DESKCTL_SETTINGS_DIR", global = true)]
    pub settings_dir: Option<PathBuf>,

    /// Disable coloured terminal output
    #[arg(long = "no-color", action = ArgAction::SetTrue, global = true)]
    pub no_color: bool,

    /// Verbose (debug) logging
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(config) = &self.config {
            return Some(config.clone());
        }
        self.settings_dir
            .as_ref()
            .map(|dir| dir.join("config.toml"))
    }

    pub fn load_config(&self) -> crate::error::Result<Config> {
        let mut config = Config::load(self.config_path())?;
        if let Some(dir) = &self.settings_dir {
            config.settings_dir = dir.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_wins() {
        let args = CommonArgs {
            config: Some(PathBuf::from("/etc/deskctl.toml")),
            settings_dir: Some(PathBuf::from("/tmp/desk")),
            ..Default::default()
        };
        assert_eq!(args.config_path(), Some(PathBuf::from("/etc/deskctl.toml")));
    }

    #[test]
    fn settings_dir_implies_config_file() {
        let args = CommonArgs {
            settings_dir: Some(PathBuf::from("/tmp/desk")),
            ..Default::default()
        };
        assert_eq!(
            args.config_path(),
            Some(PathBuf::from("/tmp/desk/config.toml"))
        );
    }

    #[test]
    fn settings_dir_overrides_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = CommonArgs {
            settings_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.settings_dir, dir.path());
    }
}
