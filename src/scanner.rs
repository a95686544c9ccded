//! Known-hash file scanner.
//!
//! Hashes a file with MD5 and flags it when the digest is on the
//! known-threat list.

use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use md5::{Digest, Md5};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the digest, as printed next to it.
pub const DIGEST_NAME: &str = "MD5";

/// Digests of the two sample payloads, `hello` and `test`.
const DEFAULT_KNOWN_HASHES: [&str; 2] = [
    "5d41402abc4b2a76b9719d911017c592",
    "098f6bcd4621d373cade4e832627b4f6",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Lowercase hex MD5 digests treated as threats.
    pub known_hashes: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            known_hashes: DEFAULT_KNOWN_HASHES.iter().map(|h| h.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanVerdict {
    pub path: PathBuf,
    pub digest: String,
    pub threat: bool,
}

impl ScanVerdict {
    pub fn message(&self) -> &'static str {
        if self.threat {
            "Threat Detected!"
        } else {
            "File is clean."
        }
    }
}

pub struct HashScanner {
    known: HashSet<String>,
}

impl HashScanner {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            known: config
                .known_hashes
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn scan(&self, path: &Path) -> Result<ScanVerdict> {
        let digest = digest_file(path)?;
        let threat = self.known.contains(&digest);
        if threat {
            tracing::warn!(path = %path.display(), %digest, "known threat hash");
        }
        Ok(ScanVerdict {
            path: path.to_path_buf(),
            digest,
            threat,
        })
    }
}

impl Default for HashScanner {
    fn default() -> Self {
        Self::new(&ScannerConfig::default())
    }
}

/// Streaming MD5 of a file, as lowercase hex.
pub fn digest_file(path: &Path) -> Result<String> {
    let io_err = |source| DeskError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut hasher = Md5::new();
    std::io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(hex::encode(hasher.finalize()))
}
