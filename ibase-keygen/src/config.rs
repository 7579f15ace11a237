//! Keygen configuration, read from `keygen.toml`.
//!
//! ```toml
//! digest = "sha256"        # or "fallback"
//! secret_key_min_len = 8
//! ```

use crate::digest::DigestKind;
use crate::error::{KeygenError, KeygenResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

fn default_secret_key_min_len() -> usize {
    8
}

/// Configuration for validation and derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeygenConfig {
    /// Digest backend. The fallback is never picked implicitly.
    #[serde(default)]
    pub digest: DigestKind,
    /// Minimum secret key length after trimming.
    #[serde(default = "default_secret_key_min_len")]
    pub secret_key_min_len: usize,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            digest: DigestKind::default(),
            secret_key_min_len: default_secret_key_min_len(),
        }
    }
}

impl KeygenConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`KeygenError::Config`] if the text is not valid configuration.
    pub fn from_toml_str(contents: &str) -> KeygenResult<Self> {
        toml::from_str(contents).map_err(|e| KeygenError::Config(e.to_string()))
    }

    /// Loads configuration from a file.
    /// Falls back to defaults with a warning if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No keygen config found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!(digest = ?config.digest, "Loaded keygen config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse keygen config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read keygen config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
