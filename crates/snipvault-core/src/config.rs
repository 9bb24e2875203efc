//! Store configuration.
//!
//! ```toml
//! [store]
//! path = "snippets.vault"
//!
//! [kdf]
//! memory_kib = 65536
//! iterations = 3
//! parallelism = 1
//!
//! [gate]
//! max_attempts = 5
//! ```
//!
//! Every section and key is optional. KDF params only apply to stores
//! created from this config; existing stores carry their own in the header.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::key::KdfParams;
use crate::error::{Result, VaultError};

/// Default store file name, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "snippets.vault";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub store: StoreSection,
    pub kdf: KdfParams,
    pub gate: GateSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSection {
    /// Refuse further unlocks after this many wrong passphrases.
    pub max_attempts: Option<u32>,
}

impl VaultConfig {
    /// Default config pointing at `store_path`.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreSection {
                path: store_path.into(),
            },
            ..Self::default()
        }
    }

    pub fn with_kdf(mut self, params: KdfParams) -> Self {
        self.kdf = params;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.gate.max_attempts = Some(max_attempts);
        self
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| VaultError::Config(format!("Invalid config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VaultError::Config(format!("TOML error: {}", e)))
    }
}
