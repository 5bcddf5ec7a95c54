use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Machine configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NesConfig {
    /// Report unmapped bus accesses as errors instead of reading 0.
    pub strict_bus: bool,
    /// NROM PRG RAM size in bytes, 2048 or 4096.
    pub prg_ram_size: usize,
    /// Pad short PRG/CHR images with $FF instead of rejecting them.
    pub pad_truncated_prg: bool,
}

impl Default for NesConfig {
    fn default() -> Self {
        Self {
            strict_bus: false,
            prg_ram_size: 0x1000,
            pad_truncated_prg: false,
        }
    }
}

impl NesConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
