use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// How access recency is tracked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyMode {
    /// Append-only access history, rescanned on every ranking query.
    #[default]
    AccessLog,
    /// Linked ordering over resident keys only; O(1) promotion and victim lookup.
    Linked,
}

impl FromStr for RecencyMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "access_log" | "log" => Ok(RecencyMode::AccessLog),
            "linked" => Ok(RecencyMode::Linked),
            other => Err(ConfigError::UnknownRecencyMode(other.to_string())),
        }
    }
}

/// Configuration for the cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub recency: RecencyMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 1024, recency: RecencyMode::AccessLog }
    }
}

impl CacheConfig {
    /// # Errors
    /// Returns an error if the capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity { context: "cache config" });
        }
        Ok(())
    }

    /// Parses and validates a TOML document; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns an error on malformed TOML or an invalid value.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: CacheConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&s)
    }
}
