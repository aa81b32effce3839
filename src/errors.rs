use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Persister failed during {op} for key {key}: {source}")]
    Persist {
        op: &'static str,
        key: String,
        #[source]
        source: PersistError,
    },
}

impl CacheError {
    pub(crate) fn persist<K: std::fmt::Debug>(op: &'static str, key: &K, source: PersistError) -> Self {
        CacheError::Persist { op, key: format!("{key:?}"), source }
    }
}

/// Invalid cache or application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("capacity must be greater than zero ({context})")]
    ZeroCapacity { context: &'static str },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown recency mode: {0}")]
    UnknownRecencyMode(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure raised by a [`Persister`](crate::persist::Persister) backend.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_error_mentions_operation_and_key() {
        let err = CacheError::persist("get", &"alice", PersistError::Backend("down".into()));
        let msg = err.to_string();
        assert!(msg.contains("get"));
        assert!(msg.contains("\"alice\""));
        assert!(msg.contains("down"));
    }

    #[test]
    fn config_error_converts_into_cache_error() {
        let err: CacheError = ConfigError::ZeroCapacity { context: "resize" }.into();
        assert!(matches!(err, CacheError::Config(ConfigError::ZeroCapacity { .. })));
        assert!(err.to_string().contains("resize"));
    }

    #[test]
    fn persist_error_keeps_source_chain() {
        use std::error::Error as _;
        let err = CacheError::persist("put", &7u32, PersistError::Backend("disk full".into()));
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert_eq!(source, "backend error: disk full");
    }
}
