use std::io::Write;
use throughcache::cache::{BoundedCache, CacheConfig, RecencyMode};
use throughcache::errors::{CacheError, ConfigError};
use throughcache::item::EmployeeRecord;
use throughcache::persist::MemoryPersister;

#[test]
fn config_file_round_trip_into_cache() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "capacity = 5\nrecency = \"linked\"").unwrap();

    let cfg = CacheConfig::from_path(file.path()).unwrap();
    assert_eq!(cfg, CacheConfig { capacity: 5, recency: RecencyMode::Linked });

    let cache: BoundedCache<EmployeeRecord, _> = BoundedCache::with_config(&cfg, MemoryPersister::new()).unwrap();
    assert_eq!(cache.capacity(), 5);
    assert_eq!(cache.recency_mode(), RecencyMode::Linked);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let err = CacheConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = CacheConfig::from_toml_str("capacity = \"many\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn unknown_recency_mode_in_toml_is_rejected() {
    assert!(CacheConfig::from_toml_str("recency = \"fifo\"").is_err());
}

#[test]
fn invalid_config_never_builds_a_cache() {
    let cfg = CacheConfig { capacity: 0, recency: RecencyMode::AccessLog };
    let res: Result<BoundedCache<EmployeeRecord, _>, _> = BoundedCache::with_config(&cfg, MemoryPersister::new());
    assert!(matches!(res, Err(CacheError::Config(ConfigError::ZeroCapacity { .. }))));
}

#[test]
fn config_serializes_back_to_toml() {
    let cfg = CacheConfig { capacity: 7, recency: RecencyMode::AccessLog };
    let text = toml::to_string(&cfg).unwrap();
    assert!(text.contains("capacity = 7"));
    assert!(text.contains("recency = \"access_log\""));
}
