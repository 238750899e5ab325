//! Integration tests for the configuration system: validation, presets,
//! environment parsing and file persistence.

use super::*;
use crate::error::CollectionError;
use crate::hash_map::{DEFAULT_BUCKET_COUNT, MIN_BUCKET_COUNT};
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_is_valid() {
    let config = CollectionConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.effective_bucket_count(), DEFAULT_BUCKET_COUNT);
}

#[test]
fn test_all_presets_valid() {
    assert!(CollectionConfig::performance_preset().validate().is_ok());
    assert!(CollectionConfig::memory_preset().validate().is_ok());
    assert!(CollectionConfig::realtime_preset().validate().is_ok());
    assert!(CollectionConfig::balanced_preset().validate().is_ok());
    assert_eq!(CollectionConfig::balanced_preset(), CollectionConfig::default());
}

#[test]
fn test_effective_bucket_count_rounds_up() {
    let mut config = CollectionConfig::default();
    config.bucket_count = 3;
    assert_eq!(config.effective_bucket_count(), MIN_BUCKET_COUNT);
    config.bucket_count = 100;
    assert_eq!(config.effective_bucket_count(), 100);
}

#[test]
fn test_validation_failures() {
    let mut config = CollectionConfig::default();
    config.max_capacity = 0;
    assert!(matches!(config.validate(), Err(CollectionError::Configuration { .. })));

    let mut config = CollectionConfig::default();
    config.initial_capacity = 10;
    config.max_capacity = 5;
    assert!(config.validate().is_err());

    let mut config = CollectionConfig::default();
    config.bucket_count = usize::MAX;
    assert!(config.validate().is_err());
}

#[test]
fn test_env_with_prefix() {
    let prefix = "OC_TEST_ENV_PREFIX_";
    env::set_var(format!("{}VECTOR_CAPACITY", prefix), "32");
    env::set_var(format!("{}HASH_BUCKETS", prefix), "128");
    env::set_var(format!("{}DECODE_IN_PLACE", prefix), "yes");
    env::set_var(format!("{}MAX_CAPACITY", prefix), "not-a-number");

    let config = CollectionConfig::from_env_with_prefix(prefix).unwrap();
    assert_eq!(config.initial_capacity, 32);
    assert_eq!(config.bucket_count, 128);
    assert!(config.decode_in_place);
    assert_eq!(config.max_capacity, collection::DEFAULT_MAX_CAPACITY);

    env::remove_var(format!("{}VECTOR_CAPACITY", prefix));
    env::remove_var(format!("{}HASH_BUCKETS", prefix));
    env::remove_var(format!("{}DECODE_IN_PLACE", prefix));
    env::remove_var(format!("{}MAX_CAPACITY", prefix));
}

#[test]
fn test_env_rejects_invalid_combination() {
    let prefix = "OC_TEST_ENV_INVALID_";
    env::set_var(format!("{}VECTOR_CAPACITY", prefix), "100");
    env::set_var(format!("{}MAX_CAPACITY", prefix), "10");
    assert!(CollectionConfig::from_env_with_prefix(prefix).is_err());
    env::remove_var(format!("{}VECTOR_CAPACITY", prefix));
    env::remove_var(format!("{}MAX_CAPACITY", prefix));
}

#[test]
fn test_parse_env_helpers() {
    env::set_var("OC_TEST_PARSE_NUM", "17");
    env::set_var("OC_TEST_PARSE_BOOL", "ON");
    assert_eq!(parse_env_var("OC_TEST_PARSE_NUM", 0usize), 17);
    assert_eq!(parse_env_var("OC_TEST_PARSE_MISSING", 5usize), 5);
    assert!(parse_env_bool("OC_TEST_PARSE_BOOL", false));
    assert!(parse_env_bool("OC_TEST_PARSE_MISSING", true));
    env::remove_var("OC_TEST_PARSE_NUM");
    env::remove_var("OC_TEST_PARSE_BOOL");
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("collections.json");

    let config = CollectionConfig::performance_preset();
    config.save_to_file(&path).unwrap();
    let loaded = CollectionConfig::load_from_file(&path).unwrap();
    assert_eq!(config, loaded);
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        CollectionConfig::load_from_file(&path),
        Err(CollectionError::Configuration { .. })
    ));

    let invalid = dir.path().join("invalid.json");
    fs::write(
        &invalid,
        r#"{"initial_capacity":9,"bucket_count":0,"decode_in_place":false,"max_capacity":1}"#,
    )
    .unwrap();
    assert!(CollectionConfig::load_from_file(&invalid).is_err());

    assert!(CollectionConfig::load_from_file(dir.path().join("missing.json")).is_err());
}
