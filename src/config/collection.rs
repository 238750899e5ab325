//! Sizing and decoding configuration for vectors and hash tables.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{CollectionError, Result};
use crate::hash_map::{table_size, DEFAULT_BUCKET_COUNT, MAX_BUCKET_COUNT, MIN_BUCKET_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default upper bound on the slot index a vector may grow to.
pub const DEFAULT_MAX_CAPACITY: usize = u32::MAX as usize;

/// Configuration shared by [`Vector`](crate::Vector) and [`HashTable`](crate::HashTable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Number of unallocated slots a new vector starts with
    pub initial_capacity: usize,
    /// Minimum hash table size; 0 selects the library default
    pub bucket_count: usize,
    /// Borrow string and byte payloads from the input when decoding
    pub decode_in_place: bool,
    /// Largest slot count a vector may grow to
    pub max_capacity: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            bucket_count: 0,
            decode_in_place: false,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

impl CollectionConfig {
    /// Bucket count a hash table built from this configuration will use.
    pub fn effective_bucket_count(&self) -> usize {
        table_size(self.bucket_count)
    }
}

impl Config for CollectionConfig {
    fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(CollectionError::configuration("max_capacity must be greater than 0"));
        }
        if self.initial_capacity > self.max_capacity {
            return Err(CollectionError::configuration(format!(
                "initial_capacity {} exceeds max_capacity {}",
                self.initial_capacity, self.max_capacity
            )));
        }
        if self.bucket_count > MAX_BUCKET_COUNT {
            return Err(CollectionError::configuration(format!(
                "bucket_count {} exceeds the maximum of {}",
                self.bucket_count, MAX_BUCKET_COUNT
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.initial_capacity =
            parse_env_var(&format!("{}VECTOR_CAPACITY", prefix), config.initial_capacity);
        config.bucket_count = parse_env_var(&format!("{}HASH_BUCKETS", prefix), config.bucket_count);
        config.decode_in_place =
            parse_env_bool(&format!("{}DECODE_IN_PLACE", prefix), config.decode_in_place);
        config.max_capacity = parse_env_var(&format!("{}MAX_CAPACITY", prefix), config.max_capacity);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            initial_capacity: 256,
            bucket_count: 4096,
            decode_in_place: true,
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }

    fn memory_preset() -> Self {
        Self {
            initial_capacity: 0,
            bucket_count: MIN_BUCKET_COUNT,
            decode_in_place: true,
            max_capacity: 1 << 24,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            initial_capacity: 64,
            bucket_count: DEFAULT_BUCKET_COUNT,
            decode_in_place: false,
            max_capacity: 1 << 20,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            CollectionError::configuration(format!("Failed to serialize collection config: {}", e))
        })?;
        std::fs::write(path, serialized).map_err(|e| {
            CollectionError::configuration(format!("Failed to write collection config file: {}", e))
        })?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CollectionError::configuration(format!("Failed to read collection config file: {}", e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CollectionError::configuration(format!("Failed to parse collection config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
