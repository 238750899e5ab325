//! Configuration APIs for ordered-collections
//!
//! The [`Config`] trait provides validation, environment initialization, presets and
//! JSON file persistence for configuration types. [`CollectionConfig`] controls the
//! sizing and decoding defaults of [`Vector`](crate::Vector) and
//! [`HashTable`](crate::HashTable).
//!
//! # Presets
//!
//! ```rust
//! use ordered_collections::config::{CollectionConfig, Config};
//!
//! let config = CollectionConfig::performance_preset();
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use ordered_collections::config::{CollectionConfig, Config};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads ORDERED_COLLECTIONS_VECTOR_CAPACITY, ORDERED_COLLECTIONS_HASH_BUCKETS, ...
//! let config = CollectionConfig::from_env()?;
//!
//! // Or with a custom prefix
//! let config = CollectionConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod collection;

#[cfg(test)]
mod tests;

pub use collection::CollectionConfig;

/// Default prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "ORDERED_COLLECTIONS_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables using [`ENV_PREFIX`].
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables keep their default values.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring throughput over memory usage.
    fn performance_preset() -> Self;

    /// Preset favouring a small footprint.
    fn memory_preset() -> Self;

    /// Preset favouring predictable latency.
    fn realtime_preset() -> Self;

    /// Balanced preset; the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a file as pretty-printed JSON.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Utility function to parse environment variable with fallback to default.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Utility function to parse boolean environment variable.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
