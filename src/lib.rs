//! # Ordered Collections: Runtime-Typed Ordered Containers
//!
//! This crate provides two containers over values whose types are chosen at
//! runtime through type descriptors, plus a versioned binary format and JSON
//! rendering shared by both.
//!
//! ## Key Features
//!
//! - **Sparse Vector**: index-addressable slots threaded into one allocated-order chain
//! - **Ordered Hash Table**: fixed bucket count, key-ordered buckets stitched into a single global order
//! - **Type Descriptors**: copy, compare, hash, render and encode dispatched per value type, with custom registration
//! - **Wire Format**: versioned little-endian encoding with zero-copy (in-place) decoding
//! - **JSON and XML**: rendering for both containers, JSON parsing into either, XML reading into hash tables
//! - **Shared Access**: re-entrant per-instance locking for use across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use ordered_collections::{HashTable, Value, Vector, TYPE_STRING};
//! # fn main() -> ordered_collections::Result<()> {
//! ordered_collections::init();
//!
//! // Sparse vector: iteration follows slot index, gaps are skipped
//! let mut vector = Vector::new(&TYPE_STRING);
//! vector.set_entry(4, None, Value::from("marklar"), None)?;
//! vector.set_entry(1, None, Value::I32(7), None)?;
//! assert_eq!(vector.iter().map(|(index, _)| index).collect::<Vec<_>>(), vec![1, 4]);
//!
//! // Hash table built from JSON, encoded and decoded in place
//! let table = HashTable::from_json(r#"{"key1": "value1", "key2": [1, 2]}"#)?;
//! let bytes = table.to_bytes()?;
//! let decoded = HashTable::from_bytes(&bytes, true)?.into_result()?;
//! assert_eq!(decoded.get_value(&"key1".into()), Some(&Value::from("value1")));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod containers;
pub mod error;
pub mod hash_map;
pub mod io;
pub mod thread;
pub mod types;

// Re-export core types
pub use config::{CollectionConfig, Config};
pub use containers::{Collection, SortOrder, Vector, VectorNode};
pub use error::{CollectionError, Result};
pub use hash_map::{HashNode, HashTable};
pub use io::{Decoded, WIRE_MARKER, WIRE_VERSION};
pub use thread::Shared;
pub use types::{
    registry, Ownership, TypeDescriptor, Value, ValueKind, TYPE_BOOL, TYPE_BYTES, TYPE_F32,
    TYPE_F64, TYPE_HASH_TABLE, TYPE_I16, TYPE_I32, TYPE_I64, TYPE_I8, TYPE_NULL, TYPE_STRING,
    TYPE_STRING_NO_COPY, TYPE_U16, TYPE_U32, TYPE_U64, TYPE_U8, TYPE_VECTOR,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register the built-in type descriptors.
///
/// Registration also happens on first registry access; calling this early
/// keeps it on a known thread, before collections are shared.
pub fn init() {
    let registered = registry().len();
    log::debug!(
        "Initializing ordered-collections v{} with {} type descriptors",
        VERSION,
        registered
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        init();
        assert!(registry().len() >= 32);
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_version_info() {
        assert!(VERSION.contains('.'));
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_re_exports() -> Result<()> {
        let mut vector = Vector::new(&TYPE_I32);
        vector.add_entry(None, Value::I32(1), None)?;
        let table = HashTable::new(&TYPE_STRING, 0);
        assert_eq!(table.bucket_count(), hash_map::DEFAULT_BUCKET_COUNT);

        let _err = CollectionError::invalid_argument("test");
        assert!(std::any::type_name::<Result<()>>().contains("CollectionError"));
        Ok(())
    }
}
