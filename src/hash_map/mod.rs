//! Hash table with globally ordered iteration
//!
//! - [`HashTable`]: fixed bucket count, per-bucket key order, one chain across
//!   all buckets
//! - [`one_at_a_time`], [`table_size`], [`bucket_index`]: hashing and sizing

mod bucket;
mod hash_functions;
mod hash_table;

pub use hash_functions::{
    bucket_index, one_at_a_time, table_size, DEFAULT_BUCKET_COUNT, MAX_BUCKET_COUNT,
    MIN_BUCKET_COUNT,
};
pub use hash_table::{HashNode, HashTable, Iter};
