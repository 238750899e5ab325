//! Sparse ordered vector and the interface shared by every collection
//!
//! - **`Vector`** - index-addressable slots with an allocated-order chain
//! - **`Collection`** - operations [`Vector`] and [`HashTable`](crate::HashTable)
//!   both provide, used by [`Shared`](crate::thread::Shared)

use std::cmp::Ordering;

use crate::error::Result;
use crate::types::TypeDescriptor;

mod vector;

pub use vector::{Iter, RemovedEntry, SortOrder, Vector, VectorNode};

/// Whole-collection operations common to vectors and hash tables.
pub trait Collection<'a>: Sized {
    /// Number of entries.
    fn len(&self) -> usize;

    /// True when there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    fn clear(&mut self);

    /// Copy through the stored descriptors.
    fn copy(&self) -> Self;

    /// Entry-by-entry ordering.
    fn compare(&self, other: &Self) -> Ordering;

    /// Key descriptor.
    fn key_type(&self) -> &'static TypeDescriptor;

    /// JSON rendering.
    fn to_json(&self) -> String;

    /// XML rendering under `element`.
    fn to_xml(&self, element: &str, indent: bool) -> String;

    /// Wire encoding.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Check internal link consistency.
    fn verify_links(&self) -> Result<()>;
}
