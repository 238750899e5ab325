//! Per-instance locking for collections shared between threads
//!
//! Plain [`Vector`](crate::Vector) and [`HashTable`](crate::HashTable) values
//! take `&mut self` for mutation and carry no locking overhead. Wrapping one in
//! [`Shared`] gives it a re-entrant lock that serializes every call from
//! other threads while letting the owning thread nest read calls.

mod shared;

pub use shared::Shared;
