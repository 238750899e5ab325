//! Binary and text encodings for collections
//!
//! - [`data_input`] / [`data_output`]: little-endian primitive readers and writers
//! - [`wire`]: the versioned container format built on them
//! - [`json`]: JSON rendering and parsing
//! - [`xml`]: XML rendering and reading

pub mod data_input;
pub mod data_output;
pub mod json;
pub mod wire;
pub mod xml;

// Re-export core types
pub use data_input::{DataInput, SliceDataInput};
pub use data_output::{DataOutput, VecDataOutput, WriterDataOutput};
pub use wire::{Decoded, Header, HEADER_LEN, WIRE_MARKER, WIRE_VERSION};

// Convenience functions
pub use data_input::from_slice;
pub use data_output::{to_vec, to_writer};
