//! Runtime value types and the descriptors collections dispatch through
//!
//! - [`Value`]: the closed set of representations a collection can store
//! - [`TypeDescriptor`]: copy/compare/hash/render/encode capabilities for one kind
//! - [`TypeRegistry`]: stable indices used by the wire format, with custom registration

pub mod builtin;
mod descriptor;
mod registry;
mod value;

pub use builtin::*;
pub use descriptor::{compare_values, CompareFn, HashFn, Ownership, TypeDescriptor};
pub use registry::{registry, TypeRegistry};
pub use value::{Value, ValueKind};

/// Resolve the descriptor to record for `value`.
///
/// An explicit descriptor must accept the value. Otherwise `fallback` is used
/// when it matches, and the built-in descriptor for the value's kind when it
/// does not.
pub(crate) fn resolve_value_type(
    value: &Value<'_>,
    explicit: Option<&'static TypeDescriptor>,
    fallback: Option<&'static TypeDescriptor>,
) -> crate::error::Result<&'static TypeDescriptor> {
    if let Some(descriptor) = explicit {
        if descriptor.accepts(value) {
            return Ok(descriptor);
        }
        return Err(crate::error::CollectionError::invalid_argument(format!(
            "{} value does not match type {}",
            value.kind(),
            descriptor.name()
        )));
    }
    match fallback {
        Some(descriptor) if descriptor.accepts(value) => Ok(descriptor),
        _ => Ok(descriptor_for_value(value)),
    }
}
