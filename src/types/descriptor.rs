//! Type descriptors: the capability records collections dispatch through.
//!
//! A container never inspects a value directly. Copying, ordering, hashing,
//! rendering and binary encoding all go through the [`TypeDescriptor`] recorded
//! alongside the key or value. Each descriptor comes in a pair: the owning
//! variant deep-copies on [`copy`](TypeDescriptor::copy), while the no-copy
//! variant shares whatever the value already references (in-place decoded
//! payloads stay borrowed).

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use super::registry::registry;
use super::value::{Value, ValueKind};
use crate::error::{CollectionError, Result};
use crate::hash_map::one_at_a_time;
use crate::io::{json, wire, xml, DataOutput, SliceDataInput, VecDataOutput};

/// Total order over two values described by the same descriptor.
pub type CompareFn = for<'x, 'y> fn(&Value<'x>, &Value<'y>) -> Ordering;

/// Custom hash over a value; reduced modulo the bucket count by the caller.
pub type HashFn = for<'x> fn(&Value<'x>) -> u64;

/// Whether copying through a descriptor clones payloads or shares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Copies are independent deep clones
    Owned,
    /// Copies share borrowed payloads; the no-copy sibling
    Shared,
}

/// Immutable, globally registered capability record for one kind of value.
pub struct TypeDescriptor {
    name: &'static str,
    kind: ValueKind,
    ownership: Ownership,
    index: i16,
    compare: CompareFn,
    hash: Option<HashFn>,
}

impl TypeDescriptor {
    pub(crate) const fn new(
        name: &'static str,
        kind: ValueKind,
        ownership: Ownership,
        index: i16,
        compare: CompareFn,
        hash: Option<HashFn>,
    ) -> Self {
        Self { name, kind, ownership, index, compare, hash }
    }

    /// Registered name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Representation of values described by this descriptor.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Owning or no-copy.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Stable registry index written to the wire format.
    pub fn index(&self) -> i16 {
        self.index
    }

    /// Whether copies through this descriptor are independent.
    pub fn is_owning(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    /// Whether a custom hash function overrides byte-derived hashing.
    pub fn has_custom_hash(&self) -> bool {
        self.hash.is_some()
    }

    /// The owning member of this descriptor's pair.
    pub fn owning(&'static self) -> &'static TypeDescriptor {
        match self.ownership {
            Ownership::Owned => self,
            Ownership::Shared => registry().get(self.index - 1).unwrap_or(self),
        }
    }

    /// The no-copy member of this descriptor's pair.
    pub fn no_copy(&'static self) -> &'static TypeDescriptor {
        match self.ownership {
            Ownership::Shared => self,
            Ownership::Owned => registry().get(self.index + 1).unwrap_or(self),
        }
    }

    /// Whether `value` has the representation this descriptor handles.
    pub fn accepts(&self, value: &Value<'_>) -> bool {
        value.kind() == self.kind
    }

    /// Copy a value the way this descriptor owns it.
    ///
    /// The owning variant produces a deep copy free of borrowed payloads; the
    /// no-copy variant shares borrowed payloads with the source.
    pub fn copy<'a>(&self, value: &Value<'a>) -> Value<'a> {
        match self.ownership {
            Ownership::Owned => value.to_owned_value(),
            Ownership::Shared => value.clone(),
        }
    }

    /// Order two values.
    pub fn compare(&self, a: &Value<'_>, b: &Value<'_>) -> Ordering {
        (self.compare)(a, b)
    }

    /// Hash a value: the custom hash when registered, otherwise a one-at-a-time
    /// hash over the value's bytes.
    pub fn hash(&self, value: &Value<'_>) -> u64 {
        match self.hash {
            Some(hash) => hash(value),
            None => one_at_a_time(&self.hash_bytes(value)),
        }
    }

    /// Bytes the default hash is derived from.
    ///
    /// Fixed-width values contribute their little-endian representation,
    /// strings and byte arrays their payload, and containers their serialized
    /// form.
    pub fn hash_bytes<'v>(&self, value: &'v Value<'_>) -> Cow<'v, [u8]> {
        match value {
            Value::Str(s) => Cow::Borrowed(s.as_bytes()),
            Value::Bytes(b) => Cow::Borrowed(b.as_ref()),
            Value::Vector(_) | Value::HashTable(_) => {
                let mut out = VecDataOutput::new();
                match wire::encode_value(value, &mut out) {
                    Ok(()) => Cow::Owned(out.into_vec()),
                    Err(e) => {
                        log::warn!("hashing {} by its JSON form: {}", self.name, e);
                        Cow::Owned(json::value_to_json(value).into_bytes())
                    }
                }
            }
            _ => {
                let mut out = VecDataOutput::with_capacity(8);
                // Fixed-width encodings write to memory and cannot fail.
                let _ = wire::encode_value(value, &mut out);
                Cow::Owned(out.into_vec())
            }
        }
    }

    /// Approximate in-memory size of a value.
    pub fn size_of(&self, value: &Value<'_>) -> usize {
        match value {
            Value::Str(s) => s.len(),
            Value::Bytes(b) => b.len(),
            Value::Vector(_) => std::mem::size_of::<crate::containers::Vector<'_>>(),
            Value::HashTable(_) => std::mem::size_of::<crate::hash_map::HashTable<'_>>(),
            other => other.kind().fixed_width().unwrap_or(0),
        }
    }

    /// Plain-text rendering.
    pub fn render(&self, value: &Value<'_>) -> String {
        value.to_string()
    }

    /// JSON rendering.
    pub fn to_json(&self, value: &Value<'_>) -> String {
        json::value_to_json(value)
    }

    /// XML rendering with `element` as the enclosing tag.
    pub fn to_xml(&self, value: &Value<'_>, element: &str, indent: bool) -> String {
        xml::value_to_xml(value, element, indent)
    }

    /// Append the wire encoding of `value`.
    pub fn encode<O: DataOutput + ?Sized>(&self, value: &Value<'_>, out: &mut O) -> Result<()> {
        if !self.accepts(value) {
            return Err(CollectionError::invalid_argument(format!(
                "cannot encode a {} value as {}",
                value.kind(),
                self.name
            )));
        }
        wire::encode_value(value, out)
    }

    /// Decode one value, borrowing string and byte payloads when `in_place`.
    pub fn decode<'a>(&self, input: &mut SliceDataInput<'a>, in_place: bool) -> Result<Value<'a>> {
        wire::decode_value(self.kind, input, in_place)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ownership", &self.ownership)
            .field("index", &self.index)
            .field("custom_hash", &self.hash.is_some())
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Default comparison: values of different kinds order by kind, values of the
/// same kind by their natural order. Floats use `total_cmp`, containers compare
/// entry by entry.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::I8(x), Value::I8(y)) => x.cmp(y),
        (Value::I16(x), Value::I16(y)) => x.cmp(y),
        (Value::I32(x), Value::I32(y)) => x.cmp(y),
        (Value::I64(x), Value::I64(y)) => x.cmp(y),
        (Value::U8(x), Value::U8(y)) => x.cmp(y),
        (Value::U16(x), Value::U16(y)) => x.cmp(y),
        (Value::U32(x), Value::U32(y)) => x.cmp(y),
        (Value::U64(x), Value::U64(y)) => x.cmp(y),
        (Value::F32(x), Value::F32(y)) => x.total_cmp(y),
        (Value::F64(x), Value::F64(y)) => x.total_cmp(y),
        (Value::Str(x), Value::Str(y)) => x.as_ref().cmp(y.as_ref()),
        (Value::Bytes(x), Value::Bytes(y)) => x.as_ref().cmp(y.as_ref()),
        (Value::Vector(x), Value::Vector(y)) => x.compare(y),
        (Value::HashTable(x), Value::HashTable(y)) => x.compare(y),
        _ => a.kind().cmp(&b.kind()),
    }
}
