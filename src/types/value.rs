//! Runtime-typed values stored in collections.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use super::descriptor::compare_values;
use crate::containers::Vector;
use crate::hash_map::HashTable;

/// The closed set of value representations a collection can hold.
///
/// Custom type descriptors reuse one of these kinds and override comparison
/// or hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    /// Absent value
    Null,
    /// Boolean
    Bool,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// UTF-8 string
    Str,
    /// Raw bytes
    Bytes,
    /// Nested [`Vector`]
    Vector,
    /// Nested [`HashTable`]
    HashTable,
}

impl ValueKind {
    /// Lower-case name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "string",
            Self::Bytes => "bytes",
            Self::Vector => "vector",
            Self::HashTable => "hash_table",
        }
    }

    /// Containers own allocated top-level structure even when decoded in place.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Vector | Self::HashTable)
    }

    /// Encoded width of fixed-size kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Null => Some(0),
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::Str | Self::Bytes | Self::Vector | Self::HashTable => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value held by a [`Vector`] or [`HashTable`].
///
/// `Str` and `Bytes` borrow from a decode buffer when a container is decoded in
/// place; every other representation is owned.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed 8-bit integer
    I8(i8),
    /// Signed 16-bit integer
    I16(i16),
    /// Signed 32-bit integer
    I32(i32),
    /// Signed 64-bit integer
    I64(i64),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// UTF-8 string
    Str(Cow<'a, str>),
    /// Raw bytes
    Bytes(Cow<'a, [u8]>),
    /// Nested vector
    Vector(Box<Vector<'a>>),
    /// Nested hash table
    HashTable(Box<HashTable<'a>>),
}

impl<'a> Value<'a> {
    /// The representation of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Str(_) => ValueKind::Str,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Vector(_) => ValueKind::Vector,
            Self::HashTable(_) => ValueKind::HashTable,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether a string or byte payload borrows from another buffer.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Str(Cow::Borrowed(_)) | Self::Bytes(Cow::Borrowed(_)))
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer payload that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v),
            Self::U8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any non-negative integer payload.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => Some(v),
            _ => self.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    /// Float payload.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v.into()),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Byte payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b.as_ref()),
            _ => None,
        }
    }

    /// Nested vector.
    pub fn as_vector(&self) -> Option<&Vector<'a>> {
        match self {
            Self::Vector(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    /// Mutable nested vector.
    pub fn as_vector_mut(&mut self) -> Option<&mut Vector<'a>> {
        match self {
            Self::Vector(v) => Some(v.as_mut()),
            _ => None,
        }
    }

    /// Nested hash table.
    pub fn as_hash_table(&self) -> Option<&HashTable<'a>> {
        match self {
            Self::HashTable(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    /// Mutable nested hash table.
    pub fn as_hash_table_mut(&mut self) -> Option<&mut HashTable<'a>> {
        match self {
            Self::HashTable(t) => Some(t.as_mut()),
            _ => None,
        }
    }

    /// Deep copy that owns every payload, including those nested in containers.
    pub fn to_owned_value(&self) -> Value<'static> {
        match self {
            Self::Null => Value::Null,
            Self::Bool(v) => Value::Bool(*v),
            Self::I8(v) => Value::I8(*v),
            Self::I16(v) => Value::I16(*v),
            Self::I32(v) => Value::I32(*v),
            Self::I64(v) => Value::I64(*v),
            Self::U8(v) => Value::U8(*v),
            Self::U16(v) => Value::U16(*v),
            Self::U32(v) => Value::U32(*v),
            Self::U64(v) => Value::U64(*v),
            Self::F32(v) => Value::F32(*v),
            Self::F64(v) => Value::F64(*v),
            Self::Str(s) => Value::Str(Cow::Owned(s.to_string())),
            Self::Bytes(b) => Value::Bytes(Cow::Owned(b.to_vec())),
            Self::Vector(v) => Value::Vector(Box::new(v.to_owned_vector())),
            Self::HashTable(t) => Value::HashTable(Box::new(t.to_owned_table())),
        }
    }

    /// Detach the value from any borrowed buffer.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Self::Str(s) => Value::Str(Cow::Owned(s.into_owned())),
            Self::Bytes(b) => Value::Bytes(Cow::Owned(b.into_owned())),
            Self::Vector(v) => Value::Vector(Box::new((*v).into_owned())),
            Self::HashTable(t) => Value::HashTable(Box::new((*t).into_owned())),
            other => other.to_owned_value(),
        }
    }
}

impl<'a, 'b> PartialEq<Value<'b>> for Value<'a> {
    fn eq(&self, other: &Value<'b>) -> bool {
        compare_values(self, other) == Ordering::Equal
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Str(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Self::Vector(v) => write!(f, "{}", v),
            Self::HashTable(t) => write!(f, "{}", t),
        }
    }
}

macro_rules! value_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<$ty> for Value<'a> {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(Cow::Borrowed(s))
    }
}

impl<'a> From<String> for Value<'a> {
    fn from(s: String) -> Self {
        Self::Str(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(Cow::Borrowed(b))
    }
}

impl<'a> From<Vec<u8>> for Value<'a> {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(Cow::Owned(b))
    }
}

impl<'a> From<Vector<'a>> for Value<'a> {
    fn from(v: Vector<'a>) -> Self {
        Self::Vector(Box::new(v))
    }
}

impl<'a> From<HashTable<'a>> for Value<'a> {
    fn from(t: HashTable<'a>) -> Self {
        Self::HashTable(Box::new(t))
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::from(1i32).kind(), ValueKind::I32);
        assert_eq!(Value::from("x").kind(), ValueKind::Str);
        assert_eq!(Value::from(vec![1u8, 2]).kind(), ValueKind::Bytes);
        assert_eq!(Value::from(None::<i32>).kind(), ValueKind::Null);
        assert!(ValueKind::Vector.is_container());
        assert!(!ValueKind::Str.is_container());
        assert_eq!(ValueKind::U16.fixed_width(), Some(2));
        assert_eq!(ValueKind::Str.fixed_width(), None);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(7u8).as_i64(), Some(7));
        assert_eq!(Value::from(-7i16).as_u64(), None);
        assert_eq!(Value::from(u64::MAX).as_i64(), None);
        assert_eq!(Value::from(1.5f32).as_f64(), Some(1.5));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::from("abc").as_bytes().is_none());
    }

    #[test]
    fn test_ownership() {
        let text = String::from("borrowed");
        let value = Value::from(text.as_str());
        assert!(value.is_borrowed());
        let owned = value.to_owned_value();
        assert!(!owned.is_borrowed());
        assert_eq!(owned, value);
        assert!(!Value::from(String::from("x")).into_owned().is_borrowed());
    }

    #[test]
    fn test_equality_is_kind_sensitive() {
        assert_eq!(Value::from(3i32), Value::from(3i32));
        assert_ne!(Value::from(3i32), Value::from(3i64));
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(-12i64).to_string(), "-12");
        assert_eq!(Value::from(b"hi".to_vec()).to_string(), "hi");
    }
}
