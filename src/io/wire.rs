//! Versioned binary wire format shared by [`Vector`] and [`HashTable`]
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! u16 marker | u32 version | i16 key type index | u64 entry count
//! entry*: i16 value type index | value bytes | key bytes
//! ```
//!
//! Fixed-width values are written in their little-endian representation,
//! `bool` as one byte and `null` as nothing. Strings and byte arrays are a
//! `u64` length followed by the payload. Nested containers embed a complete
//! blob of their own.

use std::borrow::Cow;

use super::data_input::{DataInput, SliceDataInput};
use super::data_output::DataOutput;
use crate::containers::Vector;
use crate::error::{CollectionError, Result};
use crate::hash_map::HashTable;
use crate::types::{registry, TypeDescriptor, Value, ValueKind};

/// Marker opening every encoded container (`"DS"` as little-endian bytes).
pub const WIRE_MARKER: u16 = 0x5344;

/// The only format version this library reads or writes.
pub const WIRE_VERSION: u32 = 10;

/// Encoded size of the container header.
pub const HEADER_LEN: usize = 2 + 4 + 2 + 8;

/// Decoded container header.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    /// Descriptor named by the key type index
    pub key_type: &'static TypeDescriptor,
    /// Declared number of entries
    pub count: u64,
}

/// Outcome of decoding a container.
///
/// Decoding stops at the first malformed entry; the entries read before it
/// are kept and the failure is reported in `error`. `consumed` then ends at
/// the start of the malformed entry.
#[derive(Debug)]
pub struct Decoded<T> {
    /// The decoded (possibly partial) container
    pub value: T,
    /// Bytes taken by the header and the fully decoded entries
    pub consumed: usize,
    /// Failure that ended decoding early, if any
    pub error: Option<CollectionError>,
}

impl<T> Decoded<T> {
    /// Whether every declared entry was decoded.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The container, or the error if decoding stopped early.
    pub fn into_result(self) -> Result<T> {
        match self.error {
            None => Ok(self.value),
            Some(e) => Err(e),
        }
    }

    /// Transform the decoded container, keeping the offset and any error.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            consumed: self.consumed,
            error: self.error,
        }
    }
}

/// A container that can be written to and rebuilt from the wire format.
pub(crate) trait WireContainer<'a>: Sized {
    /// Key type index to advertise in the header.
    fn wire_key_type(&self) -> Result<&'static TypeDescriptor>;

    /// Number of entries that will be written.
    fn wire_len(&self) -> usize;

    /// Visit entries in traversal order.
    fn visit_entries<F>(&self, visit: F) -> Result<()>
    where
        F: FnMut(Option<&Value<'a>>, &Value<'a>, &'static TypeDescriptor) -> Result<()>;

    /// Empty container for a decoded header.
    fn from_header(key_type: &'static TypeDescriptor, capacity_hint: usize) -> Result<Self>;

    /// Append one decoded entry.
    fn push_decoded(
        &mut self,
        key: Value<'a>,
        value: Value<'a>,
        value_type: &'static TypeDescriptor,
    ) -> Result<()>;
}

/// Write the container header.
pub fn write_header<O: DataOutput + ?Sized>(
    out: &mut O,
    key_type: &TypeDescriptor,
    count: u64,
) -> Result<()> {
    out.write_u16(WIRE_MARKER)?;
    out.write_u32(WIRE_VERSION)?;
    out.write_i16(key_type.index())?;
    out.write_u64(count)
}

/// Read and validate the container header.
pub fn read_header(input: &mut SliceDataInput<'_>) -> Result<Header> {
    let start = input.pos();
    let marker = input.read_u16()?;
    if marker != WIRE_MARKER {
        return Err(CollectionError::corrupt(
            start,
            format!("unknown marker {:#06x}", marker),
        ));
    }
    let version_at = input.pos();
    let version = input.read_u32()?;
    if version != WIRE_VERSION {
        return Err(CollectionError::corrupt(
            version_at,
            format!("unsupported version {}", version),
        ));
    }
    let key_type = read_type(input)?;
    let count = input.read_u64()?;
    Ok(Header { key_type, count })
}

/// Read a type index and resolve it through the registry.
pub fn read_type(input: &mut SliceDataInput<'_>) -> Result<&'static TypeDescriptor> {
    let at = input.pos();
    let index = input.read_i16()?;
    if index < 1 {
        return Err(CollectionError::corrupt(at, format!("invalid type index {}", index)));
    }
    registry()
        .get(index)
        .ok_or_else(|| CollectionError::corrupt(at, format!("unregistered type index {}", index)))
}

/// Append the encoding of a single value.
pub fn encode_value<O: DataOutput + ?Sized>(value: &Value<'_>, out: &mut O) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Bool(v) => out.write_u8(u8::from(*v)),
        Value::I8(v) => out.write_u8(*v as u8),
        Value::I16(v) => out.write_u16(*v as u16),
        Value::I32(v) => out.write_u32(*v as u32),
        Value::I64(v) => out.write_u64(*v as u64),
        Value::U8(v) => out.write_u8(*v),
        Value::U16(v) => out.write_u16(*v),
        Value::U32(v) => out.write_u32(*v),
        Value::U64(v) => out.write_u64(*v),
        Value::F32(v) => out.write_u32(v.to_bits()),
        Value::F64(v) => out.write_u64(v.to_bits()),
        Value::Str(s) => out.write_length_prefixed_bytes(s.as_bytes()),
        Value::Bytes(b) => out.write_length_prefixed_bytes(b),
        Value::Vector(v) => encode_container(v.as_ref(), out),
        Value::HashTable(t) => encode_container(t.as_ref(), out),
    }
}

/// Decode a single value of `kind`.
///
/// With `in_place`, string and byte payloads borrow from the input buffer.
/// Nested containers always allocate their own structure and must decode
/// completely.
pub fn decode_value<'a>(
    kind: ValueKind,
    input: &mut SliceDataInput<'a>,
    in_place: bool,
) -> Result<Value<'a>> {
    Ok(match kind {
        ValueKind::Null => Value::Null,
        ValueKind::Bool => Value::Bool(input.read_u8()? != 0),
        ValueKind::I8 => Value::I8(input.read_i8()?),
        ValueKind::I16 => Value::I16(input.read_i16()?),
        ValueKind::I32 => Value::I32(input.read_i32()?),
        ValueKind::I64 => Value::I64(input.read_i64()?),
        ValueKind::U8 => Value::U8(input.read_u8()?),
        ValueKind::U16 => Value::U16(input.read_u16()?),
        ValueKind::U32 => Value::U32(input.read_u32()?),
        ValueKind::U64 => Value::U64(input.read_u64()?),
        ValueKind::F32 => Value::F32(input.read_f32()?),
        ValueKind::F64 => Value::F64(input.read_f64()?),
        ValueKind::Str => {
            let at = input.pos();
            let payload = read_payload(input)?;
            let text = std::str::from_utf8(payload)
                .map_err(|e| CollectionError::corrupt(at, format!("invalid UTF-8 string: {}", e)))?;
            Value::Str(if in_place {
                Cow::Borrowed(text)
            } else {
                Cow::Owned(text.to_owned())
            })
        }
        ValueKind::Bytes => {
            let payload = read_payload(input)?;
            Value::Bytes(if in_place {
                Cow::Borrowed(payload)
            } else {
                Cow::Owned(payload.to_vec())
            })
        }
        ValueKind::Vector => Value::Vector(Box::new(decode_nested::<Vector<'a>>(input, in_place)?)),
        ValueKind::HashTable => {
            Value::HashTable(Box::new(decode_nested::<HashTable<'a>>(input, in_place)?))
        }
    })
}

fn read_payload<'a>(input: &mut SliceDataInput<'a>) -> Result<&'a [u8]> {
    let at = input.pos();
    let len = input.read_u64()?;
    let len = usize::try_from(len)
        .ok()
        .filter(|len| *len <= input.remaining())
        .ok_or_else(|| {
            CollectionError::truncated(at, len.min(usize::MAX as u64) as usize, input.remaining())
        })?;
    input.read_slice(len)
}

fn decode_nested<'a, C: WireContainer<'a>>(
    input: &mut SliceDataInput<'a>,
    in_place: bool,
) -> Result<C> {
    let base = input.pos();
    let decoded = decode_container::<C>(input.remaining_slice(), in_place)
        .map_err(|e| e.offset_by(base))?;
    let consumed = decoded.consumed;
    let container = decoded.into_result().map_err(|e| e.offset_by(base))?;
    input.skip(consumed)?;
    Ok(container)
}

/// Write a whole container: header, then every entry in traversal order.
pub(crate) fn encode_container<'a, C, O>(container: &C, out: &mut O) -> Result<()>
where
    C: WireContainer<'a>,
    O: DataOutput + ?Sized,
{
    let key_type = container.wire_key_type()?;
    write_header(out, key_type, container.wire_len() as u64)?;
    container.visit_entries(|key, value, value_type| {
        if !value_type.accepts(value) {
            return Err(CollectionError::invalid_argument(format!(
                "{} value recorded with type {}",
                value.kind(),
                value_type.name()
            )));
        }
        out.write_i16(value_type.owning().index())?;
        encode_value(value, out)?;
        match key {
            Some(key) => key_type.encode(key, out),
            None if key_type.kind() == ValueKind::Null => Ok(()),
            None => Err(CollectionError::invalid_argument(format!(
                "entry without a key cannot be encoded under key type {}",
                key_type.name()
            ))),
        }
    })
}

/// Rebuild a container from `bytes`.
///
/// Header problems are returned as errors. Entry problems end decoding with
/// the entries read so far kept in the returned [`Decoded`].
pub(crate) fn decode_container<'a, C: WireContainer<'a>>(
    bytes: &'a [u8],
    in_place: bool,
) -> Result<Decoded<C>> {
    let mut input = SliceDataInput::new(bytes);
    let header = read_header(&mut input).map_err(|e| {
        log::error!("rejecting encoded container: {}", e);
        e
    })?;

    let borrow = |descriptor: &'static TypeDescriptor| {
        if in_place && !descriptor.kind().is_container() {
            descriptor.no_copy()
        } else {
            descriptor.owning()
        }
    };

    // Cap the pre-size by what the input could possibly hold.
    let hint = usize::try_from(header.count)
        .unwrap_or(usize::MAX)
        .min(input.remaining());
    let mut container = C::from_header(borrow(header.key_type), hint)?;

    let mut error = None;
    let mut decoded: u64 = 0;
    let mut consumed = input.pos();
    while decoded < header.count {
        let entry = read_type(&mut input).and_then(|value_type| {
            let value = decode_value(value_type.kind(), &mut input, in_place)?;
            let key = decode_value(header.key_type.kind(), &mut input, in_place)?;
            Ok((key, value, borrow(value_type)))
        });
        match entry.and_then(|(key, value, value_type)| container.push_decoded(key, value, value_type)) {
            Ok(()) => {
                decoded += 1;
                consumed = input.pos();
            }
            Err(e) => {
                log::error!(
                    "decoding stopped after {} of {} entries: {}",
                    decoded,
                    header.count,
                    e
                );
                error = Some(e);
                break;
            }
        }
    }

    log::trace!(
        "decoded {} entries from {} bytes (in_place={})",
        decoded,
        consumed,
        in_place
    );
    Ok(Decoded {
        value: container,
        consumed,
        error,
    })
}
