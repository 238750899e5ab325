//! JSON rendering and parsing for collections
//!
//! Rendering follows a fixed layout: one element per line, nested containers
//! indented by two spaces, strings and byte arrays quoted, absent values as
//! `null`. Parsing goes through `serde_json` into a document tree that keeps
//! object members in order, duplicates included, and reports the offset
//! reached so callers can continue after the document or locate an error.

use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::containers::Vector;
use crate::error::{CollectionError, Result};
use crate::hash_map::HashTable;
use crate::types::{Value, TYPE_STRING};

/// How nested JSON objects are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStyle {
    /// Objects become [`HashTable`]s keyed by string
    HashTable,
    /// Objects become keyed [`Vector`]s, preserving member order
    KeyedVector,
}

/// Parsed JSON document. Objects are member lists rather than maps so repeated
/// keys survive until the target container decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
enum JsonNode {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Array(Vec<JsonNode>),
    Object(Vec<(String, JsonNode)>),
}

impl<'de> Deserialize<'de> for JsonNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JsonNodeVisitor)
    }
}

struct JsonNodeVisitor;

impl<'de> Visitor<'de> for JsonNodeVisitor {
    type Value = JsonNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E>(self) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(JsonNode::Null)
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(JsonNode::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(JsonNode::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(i64::try_from(v).map_or(JsonNode::UInt(v), JsonNode::Int))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(JsonNode::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(JsonNode::Str(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<JsonNode, E>
    where
        E: de::Error,
    {
        Ok(JsonNode::Str(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<JsonNode, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonNode::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<JsonNode, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = Vec::new();
        while let Some(member) = map.next_entry::<String, JsonNode>()? {
            members.push(member);
        }
        Ok(JsonNode::Object(members))
    }
}

/// Render a single value.
pub fn value_to_json(value: &Value<'_>) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::F32(v) if v.is_finite() => format!("{:?}", v),
        Value::F64(v) if v.is_finite() => format!("{:?}", v),
        Value::F32(_) | Value::F64(_) => "null".to_string(),
        Value::Str(s) => quote(s),
        Value::Bytes(b) => quote(&String::from_utf8_lossy(b)),
        Value::Vector(v) => v.to_json(),
        Value::HashTable(t) => t.to_json(),
        other => other.to_string(),
    }
}

/// JSON string literal for `text`.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Lay out pre-rendered elements as a JSON array.
pub fn render_array<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = String::from("[\n");
    let mut empty = true;
    for item in items {
        if !empty {
            out.push_str(",\n");
        }
        empty = false;
        push_indented(&mut out, &item, true);
    }
    if empty {
        return "[]".to_string();
    }
    out.push_str("\n]");
    out
}

/// Lay out pre-rendered members as a JSON object; keys are quoted here.
pub fn render_object<I>(members: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out = String::from("{\n");
    let mut empty = true;
    for (key, value) in members {
        if !empty {
            out.push_str(",\n");
        }
        empty = false;
        out.push_str("  ");
        out.push_str(&quote(&key));
        out.push_str(": ");
        push_indented(&mut out, &value, false);
    }
    if empty {
        return "{}".to_string();
    }
    out.push_str("\n}");
    out
}

fn push_indented(out: &mut String, text: &str, indent_first: bool) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if i > 0 || indent_first {
            out.push_str("  ");
        }
        out.push_str(line);
    }
}

/// Parse a `[...]` document starting at `*position` into a vector.
///
/// Elements land at consecutive indices without keys; nested objects become
/// hash tables. On return `*position` is just past the document, or at the
/// failure on error.
pub fn parse_array(text: &str, position: &mut usize) -> Result<Vector<'static>> {
    match parse_document(text, position, '[')? {
        JsonNode::Array(items) => array_to_vector(items, ObjectStyle::HashTable),
        _ => Err(CollectionError::json(*position, "expected a JSON array")),
    }
}

/// Parse a `{...}` document into a keyed vector; nested objects stay keyed vectors.
pub fn parse_keyed_object(text: &str, position: &mut usize) -> Result<Vector<'static>> {
    match parse_document(text, position, '{')? {
        JsonNode::Object(members) => object_to_keyed_vector(members),
        _ => Err(CollectionError::json(*position, "expected a JSON object")),
    }
}

/// Parse a `{...}` document into a hash table; nested objects become hash tables.
pub fn parse_object(text: &str, position: &mut usize) -> Result<HashTable<'static>> {
    match parse_document(text, position, '{')? {
        JsonNode::Object(members) => object_to_hash_table(members),
        _ => Err(CollectionError::json(*position, "expected a JSON object")),
    }
}

fn parse_document(text: &str, position: &mut usize, open: char) -> Result<JsonNode> {
    let start = *position;
    let rest = text
        .get(start..)
        .ok_or_else(|| CollectionError::json(start, "offset is outside the text"))?;
    let skipped = rest.len() - rest.trim_start().len();
    match rest[skipped..].chars().next() {
        Some(c) if c == open => {}
        Some(c) => {
            *position = start + skipped;
            return Err(CollectionError::json(
                *position,
                format!("expected '{}' but found '{}'", open, c),
            ));
        }
        None => {
            *position = start + skipped;
            return Err(CollectionError::json(*position, "unexpected end of input"));
        }
    }

    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<JsonNode>();
    match stream.next() {
        Some(Ok(value)) => {
            *position = start + stream.byte_offset();
            Ok(value)
        }
        Some(Err(e)) => {
            *position = start + offset_of(rest, e.line(), e.column());
            log::debug!("JSON parse failed at offset {}: {}", *position, e);
            Err(CollectionError::json(*position, e.to_string()))
        }
        None => {
            *position = text.len();
            Err(CollectionError::json(*position, "unexpected end of input"))
        }
    }
}

/// Byte offset of a one-based line/column pair.
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn convert(node: JsonNode, style: ObjectStyle) -> Result<Value<'static>> {
    Ok(match node {
        JsonNode::Null => Value::Null,
        JsonNode::Bool(b) => Value::Bool(b),
        JsonNode::Int(i) => Value::I64(i),
        JsonNode::UInt(u) => Value::U64(u),
        JsonNode::Float(f) => Value::F64(f),
        JsonNode::Str(s) => Value::Str(Cow::Owned(s)),
        JsonNode::Array(items) => Value::from(array_to_vector(items, style)?),
        JsonNode::Object(members) => match style {
            ObjectStyle::HashTable => Value::from(object_to_hash_table(members)?),
            ObjectStyle::KeyedVector => Value::from(object_to_keyed_vector(members)?),
        },
    })
}

fn array_to_vector(items: Vec<JsonNode>, style: ObjectStyle) -> Result<Vector<'static>> {
    let mut vector = Vector::with_capacity(&TYPE_STRING, items.len())?;
    for item in items {
        vector.add_entry(None, convert(item, style)?, None)?;
    }
    Ok(vector)
}

/// Every member becomes an entry, repeated keys included.
fn object_to_keyed_vector(members: Vec<(String, JsonNode)>) -> Result<Vector<'static>> {
    let mut vector = Vector::with_capacity(&TYPE_STRING, members.len())?;
    for (key, value) in members {
        vector.add_entry(Some(Value::from(key)), convert(value, ObjectStyle::KeyedVector)?, None)?;
    }
    Ok(vector)
}

/// A repeated key replaces the earlier member's value.
fn object_to_hash_table(members: Vec<(String, JsonNode)>) -> Result<HashTable<'static>> {
    let mut table = HashTable::new(&TYPE_STRING, 0);
    for (key, value) in members {
        table.add_entry(Value::from(key), convert(value, ObjectStyle::HashTable)?, None)?;
    }
    Ok(table)
}
