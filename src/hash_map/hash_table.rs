//! Fixed-size hash table with one global iteration order
//!
//! Entries are spread over a fixed number of buckets by key hash. Each bucket
//! keeps its entries sorted by key, and the buckets are stitched into a single
//! doubly-linked chain: iteration visits buckets in index order and, within a
//! bucket, keys in ascending order. The table never rehashes; the bucket count
//! is chosen once at creation (see [`table_size`]).
//!
//! # Examples
//!
//! ```rust
//! use ordered_collections::{HashTable, Value, TYPE_STRING};
//! # fn main() -> ordered_collections::Result<()> {
//! let mut table = HashTable::new(&TYPE_STRING, 0);
//! table.add_entry("alpha".into(), Value::I32(1), None)?;
//! table.add_entry("beta".into(), Value::I32(2), None)?;
//!
//! assert_eq!(table.get_value(&"beta".into()), Some(&Value::I32(2)));
//! assert_eq!(table.iter().count(), 2);
//! table.verify_links()?;
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::io::Write;

use super::bucket::{BucketTree, NodeArena, NodeId};
use super::hash_functions::{bucket_index, table_size, MAX_BUCKET_COUNT};
use crate::config::{CollectionConfig, Config};
use crate::containers::{Collection, Vector};
use crate::error::{CollectionError, Result};
use crate::io::wire::{self, Decoded, WireContainer};
use crate::io::{json, xml, VecDataOutput, WriterDataOutput};
use crate::types::{resolve_value_type, TypeDescriptor, Value};

/// One key/value entry and its neighbours in global order.
#[derive(Debug)]
pub struct HashNode<'a> {
    key: Value<'a>,
    value: Value<'a>,
    value_type: &'static TypeDescriptor,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl<'a> HashNode<'a> {
    /// Entry key.
    pub fn key(&self) -> &Value<'a> {
        &self.key
    }

    /// Stored value.
    pub fn value(&self) -> &Value<'a> {
        &self.value
    }

    /// Descriptor the value is handled through.
    pub fn value_type(&self) -> &'static TypeDescriptor {
        self.value_type
    }
}

/// Hash table over runtime-typed keys and values.
#[derive(Debug)]
pub struct HashTable<'a> {
    key_type: &'static TypeDescriptor,
    buckets: Vec<Option<BucketTree>>,
    nodes: NodeArena<HashNode<'a>>,
    size: usize,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    last_added_type: Option<&'static TypeDescriptor>,
}

impl<'a> HashTable<'a> {
    /// Create an empty table with `table_size(min_size)` buckets.
    ///
    /// Requests above [`MAX_BUCKET_COUNT`] are clamped to it; [`HashTable::create`]
    /// rejects them instead.
    pub fn new(key_type: &'static TypeDescriptor, min_size: usize) -> Self {
        let bucket_count = table_size(min_size).min(MAX_BUCKET_COUNT);
        let mut buckets = Vec::new();
        buckets.resize_with(bucket_count, || None);
        Self::from_buckets(key_type, buckets)
    }

    /// Create a table from an optional key type, failing when it is absent or
    /// when the bucket array cannot be allocated.
    pub fn create(key_type: Option<&'static TypeDescriptor>, min_size: usize) -> Result<Self> {
        let key_type = key_type
            .ok_or_else(|| CollectionError::invalid_argument("hash table requires a key type"))?;
        Self::try_new(key_type, min_size)
    }

    /// Create a table sized by `config`.
    pub fn with_config(key_type: &'static TypeDescriptor, config: &CollectionConfig) -> Result<Self> {
        config.validate()?;
        Self::try_new(key_type, config.bucket_count)
    }

    fn try_new(key_type: &'static TypeDescriptor, min_size: usize) -> Result<Self> {
        let bucket_count = table_size(min_size);
        if bucket_count > MAX_BUCKET_COUNT {
            log::error!(
                "refusing hash table with {} buckets (maximum {})",
                bucket_count,
                MAX_BUCKET_COUNT
            );
            return Err(CollectionError::out_of_memory(bucket_count));
        }
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(bucket_count)
            .map_err(|_| CollectionError::out_of_memory(bucket_count))?;
        buckets.resize_with(bucket_count, || None);
        Ok(Self::from_buckets(key_type, buckets))
    }

    fn from_buckets(key_type: &'static TypeDescriptor, buckets: Vec<Option<BucketTree>>) -> Self {
        log::trace!(
            "creating hash table with key type {} and {} buckets",
            key_type.name(),
            buckets.len()
        );
        Self {
            key_type,
            buckets,
            nodes: NodeArena::new(),
            size: 0,
            head: None,
            tail: None,
            last_added_type: None,
        }
    }

    /// Build a table from a keyed vector, copying entries in vector order.
    ///
    /// Every vector entry must carry a key; later duplicates replace earlier
    /// ones.
    pub fn from_vector(vector: &Vector<'a>, min_size: usize) -> Result<Self> {
        let key_type = vector.key_type();
        let mut table = Self::try_new(key_type, min_size)?;
        for (index, node) in vector.iter() {
            let key = node.key().ok_or_else(|| {
                CollectionError::invalid_argument(format!("vector entry {} has no key", index))
            })?;
            let value_type = node.value_type();
            table.add_entry(key_type.copy(key), value_type.copy(node.value()), Some(value_type))?;
        }
        Ok(table)
    }

    /// Descriptor keys are hashed, compared and encoded through.
    pub fn key_type(&self) -> &'static TypeDescriptor {
        self.key_type
    }

    /// Descriptor of the most recently added value; the default for entries
    /// added without one.
    pub fn last_added_type(&self) -> Option<&'static TypeDescriptor> {
        self.last_added_type
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Fixed number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_of(&self, key: &Value<'_>) -> usize {
        bucket_index(self.key_type.hash(key), self.buckets.len())
    }

    fn compare_node_key(&self, id: NodeId, key: &Value<'_>) -> Ordering {
        self.nodes
            .get(id)
            .map_or(Ordering::Less, |node| self.key_type.compare(&node.key, key))
    }

    fn search(&self, bucket: usize, key: &Value<'_>) -> Option<std::result::Result<usize, usize>> {
        let tree = self.buckets.get(bucket)?.as_ref()?;
        Some(tree.search(|id| self.compare_node_key(*id, key)))
    }

    /// Neighbours for the first entry of an empty `bucket`: the tail of the
    /// nearest non-empty bucket below it and whatever that tail links to.
    fn relink(&self, bucket: usize) -> (Option<NodeId>, Option<NodeId>) {
        if self.size == 0 {
            return (None, None);
        }
        let prev = self.buckets[..bucket]
            .iter()
            .rev()
            .find_map(|tree| tree.as_ref().and_then(BucketTree::tail));
        let next = match prev {
            Some(id) => self.nodes.get(id).and_then(|node| node.next),
            None => self.head,
        };
        (prev, next)
    }

    /// Insert or replace the entry for `key`.
    ///
    /// Ownership of `key` and `value` moves into the table. When `value_type`
    /// is `None` the type of the most recently added value (the key type
    /// before the first insert) is used if it matches, otherwise the built-in
    /// type for the value's kind. Replacing keeps the entry's position and drops the old value.
    pub fn add_entry(
        &mut self,
        key: Value<'a>,
        value: Value<'a>,
        value_type: Option<&'static TypeDescriptor>,
    ) -> Result<&HashNode<'a>> {
        if key.is_null() {
            return Err(CollectionError::invalid_argument("hash table keys cannot be null"));
        }
        if !self.key_type.accepts(&key) {
            return Err(CollectionError::invalid_argument(format!(
                "{} key does not match key type {}",
                key.kind(),
                self.key_type.name()
            )));
        }
        let default = self.last_added_type.unwrap_or(self.key_type);
        let value_type = resolve_value_type(&value, value_type, Some(default))?;
        let bucket = self.bucket_of(&key);

        let position = match self.search(bucket, &key) {
            Some(Ok(position)) => {
                let id = self.buckets[bucket]
                    .as_ref()
                    .map(|tree| tree.ids()[position])
                    .ok_or_else(|| CollectionError::corrupt(bucket, "bucket vanished during insert"))?;
                self.last_added_type = Some(value_type);
                let node = self
                    .nodes
                    .get_mut(id)
                    .ok_or_else(|| CollectionError::corrupt(bucket, "bucket references a free node"))?;
                node.value = value;
                node.value_type = value_type;
                log::trace!("replaced entry in bucket {}", bucket);
                return Ok(&*node);
            }
            Some(Err(position)) => position,
            None => 0,
        };

        // Splice next to in-bucket neighbours, or keep the bucket's existing
        // outside links when the new entry becomes its head or tail.
        let (prev, next) = match self.buckets[bucket].as_ref().filter(|tree| !tree.is_empty()) {
            Some(tree) => {
                let ids = tree.ids();
                let prev = match position {
                    0 => tree.head().and_then(|id| self.nodes.get(id)).and_then(|node| node.prev),
                    p => Some(ids[p - 1]),
                };
                let next = match ids.get(position) {
                    Some(&id) => Some(id),
                    None => tree.tail().and_then(|id| self.nodes.get(id)).and_then(|node| node.next),
                };
                (prev, next)
            }
            None => self.relink(bucket),
        };

        let id = self.nodes.allocate(HashNode {
            key,
            value,
            value_type,
            prev,
            next,
        })?;
        self.buckets[bucket]
            .get_or_insert_with(BucketTree::new)
            .insert_at(position, id);
        match prev {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(p) {
                    node.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes.get_mut(n) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.size += 1;
        self.last_added_type = Some(value_type);

        self.nodes
            .get(id)
            .ok_or_else(|| CollectionError::corrupt(bucket, "inserted node is missing"))
    }

    /// Like [`HashTable::add_entry`], but stores copies made through the key
    /// type and the resolved value type.
    pub fn add_entry_copy(
        &mut self,
        key: &Value<'a>,
        value: &Value<'a>,
        value_type: Option<&'static TypeDescriptor>,
    ) -> Result<&HashNode<'a>> {
        let default = self.last_added_type.unwrap_or(self.key_type);
        let value_type = resolve_value_type(value, value_type, Some(default))?;
        let key = self.key_type.copy(key);
        self.add_entry(key, value_type.copy(value), Some(value_type))
    }

    /// Entry stored under `key`.
    pub fn get_entry(&self, key: &Value<'_>) -> Option<&HashNode<'a>> {
        let tree = self.buckets.get(self.bucket_of(key))?.as_ref()?;
        let id = tree.query(|id| self.compare_node_key(*id, key))?;
        self.nodes.get(id)
    }

    /// Value stored under `key`; null values yield `None`.
    pub fn get_value(&self, key: &Value<'_>) -> Option<&Value<'a>> {
        self.get_entry(key)
            .map(HashNode::value)
            .filter(|value| !value.is_null())
    }

    /// Whether an entry exists for `key`.
    pub fn contains_key(&self, key: &Value<'_>) -> bool {
        self.get_entry(key).is_some()
    }

    /// Remove the entry for `key`, returning its key and value.
    ///
    /// The entry's neighbours are linked to each other, so the global order
    /// stays intact when a bucket empties.
    pub fn remove_entry(&mut self, key: &Value<'_>) -> Option<(Value<'a>, Value<'a>)> {
        let bucket = self.bucket_of(key);
        let position = self.search(bucket, key)?.ok()?;
        let tree = self.buckets[bucket].as_mut()?;
        let id = tree.remove_at(position);
        if tree.is_empty() {
            self.buckets[bucket] = None;
        }
        let node = self.nodes.release(id)?;

        match node.prev {
            Some(p) => {
                if let Some(prev) = self.nodes.get_mut(p) {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => {
                if let Some(next) = self.nodes.get_mut(n) {
                    next.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        self.size -= 1;
        log::trace!("removed entry from bucket {}; {} remain", bucket, self.size);
        Some((node.key, node.value))
    }

    /// Drop every entry, keeping the bucket count.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|bucket| *bucket = None);
        self.nodes.clear();
        self.size = 0;
        self.head = None;
        self.tail = None;
    }

    /// First entry in global order.
    pub fn head(&self) -> Option<&HashNode<'a>> {
        self.head.and_then(|id| self.nodes.get(id))
    }

    /// Last entry in global order.
    pub fn tail(&self) -> Option<&HashNode<'a>> {
        self.tail.and_then(|id| self.nodes.get(id))
    }

    /// Entry after `node` in global order.
    pub fn next_of(&self, node: &HashNode<'a>) -> Option<&HashNode<'a>> {
        node.next.and_then(|id| self.nodes.get(id))
    }

    /// Entry before `node` in global order.
    pub fn prev_of(&self, node: &HashNode<'a>) -> Option<&HashNode<'a>> {
        node.prev.and_then(|id| self.nodes.get(id))
    }

    /// Entries in global order.
    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            table: self,
            front: self.head,
            back: self.tail,
            remaining: self.size,
        }
    }

    /// Keys in global order.
    pub fn keys(&self) -> impl Iterator<Item = &Value<'a>> + '_ {
        self.iter().map(HashNode::key)
    }

    /// Values in global order.
    pub fn values(&self) -> impl Iterator<Item = &Value<'a>> + '_ {
        self.iter().map(HashNode::value)
    }

    /// `(bucket index, entry count)` for every non-empty bucket.
    pub fn bucket_layout(&self) -> Vec<(usize, usize)> {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(index, tree)| tree.as_ref().map(|tree| (index, tree.len())))
            .collect()
    }

    /// Diagnostic dump: entry and bucket counts, then every non-empty bucket
    /// with its entries in key order.
    pub fn bucket_dump(&self) -> String {
        let mut body = format!("size={}\ntableSize={}", self.size, self.buckets.len());
        let occupied = self
            .buckets
            .iter()
            .enumerate()
            .filter_map(|(index, tree)| tree.as_ref().map(|tree| (index, tree)));
        for (index, tree) in occupied {
            body.push_str(&format!("\ntable[{}]={{", index));
            for node in tree.ids().iter().filter_map(|&id| self.nodes.get(id)) {
                let entry = format!(
                    "{}: {}",
                    self.key_type.render(&node.key),
                    node.value_type.render(&node.value)
                );
                for line in entry.lines() {
                    body.push_str("\n  ");
                    body.push_str(line);
                }
            }
            body.push_str("\n}");
        }

        let mut out = String::from("{");
        for line in body.lines() {
            out.push_str("\n  ");
            out.push_str(line);
        }
        out.push_str("\n}");
        out
    }

    /// Copy every entry through its descriptors, keeping the layout.
    pub fn copy(&self) -> HashTable<'a> {
        let key_type = self.key_type;
        HashTable {
            key_type,
            buckets: self.buckets.clone(),
            nodes: self.nodes.map(|node| HashNode {
                key: key_type.copy(&node.key),
                value: node.value_type.copy(&node.value),
                value_type: node.value_type,
                prev: node.prev,
                next: node.next,
            }),
            size: self.size,
            head: self.head,
            tail: self.tail,
            last_added_type: self.last_added_type,
        }
    }

    /// Deep copy owning every payload, with owning descriptors throughout.
    pub fn to_owned_table(&self) -> HashTable<'static> {
        HashTable {
            key_type: self.key_type.owning(),
            buckets: self.buckets.clone(),
            nodes: self.nodes.map(|node| HashNode {
                key: node.key.to_owned_value(),
                value: node.value.to_owned_value(),
                value_type: node.value_type.owning(),
                prev: node.prev,
                next: node.next,
            }),
            size: self.size,
            head: self.head,
            tail: self.tail,
            last_added_type: self.last_added_type.map(TypeDescriptor::owning),
        }
    }

    /// Detach from any borrowed decode buffer.
    pub fn into_owned(self) -> HashTable<'static> {
        HashTable {
            key_type: self.key_type.owning(),
            buckets: self.buckets,
            nodes: self.nodes.into_map(|node| HashNode {
                key: node.key.into_owned(),
                value: node.value.into_owned(),
                value_type: node.value_type.owning(),
                prev: node.prev,
                next: node.next,
            }),
            size: self.size,
            head: self.head,
            tail: self.tail,
            last_added_type: self.last_added_type.map(TypeDescriptor::owning),
        }
    }

    /// Order two tables entry by entry in global order, then by size.
    pub fn compare(&self, other: &HashTable<'_>) -> Ordering {
        for (a, b) in self.iter().zip(other.iter()) {
            let keys = self.key_type.compare(&a.key, &b.key);
            if keys != Ordering::Equal {
                return keys;
            }
            let values = a.value_type.compare(&a.value, &b.value);
            if values != Ordering::Equal {
                return values;
            }
        }
        self.size.cmp(&other.size)
    }

    /// JSON object of the entries in global order.
    pub fn to_json(&self) -> String {
        json::render_object(
            self.iter()
                .map(|node| (node.key.to_string(), json::value_to_json(&node.value))),
        )
    }

    /// XML rendering with `element` as the root tag.
    pub fn to_xml(&self, element: &str, indent: bool) -> String {
        let children: Vec<(Option<String>, &Value<'a>)> = self
            .iter()
            .map(|node| (Some(node.key.to_string()), &node.value))
            .collect();
        let mut out = String::new();
        xml::write_children(&mut out, element, &children, indent, 0);
        out
    }

    /// Encode to the wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = VecDataOutput::new();
        wire::encode_container(self, &mut out)?;
        Ok(out.into_vec())
    }

    /// Stream the wire encoding into `writer`, returning the bytes written.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64> {
        let mut out = WriterDataOutput::new(writer);
        wire::encode_container(self, &mut out)?;
        crate::io::DataOutput::flush(&mut out)?;
        Ok(out.bytes_written())
    }

    /// Decode a table; with `in_place`, string and byte payloads borrow from
    /// `bytes`.
    pub fn from_bytes(bytes: &'a [u8], in_place: bool) -> Result<Decoded<HashTable<'a>>> {
        wire::decode_container(bytes, in_place)
    }

    /// Decode a table that owns all of its data.
    pub fn from_bytes_owned(bytes: &[u8]) -> Result<Decoded<HashTable<'static>>> {
        Ok(wire::decode_container::<HashTable<'_>>(bytes, false)?.map(HashTable::into_owned))
    }

    /// Decode using the in-place default from `config`.
    pub fn from_bytes_with_config(
        bytes: &'a [u8],
        config: &CollectionConfig,
    ) -> Result<Decoded<HashTable<'a>>> {
        Self::from_bytes(bytes, config.decode_in_place)
    }

    /// Check the global chain against the buckets: chain order equals the
    /// concatenation of buckets in index order, back links match, keys sit in
    /// the bucket they hash to and ascend within it.
    pub fn verify_links(&self) -> Result<()> {
        let expected: Vec<NodeId> = self
            .buckets
            .iter()
            .flatten()
            .flat_map(|tree| tree.ids().iter().copied())
            .collect();
        if expected.len() != self.size || self.nodes.len() != self.size {
            return Err(CollectionError::corrupt(
                0,
                format!(
                    "size {} but buckets hold {} and {} nodes are live",
                    self.size,
                    expected.len(),
                    self.nodes.len()
                ),
            ));
        }

        let mut prev: Option<NodeId> = None;
        let mut cursor = self.head;
        let mut position = 0usize;
        while let Some(id) = cursor {
            if expected.get(position) != Some(&id) {
                return Err(CollectionError::corrupt(position, "chain departs from bucket order"));
            }
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| CollectionError::corrupt(position, "chain reaches a free node"))?;
            if node.prev != prev {
                return Err(CollectionError::corrupt(position, "back link does not match chain"));
            }
            prev = Some(id);
            cursor = node.next;
            position += 1;
        }
        if position != self.size || self.tail != prev {
            return Err(CollectionError::corrupt(position, "chain ends before the tail"));
        }

        for (index, tree) in self.buckets.iter().enumerate() {
            let Some(tree) = tree else { continue };
            if tree.is_empty() {
                return Err(CollectionError::corrupt(index, "empty bucket left allocated"));
            }
            let mut last: Option<&Value<'a>> = None;
            for id in tree.ids() {
                let node = self
                    .nodes
                    .get(*id)
                    .ok_or_else(|| CollectionError::corrupt(index, "bucket references a free node"))?;
                if self.bucket_of(&node.key) != index {
                    return Err(CollectionError::corrupt(index, "key stored in the wrong bucket"));
                }
                if let Some(last) = last {
                    if self.key_type.compare(last, &node.key) != Ordering::Less {
                        return Err(CollectionError::corrupt(index, "bucket keys are not ascending"));
                    }
                }
                last = Some(&node.key);
            }
        }
        Ok(())
    }
}

impl HashTable<'static> {
    /// Parse a JSON object; nested objects become tables, arrays vectors.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut position = 0;
        json::parse_object(text, &mut position)
    }

    /// Read an XML document: the payload element's children become entries,
    /// nested elements become tables and leaf text is stored as bytes.
    pub fn from_xml(text: &str) -> Result<Self> {
        xml::parse_hash_table(text)
    }
}

impl Clone for HashTable<'_> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl fmt::Display for HashTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

/// Iterator over entries in global order.
pub struct Iter<'t, 'a> {
    table: &'t HashTable<'a>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'t, 'a> Iterator for Iter<'t, 'a> {
    type Item = &'t HashNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.table.nodes.get(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.table.nodes.get(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(node)
    }
}

impl ExactSizeIterator for Iter<'_, '_> {}

impl<'a> Collection<'a> for HashTable<'a> {
    fn len(&self) -> usize {
        HashTable::len(self)
    }

    fn clear(&mut self) {
        HashTable::clear(self)
    }

    fn copy(&self) -> Self {
        HashTable::copy(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        HashTable::compare(self, other)
    }

    fn key_type(&self) -> &'static TypeDescriptor {
        self.key_type
    }

    fn to_json(&self) -> String {
        HashTable::to_json(self)
    }

    fn to_xml(&self, element: &str, indent: bool) -> String {
        HashTable::to_xml(self, element, indent)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        HashTable::to_bytes(self)
    }

    fn verify_links(&self) -> Result<()> {
        HashTable::verify_links(self)
    }
}

impl<'a> WireContainer<'a> for HashTable<'a> {
    fn wire_key_type(&self) -> Result<&'static TypeDescriptor> {
        Ok(self.key_type.owning())
    }

    fn wire_len(&self) -> usize {
        self.size
    }

    fn visit_entries<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(Option<&Value<'a>>, &Value<'a>, &'static TypeDescriptor) -> Result<()>,
    {
        for node in self.iter() {
            visit(Some(&node.key), &node.value, node.value_type)?;
        }
        Ok(())
    }

    fn from_header(key_type: &'static TypeDescriptor, capacity_hint: usize) -> Result<Self> {
        let mut table = Self::try_new(key_type, 0)?;
        table.nodes = NodeArena::try_with_capacity(capacity_hint)?;
        Ok(table)
    }

    fn push_decoded(
        &mut self,
        key: Value<'a>,
        value: Value<'a>,
        value_type: &'static TypeDescriptor,
    ) -> Result<()> {
        self.add_entry(key, value, Some(value_type)).map(|_| ())
    }
}
