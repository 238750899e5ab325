//! Sparse, index-addressable vector with an allocated-order chain
//!
//! A [`Vector`] is a growable array of slots. Each slot is either empty or holds
//! an optional key, a value and the value's [`TypeDescriptor`]. Allocated slots
//! are threaded into a doubly-linked chain by slot index, so iteration visits
//! populated slots in increasing index order without scanning the gaps.
//!
//! Links are slot indices, which stay valid when the backing array grows.
//!
//! # Examples
//!
//! ```rust
//! use ordered_collections::{Vector, Value, TYPE_STRING};
//! # fn main() -> ordered_collections::Result<()> {
//! let mut vector = Vector::new(&TYPE_STRING);
//! vector.set_entry(4, None, Value::from("marklar"), None)?;
//! vector.set_entry(1, None, Value::from("first"), None)?;
//!
//! let order: Vec<usize> = vector.iter().map(|(index, _)| index).collect();
//! assert_eq!(order, vec![1, 4]);
//! assert_eq!(vector.capacity(), 5);
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::io::Write;

use super::Collection;
use crate::config::{CollectionConfig, Config};
use crate::error::{check_bounds, CollectionError, Result};
use crate::io::wire::{self, Decoded, WireContainer};
use crate::io::{json, xml, VecDataOutput, WriterDataOutput};
use crate::types::{resolve_value_type, TypeDescriptor, Value, ValueKind, TYPE_NULL};

/// Direction for [`Vector::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest key first
    Ascending,
    /// Largest key first
    Descending,
}

/// An allocated slot: key, value, the value's descriptor and its neighbours in
/// allocated order.
#[derive(Debug)]
pub struct VectorNode<'a> {
    key: Option<Value<'a>>,
    value: Value<'a>,
    value_type: &'static TypeDescriptor,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<'a> VectorNode<'a> {
    /// Key, if the entry has one.
    pub fn key(&self) -> Option<&Value<'a>> {
        self.key.as_ref()
    }

    /// Stored value.
    pub fn value(&self) -> &Value<'a> {
        &self.value
    }

    /// Descriptor the value is handled through.
    pub fn value_type(&self) -> &'static TypeDescriptor {
        self.value_type
    }

    /// Index of the nearest allocated slot below this one.
    pub fn prev(&self) -> Option<usize> {
        self.prev
    }

    /// Index of the nearest allocated slot above this one.
    pub fn next(&self) -> Option<usize> {
        self.next
    }
}

/// Key and value taken out of a removed slot.
pub type RemovedEntry<'a> = (Option<Value<'a>>, Value<'a>);

/// Sparse ordered vector of runtime-typed values.
#[derive(Debug)]
pub struct Vector<'a> {
    key_type: &'static TypeDescriptor,
    slots: Vec<Option<VectorNode<'a>>>,
    size: usize,
    head: Option<usize>,
    tail: Option<usize>,
    max_capacity: usize,
}

impl<'a> Vector<'a> {
    /// Create an empty vector whose keys are handled by `key_type`.
    ///
    /// `key_type` is also the fallback value type for entries added without one.
    pub fn new(key_type: &'static TypeDescriptor) -> Self {
        log::trace!("creating vector with key type {}", key_type.name());
        Self {
            key_type,
            slots: Vec::new(),
            size: 0,
            head: None,
            tail: None,
            max_capacity: crate::config::collection::DEFAULT_MAX_CAPACITY,
        }
    }

    /// Create a vector with `capacity` unallocated slots.
    pub fn with_capacity(key_type: &'static TypeDescriptor, capacity: usize) -> Result<Self> {
        let mut vector = Self::new(key_type);
        vector.grow_to(capacity)?;
        Ok(vector)
    }

    /// Create a vector from an optional key type, failing when it is absent.
    pub fn create(key_type: Option<&'static TypeDescriptor>, capacity: usize) -> Result<Self> {
        let key_type =
            key_type.ok_or_else(|| CollectionError::invalid_argument("vector requires a key type"))?;
        Self::with_capacity(key_type, capacity)
    }

    /// Create a vector sized and bounded by `config`.
    pub fn with_config(key_type: &'static TypeDescriptor, config: &CollectionConfig) -> Result<Self> {
        config.validate()?;
        let mut vector = Self::new(key_type);
        vector.max_capacity = config.max_capacity;
        vector.grow_to(config.initial_capacity)?;
        Ok(vector)
    }

    /// Descriptor keys are compared, copied and encoded through.
    pub fn key_type(&self) -> &'static TypeDescriptor {
        self.key_type
    }

    /// Number of allocated slots.
    pub fn len(&self) -> usize {
        self.size
    }

    /// True when no slot is allocated.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of slots, allocated or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Lowest allocated index.
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Highest allocated index.
    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    fn grow_to(&mut self, len: usize) -> Result<()> {
        if len <= self.slots.len() {
            return Ok(());
        }
        check_bounds(len - 1, self.max_capacity)?;
        self.slots
            .try_reserve(len - self.slots.len())
            .map_err(|_| CollectionError::out_of_memory(len))?;
        log::trace!("growing vector from {} to {} slots", self.slots.len(), len);
        self.slots.resize_with(len, || None);
        Ok(())
    }

    /// Value type used when an entry at `index` is set without one: the type
    /// already in that slot, then the tail's type, then the key type.
    fn default_value_type(&self, index: usize) -> &'static TypeDescriptor {
        self.get_entry(index)
            .or_else(|| self.tail.and_then(|tail| self.get_entry(tail)))
            .map_or(self.key_type, |node| node.value_type)
    }

    /// Store `key`/`value` at `index`, growing the vector if needed.
    ///
    /// Ownership of `key` and `value` moves into the vector; whatever the slot
    /// held before is dropped. When `value_type` is `None` the default chain of
    /// [`Vector::add_entry`] applies, falling back to the built-in descriptor
    /// for the value's kind when the default does not match.
    pub fn set_entry(
        &mut self,
        index: usize,
        key: Option<Value<'a>>,
        value: Value<'a>,
        value_type: Option<&'static TypeDescriptor>,
    ) -> Result<&VectorNode<'a>> {
        if let Some(key) = &key {
            if !self.key_type.accepts(key) {
                return Err(CollectionError::invalid_argument(format!(
                    "{} key does not match key type {}",
                    key.kind(),
                    self.key_type.name()
                )));
            }
        }
        check_bounds(index, self.max_capacity)?;
        let value_type =
            resolve_value_type(&value, value_type, Some(self.default_value_type(index)))?;
        self.grow_to(index + 1)?;

        let prev = self.find_previous_allocated(index);
        let next = self.find_next_allocated(index);
        if self.slots[index].take().is_some() {
            log::trace!("replacing vector slot {}", index);
        } else {
            self.size += 1;
            self.head = Some(self.head.map_or(index, |head| head.min(index)));
            self.tail = Some(self.tail.map_or(index, |tail| tail.max(index)));
        }
        if let Some(node) = prev.and_then(|p| self.slots[p].as_mut()) {
            node.next = Some(index);
        }
        if let Some(node) = next.and_then(|n| self.slots[n].as_mut()) {
            node.prev = Some(index);
        }

        Ok(&*self.slots[index].insert(VectorNode {
            key,
            value,
            value_type,
            prev,
            next,
        }))
    }

    /// Like [`Vector::set_entry`], but stores copies made through the key type
    /// and the resolved value type instead of taking ownership.
    pub fn set_entry_copy(
        &mut self,
        index: usize,
        key: Option<&Value<'a>>,
        value: &Value<'a>,
        value_type: Option<&'static TypeDescriptor>,
    ) -> Result<&VectorNode<'a>> {
        let value_type =
            resolve_value_type(value, value_type, Some(self.default_value_type(index)))?;
        let key = key.map(|key| self.key_type.copy(key));
        self.set_entry(index, key, value_type.copy(value), Some(value_type))
    }

    /// Append after the current tail (or at index 0 when empty).
    pub fn add_entry(
        &mut self,
        key: Option<Value<'a>>,
        value: Value<'a>,
        value_type: Option<&'static TypeDescriptor>,
    ) -> Result<usize> {
        let index = self.tail.map_or(0, |tail| tail + 1);
        self.set_entry(index, key, value, value_type)?;
        Ok(index)
    }

    /// Allocated slot at `index`.
    pub fn get_entry(&self, index: usize) -> Option<&VectorNode<'a>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Value at `index`. Unallocated slots and null values yield `None`.
    pub fn get_value(&self, index: usize) -> Option<&Value<'a>> {
        self.get_entry(index)
            .map(VectorNode::value)
            .filter(|value| !value.is_null())
    }

    /// Nearest allocated index strictly below `index`.
    pub fn find_previous_allocated(&self, index: usize) -> Option<usize> {
        let end = index.min(self.slots.len());
        (0..end).rev().find(|&i| self.slots[i].is_some())
    }

    /// Nearest allocated index strictly above `index`.
    pub fn find_next_allocated(&self, index: usize) -> Option<usize> {
        let start = index.saturating_add(1);
        (start..self.slots.len()).find(|&i| self.slots[i].is_some())
    }

    /// Remove slot `index`, shifting every later slot down by one.
    ///
    /// This is O(capacity) and keeps the capacity unchanged. Returns the
    /// removed key and value when the slot was allocated; an unallocated slot
    /// still closes the gap.
    pub fn remove(&mut self, index: usize) -> Option<RemovedEntry<'a>> {
        if index >= self.slots.len() {
            return None;
        }
        let removed = self.slots.remove(index);
        self.slots.push(None);
        if removed.is_some() {
            self.size -= 1;
        }
        self.relink_from(index);
        removed.map(|node| (node.key, node.value))
    }

    /// Re-derive links for every allocated slot at or above `start`.
    fn relink_from(&mut self, start: usize) {
        let mut prev = self.find_previous_allocated(start);
        if let Some(node) = prev.and_then(|p| self.slots[p].as_mut()) {
            node.next = None;
        }
        for i in start..self.slots.len() {
            match self.slots[i].as_mut() {
                Some(node) => {
                    node.prev = prev;
                    node.next = None;
                }
                None => continue,
            }
            if let Some(node) = prev.and_then(|p| self.slots[p].as_mut()) {
                node.next = Some(i);
            }
            prev = Some(i);
        }
        self.head = self.slots.iter().position(Option::is_some);
        self.tail = self.slots.iter().rposition(Option::is_some);
    }

    /// Allocated slots ordered by key.
    ///
    /// The vector itself is untouched; entries without a key sort first.
    pub fn sort(&self, order: SortOrder) -> Vec<(usize, &VectorNode<'a>)> {
        let mut nodes: Vec<_> = self.iter().collect();
        nodes.sort_by(|(_, a), (_, b)| {
            let ordering = match (&a.key, &b.key) {
                (Some(x), Some(y)) => self.key_type.compare(x, y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        nodes
    }

    /// Drop every entry, keeping the capacity.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.size = 0;
        self.head = None;
        self.tail = None;
    }

    /// Copy every entry through its descriptors.
    ///
    /// Owning descriptors produce independent deep copies; no-copy descriptors
    /// keep sharing borrowed payloads.
    pub fn copy(&self) -> Vector<'a> {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|node| VectorNode {
                    key: node.key.as_ref().map(|key| self.key_type.copy(key)),
                    value: node.value_type.copy(&node.value),
                    value_type: node.value_type,
                    prev: node.prev,
                    next: node.next,
                })
            })
            .collect();
        Vector {
            key_type: self.key_type,
            slots,
            size: self.size,
            head: self.head,
            tail: self.tail,
            max_capacity: self.max_capacity,
        }
    }

    /// Deep copy with every payload owned and every descriptor switched to its
    /// owning variant.
    pub fn to_owned_vector(&self) -> Vector<'static> {
        self.map_nodes(|key, value| (key.map(Value::to_owned_value), value.to_owned_value()))
    }

    /// Detach from any borrowed decode buffer.
    pub fn into_owned(self) -> Vector<'static> {
        let key_type = self.key_type.owning();
        let slots = self
            .slots
            .into_iter()
            .map(|slot| {
                slot.map(|node| VectorNode {
                    key: node.key.map(Value::into_owned),
                    value: node.value.into_owned(),
                    value_type: node.value_type.owning(),
                    prev: node.prev,
                    next: node.next,
                })
            })
            .collect();
        Vector {
            key_type,
            slots,
            size: self.size,
            head: self.head,
            tail: self.tail,
            max_capacity: self.max_capacity,
        }
    }

    fn map_nodes<F>(&self, mut f: F) -> Vector<'static>
    where
        F: FnMut(Option<&Value<'a>>, &Value<'a>) -> (Option<Value<'static>>, Value<'static>),
    {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|node| {
                    let (key, value) = f(node.key.as_ref(), &node.value);
                    VectorNode {
                        key,
                        value,
                        value_type: node.value_type.owning(),
                        prev: node.prev,
                        next: node.next,
                    }
                })
            })
            .collect();
        Vector {
            key_type: self.key_type.owning(),
            slots,
            size: self.size,
            head: self.head,
            tail: self.tail,
            max_capacity: self.max_capacity,
        }
    }

    /// First entry, in allocated order, whose key equals `key`.
    ///
    /// Keys are not indexed, so this is a linear scan.
    pub fn get_by_key(&self, key: &Value<'_>) -> Option<(usize, &VectorNode<'a>)> {
        self.iter().find(|(_, node)| {
            node.key
                .as_ref()
                .map_or(false, |k| self.key_type.compare(k, key) == Ordering::Equal)
        })
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get_value_by_key(&self, key: &Value<'_>) -> Option<&Value<'a>> {
        self.get_by_key(key)
            .map(|(_, node)| node.value())
            .filter(|value| !value.is_null())
    }

    /// Walk nested vectors by bracketed indices, e.g. `"[2][0]"`.
    pub fn get_path(&self, path: &str) -> Option<&VectorNode<'a>> {
        let rest = path.trim_start().strip_prefix('[')?;
        let close = rest.find(']')?;
        let index: usize = rest[..close].trim().parse().ok()?;
        let node = self.get_entry(index)?;
        let remainder = rest[close + 1..].trim_start();
        if remainder.is_empty() {
            Some(node)
        } else {
            node.value().as_vector()?.get_path(remainder)
        }
    }

    /// Allocated slots in increasing index order.
    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            vector: self,
            cursor: self.head,
            remaining: self.size,
        }
    }

    /// Values in allocated order.
    pub fn values(&self) -> impl Iterator<Item = &Value<'a>> + '_ {
        self.iter().map(|(_, node)| node.value())
    }

    /// Flattened list of values in allocated order; gaps contribute nothing.
    pub fn to_list(&self) -> Vec<&Value<'a>> {
        self.values().collect()
    }

    /// Order two vectors entry by entry (keys, then values), then by length.
    pub fn compare(&self, other: &Vector<'_>) -> Ordering {
        for ((_, a), (_, b)) in self.iter().zip(other.iter()) {
            let keys = match (&a.key, &b.key) {
                (Some(x), Some(y)) => self.key_type.compare(x, y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
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

    /// JSON array of the values in allocated order.
    pub fn to_json(&self) -> String {
        json::render_array(self.values().map(json::value_to_json))
    }

    /// XML rendering with `element` as the root tag.
    pub fn to_xml(&self, element: &str, indent: bool) -> String {
        let children: Vec<(Option<String>, &Value<'a>)> = self
            .iter()
            .map(|(_, node)| (node.key().map(|key| key.to_string()), node.value()))
            .collect();
        let mut out = String::new();
        xml::write_children(&mut out, element, &children, indent, 0);
        out
    }

    /// Encode to the wire format.
    ///
    /// Vectors whose entries carry no keys are written with the null key
    /// type; a vector mixing keyed and unkeyed entries cannot be encoded.
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

    /// Decode a vector, appending entries compactly from index 0.
    ///
    /// With `in_place`, string and byte payloads borrow from `bytes`.
    pub fn from_bytes(bytes: &'a [u8], in_place: bool) -> Result<Decoded<Vector<'a>>> {
        wire::decode_container(bytes, in_place)
    }

    /// Decode a vector that owns all of its data.
    pub fn from_bytes_owned(bytes: &[u8]) -> Result<Decoded<Vector<'static>>> {
        Ok(wire::decode_container::<Vector<'_>>(bytes, false)?.map(Vector::into_owned))
    }

    /// Decode using the in-place default from `config`.
    pub fn from_bytes_with_config(
        bytes: &'a [u8],
        config: &CollectionConfig,
    ) -> Result<Decoded<Vector<'a>>> {
        Self::from_bytes(bytes, config.decode_in_place)
    }

    /// Verify the allocated-order chain: strictly increasing indices, matching
    /// back links, head and tail at the ends, and one visit per allocated slot.
    pub fn verify_links(&self) -> Result<()> {
        let mut expected_prev: Option<usize> = None;
        let mut visited = 0usize;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self
                .get_entry(index)
                .ok_or_else(|| CollectionError::corrupt(index, "chain reaches an empty slot"))?;
            if node.prev != expected_prev {
                return Err(CollectionError::corrupt(index, "back link does not match chain"));
            }
            if let Some(next) = node.next {
                if next <= index {
                    return Err(CollectionError::corrupt(index, "chain is not increasing"));
                }
                if self.find_next_allocated(index) != Some(next) {
                    return Err(CollectionError::corrupt(index, "chain skips an allocated slot"));
                }
            } else if self.tail != Some(index) {
                return Err(CollectionError::corrupt(index, "chain ends before the tail"));
            }
            visited += 1;
            if visited > self.size {
                return Err(CollectionError::corrupt(index, "chain is longer than the size"));
            }
            expected_prev = Some(index);
            cursor = node.next;
        }
        let allocated = self.slots.iter().filter(|slot| slot.is_some()).count();
        if visited != self.size || allocated != self.size {
            return Err(CollectionError::corrupt(
                visited,
                format!("size {} but {} chained and {} allocated", self.size, visited, allocated),
            ));
        }
        Ok(())
    }
}

impl Vector<'static> {
    /// Parse a JSON array into unkeyed entries at consecutive indices.
    ///
    /// Nested arrays become vectors and nested objects hash tables.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut position = 0;
        json::parse_array(text, &mut position)
    }

    /// Parse a JSON object into keyed entries in member order.
    ///
    /// Nested objects stay keyed vectors.
    pub fn from_json_object(text: &str) -> Result<Self> {
        let mut position = 0;
        json::parse_keyed_object(text, &mut position)
    }
}

impl Clone for Vector<'_> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl fmt::Display for Vector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

/// Iterator over allocated slots in index order.
pub struct Iter<'v, 'a> {
    vector: &'v Vector<'a>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'v, 'a> Iterator for Iter<'v, 'a> {
    type Item = (usize, &'v VectorNode<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let node = self.vector.get_entry(index)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((index, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a> Collection<'a> for Vector<'a> {
    fn len(&self) -> usize {
        Vector::len(self)
    }

    fn clear(&mut self) {
        Vector::clear(self)
    }

    fn copy(&self) -> Self {
        Vector::copy(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        Vector::compare(self, other)
    }

    fn key_type(&self) -> &'static TypeDescriptor {
        self.key_type
    }

    fn to_json(&self) -> String {
        Vector::to_json(self)
    }

    fn to_xml(&self, element: &str, indent: bool) -> String {
        Vector::to_xml(self, element, indent)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Vector::to_bytes(self)
    }

    fn verify_links(&self) -> Result<()> {
        Vector::verify_links(self)
    }
}

impl<'a> WireContainer<'a> for Vector<'a> {
    fn wire_key_type(&self) -> Result<&'static TypeDescriptor> {
        let keyed = self.iter().filter(|(_, node)| node.key.is_some()).count();
        if keyed == self.size {
            Ok(self.key_type.owning())
        } else if keyed == 0 {
            Ok(&TYPE_NULL)
        } else {
            Err(CollectionError::invalid_argument(format!(
                "vector mixes {} keyed and {} unkeyed entries",
                keyed,
                self.size - keyed
            )))
        }
    }

    fn wire_len(&self) -> usize {
        self.size
    }

    fn visit_entries<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(Option<&Value<'a>>, &Value<'a>, &'static TypeDescriptor) -> Result<()>,
    {
        for (_, node) in self.iter() {
            visit(node.key.as_ref(), &node.value, node.value_type)?;
        }
        Ok(())
    }

    fn from_header(key_type: &'static TypeDescriptor, capacity_hint: usize) -> Result<Self> {
        Self::with_capacity(key_type, capacity_hint)
    }

    fn push_decoded(
        &mut self,
        key: Value<'a>,
        value: Value<'a>,
        value_type: &'static TypeDescriptor,
    ) -> Result<()> {
        let key = if self.key_type.kind() == ValueKind::Null {
            None
        } else {
            Some(key)
        };
        self.add_entry(key, value, Some(value_type)).map(|_| ())
    }
}
