//! Per-bucket ordered index and the node arena it points into.
//!
//! Every entry of a [`HashTable`](super::HashTable) lives in one [`NodeArena`]
//! slot and is addressed by a [`NodeId`]. A [`BucketTree`] keeps the ids of the
//! entries hashed to its bucket sorted by key, so lookups are a binary search
//! and the bucket's head and tail are its first and last ids.

use std::cmp::Ordering;

use crate::error::{CollectionError, Result};

/// Index of a node in a [`NodeArena`].
pub(crate) type NodeId = u32;

/// Slab of nodes with a free list of released slots.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<T> {
    slots: Vec<Option<T>>,
    free: Vec<NodeId>,
    live: usize,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots
            .try_reserve(capacity)
            .map_err(|_| CollectionError::out_of_memory(capacity))?;
        Ok(Self {
            slots,
            free: Vec::new(),
            live: 0,
        })
    }

    /// Store `node`, reusing a released slot when one is available.
    pub fn allocate(&mut self, node: T) -> Result<NodeId> {
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id as usize] = Some(node);
                id
            }
            None => {
                let id = NodeId::try_from(self.slots.len())
                    .ok()
                    .filter(|id| *id < NodeId::MAX)
                    .ok_or_else(|| CollectionError::out_of_memory(self.slots.len()))?;
                self.slots
                    .try_reserve(1)
                    .map_err(|_| CollectionError::out_of_memory(self.slots.len() + 1))?;
                self.slots.push(Some(node));
                id
            }
        };
        self.live += 1;
        Ok(id)
    }

    /// Take the node out of `id`, returning the slot to the free list.
    pub fn release(&mut self, id: NodeId) -> Option<T> {
        let node = self.slots.get_mut(id as usize)?.take()?;
        self.free.push(id);
        self.live -= 1;
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id as usize).and_then(Option::as_mut)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Same layout with every live node transformed; ids stay valid.
    pub fn map<U, F>(&self, mut f: F) -> NodeArena<U>
    where
        F: FnMut(&T) -> U,
    {
        NodeArena {
            slots: self.slots.iter().map(|slot| slot.as_ref().map(&mut f)).collect(),
            free: self.free.clone(),
            live: self.live,
        }
    }

    /// Consuming variant of [`NodeArena::map`].
    pub fn into_map<U, F>(self, mut f: F) -> NodeArena<U>
    where
        F: FnMut(T) -> U,
    {
        NodeArena {
            slots: self.slots.into_iter().map(|slot| slot.map(&mut f)).collect(),
            free: self.free,
            live: self.live,
        }
    }
}

/// Key-ordered node ids of one bucket.
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketTree {
    nodes: Vec<NodeId>,
}

impl BucketTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Entry with the smallest key.
    pub fn head(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Entry with the largest key.
    pub fn tail(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Binary search with `cmp` ordering a stored node against the key sought.
    /// `Ok` is the position of the match, `Err` where it would go.
    pub fn search<F>(&self, cmp: F) -> std::result::Result<usize, usize>
    where
        F: FnMut(&NodeId) -> Ordering,
    {
        self.nodes.binary_search_by(cmp)
    }

    pub fn query<F>(&self, cmp: F) -> Option<NodeId>
    where
        F: FnMut(&NodeId) -> Ordering,
    {
        self.search(cmp).ok().map(|position| self.nodes[position])
    }

    pub fn insert_at(&mut self, position: usize, id: NodeId) {
        self.nodes.insert(position, id);
    }

    pub fn remove_at(&mut self, position: usize) -> NodeId {
        self.nodes.remove(position)
    }
}
