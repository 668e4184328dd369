//! Node Arena Module
//!
//! Storage for cache nodes addressed by stable integer handles, plus the
//! doubly-linked recency [`Chain`] threaded through them. The lookup index and
//! the ordering structures both store handles, never references, so a node
//! has exactly one owner: the arena.

use std::ops::{Index, IndexMut};

use crate::cache::Document;

// == Handle ==
/// Stable address of a node inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

// == Node ==
/// A document plus the bookkeeping the engines need to order it.
#[derive(Debug)]
pub struct Node<V> {
    /// The stored document
    pub document: Document<V>,
    /// Estimated cost of the entry in bytes
    pub size: u64,
    /// Access frequency; only the LFU engine advances it
    pub frequency: u64,
    prev: Option<Handle>,
    next: Option<Handle>,
}

impl<V> Node<V> {
    /// Creates an unlinked node with a frequency of one.
    pub fn new(document: Document<V>, size: u64) -> Self {
        Self {
            document,
            size,
            frequency: 1,
            prev: None,
            next: None,
        }
    }
}

// == Arena ==
/// Slot storage for nodes. Freed slots are reused by later inserts.
#[derive(Debug)]
pub struct Arena<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    len: usize,
}

impl<V> Arena<V> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores a node and returns its handle.
    pub fn insert(&mut self, node: Node<V>) -> Handle {
        self.len += 1;
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                Handle(slot)
            }
            None => {
                self.slots.push(Some(node));
                Handle(self.slots.len() - 1)
            }
        }
    }

    /// Removes a node, freeing its slot. Returns `None` for a vacant handle.
    pub fn remove(&mut self, handle: Handle) -> Option<Node<V>> {
        let node = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        self.len -= 1;
        Some(node)
    }

    /// Returns the node behind `handle`, if it is occupied.
    #[cfg(test)]
    pub fn get(&self, handle: Handle) -> Option<&Node<V>> {
        self.slots.get(handle.0)?.as_ref()
    }

    /// Number of occupied slots.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Drops every node and forgets all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Index<Handle> for Arena<V> {
    type Output = Node<V>;

    fn index(&self, handle: Handle) -> &Node<V> {
        match self.slots.get(handle.0) {
            Some(Some(node)) => node,
            _ => panic!("vacant arena handle {:?}", handle),
        }
    }
}

impl<V> IndexMut<Handle> for Arena<V> {
    fn index_mut(&mut self, handle: Handle) -> &mut Node<V> {
        match self.slots.get_mut(handle.0) {
            Some(Some(node)) => node,
            _ => panic!("vacant arena handle {:?}", handle),
        }
    }
}

// == Chain ==
/// Recency-ordered doubly-linked list of arena nodes.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// A node belongs to at most one chain at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

impl Chain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Front ==
    /// Links an unlinked node at the most recent end.
    pub fn push_front<V>(&mut self, arena: &mut Arena<V>, handle: Handle) {
        let old_head = self.head;
        {
            let node = &mut arena[handle];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => arena[head].prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        self.len += 1;
    }

    // == Unlink ==
    /// Detaches a node that belongs to this chain.
    pub fn unlink<V>(&mut self, arena: &mut Arena<V>, handle: Handle) {
        let (prev, next) = {
            let node = &mut arena[handle];
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(p) => arena[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => arena[n].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    // == Move To Front ==
    /// Marks a node of this chain as the most recently used.
    pub fn move_to_front<V>(&mut self, arena: &mut Arena<V>, handle: Handle) {
        if self.head == Some(handle) {
            return;
        }
        self.unlink(arena, handle);
        self.push_front(arena, handle);
    }

    /// Most recently used node.
    #[cfg(test)]
    pub fn front(&self) -> Option<Handle> {
        self.head
    }

    /// Least recently used node.
    pub fn back(&self) -> Option<Handle> {
        self.tail
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walks the chain from most to least recently used.
    pub fn iter<'a, V>(&self, arena: &'a Arena<V>) -> ChainIter<'a, V> {
        ChainIter {
            arena,
            cursor: self.head,
            forward: true,
        }
    }

    /// Walks the chain from least to most recently used.
    pub fn iter_rev<'a, V>(&self, arena: &'a Arena<V>) -> ChainIter<'a, V> {
        ChainIter {
            arena,
            cursor: self.tail,
            forward: false,
        }
    }
}

/// Iterator over the handles of a [`Chain`].
pub struct ChainIter<'a, V> {
    arena: &'a Arena<V>,
    cursor: Option<Handle>,
    forward: bool,
}

impl<V> Iterator for ChainIter<'_, V> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let handle = self.cursor?;
        let node = &self.arena[handle];
        self.cursor = if self.forward { node.next } else { node.prev };
        Some(handle)
    }
}
