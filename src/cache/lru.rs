//! LRU Engine Module
//!
//! Least Recently Used eviction over a hash index and a recency chain.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};

use crate::cache::arena::{Arena, Chain, Handle, Node};
use crate::cache::size::{entry_size, SizeEstimate};
use crate::cache::{CacheStats, Document, Limits, Repository};
use crate::error::{CacheError, Result};

// == LRU Repository ==
/// Cache engine evicting the least recently used entry first.
///
/// The index maps keys to arena handles; the chain orders the same handles
/// from most recently used (front) to least recently used (back).
#[derive(Debug)]
pub struct LruRepository<V> {
    index: HashMap<String, Handle>,
    arena: Arena<V>,
    order: Chain,
    limits: Limits,
    memory: u64,
    stats: CacheStats,
}

impl<V: SizeEstimate> LruRepository<V> {
    // == Constructor ==
    /// Creates an empty engine bounded by `limits`.
    pub fn new(limits: Limits) -> Self {
        Self {
            index: HashMap::new(),
            arena: Arena::new(),
            order: Chain::new(),
            limits,
            memory: 0,
            stats: CacheStats::new(),
        }
    }

    // == Remove Node ==
    /// Unlinks a node from the chain, the index and the arena.
    fn remove_node(&mut self, handle: Handle) -> Option<Node<V>> {
        self.order.unlink(&mut self.arena, handle);
        let node = self.arena.remove(handle)?;
        self.index.remove(&node.document.key);
        self.memory = self.memory.saturating_sub(node.size);
        Some(node)
    }

    // == Enforce Limits ==
    /// Evicts from the least recent end until both bounds hold.
    ///
    /// `keep` is the entry written by the current call and is never chosen.
    fn enforce_limits(&mut self, keep: Handle) {
        while self.limits.exceeded(self.index.len(), self.memory) {
            let victim = match self.order.back() {
                Some(handle) if handle != keep => handle,
                _ => break,
            };
            if let Some(node) = self.remove_node(victim) {
                self.stats.record_eviction();
                debug!(
                    "LRU evicted key={} entries={} memory={}",
                    node.document.key,
                    self.index.len(),
                    self.memory
                );
            }
        }
    }

    fn drop_expired(&mut self, handle: Handle) {
        if let Some(node) = self.remove_node(handle) {
            self.stats.record_expiration();
            trace!("LRU dropped expired key={}", node.document.key);
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let forward: Vec<Handle> = self.order.iter(&self.arena).collect();
        let backward: Vec<Handle> = self.order.iter_rev(&self.arena).collect();

        assert_eq!(forward.len(), self.index.len(), "chain/index length mismatch");
        assert_eq!(backward.len(), forward.len(), "chain links are asymmetric");
        assert_eq!(self.order.len(), forward.len(), "chain length counter drifted");
        assert_eq!(self.arena.len(), forward.len(), "arena holds orphan nodes");

        let mut memory = 0;
        for handle in forward {
            let node = &self.arena[handle];
            assert_eq!(self.index.get(&node.document.key), Some(&handle));
            memory += node.size;
        }
        assert_eq!(memory, self.memory, "memory estimate drifted");
    }
}

impl<V: SizeEstimate> Repository<V> for LruRepository<V> {
    fn set(&mut self, key: String, value: V) -> Result<()> {
        let size = entry_size(&key, &value);

        // An expired document is absent: the write starts a fresh entry
        if let Some(&stale) = self.index.get(&key) {
            if self.limits.is_expired(&self.arena[stale].document, Instant::now()) {
                self.drop_expired(stale);
            }
        }

        let handle = match self.index.get(&key) {
            Some(&handle) => {
                let node = &mut self.arena[handle];
                self.memory = self.memory.saturating_sub(node.size) + size;
                node.size = size;
                node.document.replace(value);
                self.order.move_to_front(&mut self.arena, handle);
                handle
            }
            None => {
                let handle = self
                    .arena
                    .insert(Node::new(Document::new(key.clone(), value), size));
                self.order.push_front(&mut self.arena, handle);
                self.index.insert(key, handle);
                self.memory += size;
                handle
            }
        };

        self.enforce_limits(handle);
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<&V> {
        let Some(&handle) = self.index.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::Missed);
        };

        if self.limits.is_expired(&self.arena[handle].document, Instant::now()) {
            self.drop_expired(handle);
            self.stats.record_miss();
            return Err(CacheError::Missed);
        }

        self.stats.record_hit();
        self.order.move_to_front(&mut self.arena, handle);
        let node = &mut self.arena[handle];
        node.document.touch();
        Ok(&node.document.value)
    }

    fn delete(&mut self, key: &str) -> Result<V> {
        let handle = *self.index.get(key).ok_or(CacheError::Missed)?;
        if self.limits.is_expired(&self.arena[handle].document, Instant::now()) {
            self.drop_expired(handle);
            return Err(CacheError::Missed);
        }
        self.remove_node(handle)
            .map(|node| node.document.value)
            .ok_or(CacheError::Missed)
    }

    fn keys(&mut self) -> Result<Vec<String>> {
        let now = Instant::now();
        let mut keys = Vec::with_capacity(self.index.len());
        let mut expired = Vec::new();

        for handle in self.order.iter(&self.arena) {
            let document = &self.arena[handle].document;
            if self.limits.is_expired(document, now) {
                expired.push(handle);
            } else {
                keys.push(document.key.clone());
            }
        }

        for handle in expired {
            self.drop_expired(handle);
        }
        Ok(keys)
    }

    fn clear(&mut self) -> Result<()> {
        debug!("LRU cleared {} entries", self.index.len());
        self.index.clear();
        self.arena.clear();
        self.order = Chain::new();
        self.memory = 0;
        Ok(())
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn memory_usage(&self) -> u64 {
        self.memory
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_usage(self.index.len(), self.memory);
        stats
    }
}
