//! LFU Engine Module
//!
//! Least Frequently Used eviction over a hash index and frequency buckets.
//! Each bucket is a recency chain, so ties between equally frequent entries
//! go to the one touched longest ago.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::{debug, trace};

use crate::cache::arena::{Arena, Chain, Handle, Node};
use crate::cache::size::{entry_size, SizeEstimate};
use crate::cache::{CacheStats, Document, Limits, Repository};
use crate::error::{CacheError, Result};

// == LFU Repository ==
/// Cache engine evicting the least frequently used entry first.
///
/// Only non-empty buckets are kept in `buckets`. `min_frequency` is the
/// lowest key of `buckets`, or 0 when the engine is empty.
#[derive(Debug)]
pub struct LfuRepository<V> {
    index: HashMap<String, Handle>,
    arena: Arena<V>,
    buckets: BTreeMap<u64, Chain>,
    min_frequency: u64,
    limits: Limits,
    memory: u64,
    stats: CacheStats,
}

impl<V: SizeEstimate> LfuRepository<V> {
    // == Constructor ==
    /// Creates an empty engine bounded by `limits`.
    pub fn new(limits: Limits) -> Self {
        Self {
            index: HashMap::new(),
            arena: Arena::new(),
            buckets: BTreeMap::new(),
            min_frequency: 0,
            limits,
            memory: 0,
            stats: CacheStats::new(),
        }
    }

    // == Detach ==
    /// Unlinks a node from its bucket, dropping the bucket once empty and
    /// advancing the minimum frequency past it.
    fn detach(&mut self, handle: Handle) {
        let frequency = self.arena[handle].frequency;
        let Some(bucket) = self.buckets.get_mut(&frequency) else {
            return;
        };
        bucket.unlink(&mut self.arena, handle);

        if bucket.is_empty() {
            self.buckets.remove(&frequency);
            if frequency == self.min_frequency {
                self.min_frequency = self
                    .buckets
                    .range(frequency..)
                    .next()
                    .map_or(0, |(&next, _)| next);
            }
        }
    }

    // == Attach ==
    /// Links a node at the most recent end of the bucket for its frequency.
    fn attach(&mut self, handle: Handle) {
        let frequency = self.arena[handle].frequency;
        self.buckets
            .entry(frequency)
            .or_default()
            .push_front(&mut self.arena, handle);
        if self.min_frequency == 0 || frequency < self.min_frequency {
            self.min_frequency = frequency;
        }
    }

    // == Bump ==
    /// Moves a node one frequency bucket up.
    fn bump(&mut self, handle: Handle) {
        self.detach(handle);
        self.arena[handle].frequency += 1;
        self.attach(handle);
    }

    fn remove_node(&mut self, handle: Handle) -> Option<Node<V>> {
        self.detach(handle);
        let node = self.arena.remove(handle)?;
        self.index.remove(&node.document.key);
        self.memory = self.memory.saturating_sub(node.size);
        Some(node)
    }

    // == Eviction Candidate ==
    /// Least recent entry of the lowest frequency bucket, other than `keep`.
    fn eviction_candidate(&self, keep: Handle) -> Option<Handle> {
        let arena = &self.arena;
        self.buckets
            .range(self.min_frequency..)
            .flat_map(move |(_, bucket)| bucket.iter_rev(arena))
            .find(|&handle| handle != keep)
    }

    // == Enforce Limits ==
    /// Evicts until both bounds hold. `keep` is never chosen.
    fn enforce_limits(&mut self, keep: Handle) {
        while self.limits.exceeded(self.index.len(), self.memory) {
            let Some(victim) = self.eviction_candidate(keep) else {
                break;
            };
            if let Some(node) = self.remove_node(victim) {
                self.stats.record_eviction();
                debug!(
                    "LFU evicted key={} frequency={} entries={} memory={}",
                    node.document.key,
                    node.frequency,
                    self.index.len(),
                    self.memory
                );
            }
        }
    }

    fn drop_expired(&mut self, handle: Handle) {
        if let Some(node) = self.remove_node(handle) {
            self.stats.record_expiration();
            trace!("LFU dropped expired key={}", node.document.key);
        }
    }

    /// Current access frequency of `key`, without touching it.
    pub fn frequency(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&handle| self.arena[handle].frequency)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = 0;
        let mut memory = 0;

        for (&frequency, bucket) in &self.buckets {
            assert!(!bucket.is_empty(), "empty bucket {} retained", frequency);
            let forward: Vec<Handle> = bucket.iter(&self.arena).collect();
            assert_eq!(forward.len(), bucket.len(), "bucket length counter drifted");
            assert_eq!(
                bucket.iter_rev(&self.arena).count(),
                forward.len(),
                "bucket links are asymmetric"
            );
            for handle in forward {
                let node = &self.arena[handle];
                assert_eq!(node.frequency, frequency, "node filed under wrong bucket");
                assert_eq!(self.index.get(&node.document.key), Some(&handle));
                memory += node.size;
                seen += 1;
            }
        }

        assert_eq!(seen, self.index.len(), "buckets/index length mismatch");
        assert_eq!(self.arena.len(), seen, "arena holds orphan nodes");
        assert_eq!(memory, self.memory, "memory estimate drifted");
        let lowest = self.buckets.keys().next().copied().unwrap_or(0);
        assert_eq!(self.min_frequency, lowest, "stale minimum frequency");
    }
}

impl<V: SizeEstimate> Repository<V> for LfuRepository<V> {
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
                self.bump(handle);
                handle
            }
            None => {
                let handle = self
                    .arena
                    .insert(Node::new(Document::new(key.clone(), value), size));
                self.index.insert(key, handle);
                self.attach(handle);
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
        self.bump(handle);
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

        // Most frequent first, most recent first within a frequency
        for bucket in self.buckets.values().rev() {
            for handle in bucket.iter(&self.arena) {
                let document = &self.arena[handle].document;
                if self.limits.is_expired(document, now) {
                    expired.push(handle);
                } else {
                    keys.push(document.key.clone());
                }
            }
        }

        for handle in expired {
            self.drop_expired(handle);
        }
        Ok(keys)
    }

    fn clear(&mut self) -> Result<()> {
        debug!("LFU cleared {} entries", self.index.len());
        self.index.clear();
        self.arena.clear();
        self.buckets.clear();
        self.min_frequency = 0;
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
