//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check both engines against simple reference models and
//! to verify index/ordering consistency after every operation.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::cache::{entry_size, LfuRepository, Limits, LruRepository, Repository};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Keys drawn from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,24}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Keys,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Keys),
    ]
}

// == Reference Models ==
/// Recency list: front = most recent.
#[derive(Default)]
struct LruModel {
    order: VecDeque<(String, String)>,
    max_items: usize,
}

impl LruModel {
    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn set(&mut self, key: String, value: String) {
        if let Some(pos) = self.position(&key) {
            self.order.remove(pos);
        }
        self.order.push_front((key, value));
        while self.max_items > 0 && self.order.len() > self.max_items {
            self.order.pop_back();
        }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let pos = self.position(key)?;
        let entry = self.order.remove(pos)?;
        let value = entry.1.clone();
        self.order.push_front(entry);
        Some(value)
    }

    fn delete(&mut self, key: &str) -> Option<String> {
        let pos = self.position(key)?;
        self.order.remove(pos).map(|(_, v)| v)
    }

    fn keys(&self) -> Vec<String> {
        self.order.iter().map(|(k, _)| k.clone()).collect()
    }
}

/// Frequency plus a logical clock of the last touch per key.
#[derive(Default)]
struct LfuModel {
    entries: HashMap<String, (String, u64, u64)>,
    clock: u64,
    max_items: usize,
}

impl LfuModel {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn set(&mut self, key: String, value: String) {
        let now = self.tick();
        let entry = self.entries.entry(key.clone()).or_insert((String::new(), 0, 0));
        *entry = (value, entry.1 + 1, now);

        while self.max_items > 0 && self.entries.len() > self.max_items {
            let victim = self
                .entries
                .iter()
                .filter(|(k, _)| **k != key)
                .min_by_key(|(_, (_, freq, touched))| (*freq, *touched))
                .map(|(k, _)| k.clone());
            match victim {
                Some(victim) => self.entries.remove(&victim),
                None => break,
            };
        }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let now = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.1 += 1;
        entry.2 = now;
        Some(entry.0.clone())
    }

    fn delete(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(v, _, _)| v)
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn sorted(mut keys: Vec<String>) -> Vec<String> {
    keys.sort();
    keys
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // LRU engine agrees with the recency-list model, including key order
    #[test]
    fn prop_lru_matches_model(
        max_items in 1u64..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut repo = LruRepository::new(Limits::new(max_items, 0, TEST_TTL));
        let mut model = LruModel { max_items: max_items as usize, ..Default::default() };

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    repo.set(key.clone(), value.clone()).unwrap();
                    model.set(key, value);
                }
                CacheOp::Get { key } => {
                    let actual = repo.get(&key).cloned().ok();
                    prop_assert_eq!(actual, model.get(&key), "get({}) mismatch", key);
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(repo.delete(&key).ok(), model.delete(&key));
                }
                CacheOp::Keys => {
                    prop_assert_eq!(repo.keys().unwrap(), model.keys());
                }
            }
            repo.assert_consistent();
            prop_assert!(repo.len() as u64 <= max_items);
        }
    }

    // LFU engine agrees with the frequency/last-touch model
    #[test]
    fn prop_lfu_matches_model(
        max_items in 1u64..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut repo = LfuRepository::new(Limits::new(max_items, 0, TEST_TTL));
        let mut model = LfuModel { max_items: max_items as usize, ..Default::default() };

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    repo.set(key.clone(), value.clone()).unwrap();
                    model.set(key, value);
                }
                CacheOp::Get { key } => {
                    let actual = repo.get(&key).cloned().ok();
                    prop_assert_eq!(actual, model.get(&key), "get({}) mismatch", key);
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(repo.delete(&key).ok(), model.delete(&key));
                }
                CacheOp::Keys => {
                    prop_assert_eq!(sorted(repo.keys().unwrap()), model.keys());
                }
            }
            repo.assert_consistent();
            prop_assert!(repo.len() as u64 <= max_items);
        }
    }

    // Memory estimate never exceeds the bound unless a single entry outweighs it
    #[test]
    fn prop_memory_bound(
        max_memory in 8u64..120,
        use_lfu in any::<bool>(),
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..60)
    ) {
        let limits = Limits::new(0, max_memory, TEST_TTL);
        let mut repo: Box<dyn Repository<String>> = if use_lfu {
            Box::new(LfuRepository::new(limits))
        } else {
            Box::new(LruRepository::new(limits))
        };

        for (key, value) in entries {
            let size = entry_size(&key, &value);
            repo.set(key.clone(), value.clone()).unwrap();

            if size > max_memory {
                prop_assert_eq!(repo.len(), 1);
            } else {
                prop_assert!(
                    repo.memory_usage() <= max_memory,
                    "memory {} exceeds bound {}",
                    repo.memory_usage(),
                    max_memory
                );
            }
            // The write itself is never refused
            prop_assert_eq!(repo.get(&key).cloned(), Ok(value));
        }
    }

    // Storing then reading before expiry returns the stored value
    #[test]
    fn prop_roundtrip_storage(
        key in key_strategy(),
        value in value_strategy(),
        use_lfu in any::<bool>()
    ) {
        let limits = Limits::new(100, 0, TEST_TTL);
        let mut repo: Box<dyn Repository<String>> = if use_lfu {
            Box::new(LfuRepository::new(limits))
        } else {
            Box::new(LruRepository::new(limits))
        };

        repo.set(key.clone(), value.clone()).unwrap();
        prop_assert_eq!(repo.get(&key).cloned(), Ok(value.clone()));
        prop_assert_eq!(repo.delete(&key), Ok(value));
        prop_assert_eq!(repo.get(&key).cloned(), Err(CacheError::Missed));
    }

    // Clearing leaves nothing behind and is idempotent
    #[test]
    fn prop_clear_empties(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..30)
    ) {
        let mut lru = LruRepository::new(Limits::new(0, 0, TEST_TTL));
        let mut lfu = LfuRepository::new(Limits::new(0, 0, TEST_TTL));
        for (key, value) in &entries {
            lru.set(key.clone(), value.clone()).unwrap();
            lfu.set(key.clone(), value.clone()).unwrap();
        }

        for _ in 0..2 {
            lru.clear().unwrap();
            lfu.clear().unwrap();
            lru.assert_consistent();
            lfu.assert_consistent();
            prop_assert!(lru.keys().unwrap().is_empty());
            prop_assert!(lfu.keys().unwrap().is_empty());
            prop_assert_eq!(lru.memory_usage(), 0);
            prop_assert_eq!(lfu.memory_usage(), 0);
        }

        for (key, _) in &entries {
            prop_assert_eq!(lru.get(key).cloned(), Err(CacheError::Missed));
            prop_assert_eq!(lfu.get(key).cloned(), Err(CacheError::Missed));
        }
    }
}
