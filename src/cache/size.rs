//! Size Estimator Module
//!
//! Approximate byte cost of stored values, used only to enforce the memory
//! bound. Estimates ignore allocator overhead and container headers, so the
//! memory limit is a soft target and not an exact allocation count.

use std::mem;
use std::sync::Arc;

use serde_json::Value;

// == Size Estimate ==
/// Approximate in-memory size of a value, in bytes.
pub trait SizeEstimate {
    /// Returns the estimated number of bytes held by this value.
    fn estimated_size(&self) -> u64;
}

/// Estimated cost of one cache entry: its key bytes plus its value.
pub fn entry_size<V: SizeEstimate>(key: &str, value: &V) -> u64 {
    key.len() as u64 + value.estimated_size()
}

macro_rules! impl_fixed_size {
    ($($t:ty),* $(,)?) => {
        $(
            impl SizeEstimate for $t {
                fn estimated_size(&self) -> u64 {
                    mem::size_of::<$t>() as u64
                }
            }
        )*
    };
}

impl_fixed_size!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
);

impl SizeEstimate for String {
    fn estimated_size(&self) -> u64 {
        self.len() as u64
    }
}

impl SizeEstimate for &str {
    fn estimated_size(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: SizeEstimate> SizeEstimate for Vec<T> {
    fn estimated_size(&self) -> u64 {
        self.iter().map(SizeEstimate::estimated_size).sum()
    }
}

impl<T: SizeEstimate> SizeEstimate for Option<T> {
    fn estimated_size(&self) -> u64 {
        self.as_ref().map_or(0, SizeEstimate::estimated_size)
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Box<T> {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }
}

impl<T: SizeEstimate + ?Sized> SizeEstimate for Arc<T> {
    fn estimated_size(&self) -> u64 {
        (**self).estimated_size()
    }
}

impl SizeEstimate for Value {
    fn estimated_size(&self) -> u64 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 8,
            Value::String(s) => s.len() as u64,
            Value::Array(items) => items.iter().map(SizeEstimate::estimated_size).sum(),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| k.len() as u64 + v.estimated_size())
                .sum(),
        }
    }
}
