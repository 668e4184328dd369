//! Document Module
//!
//! Defines the stored unit: a key, its value and the instant it was last touched.

use std::time::{Duration, Instant};

// == Document ==
/// A single cached key-value pair with its last-touch timestamp.
#[derive(Debug, Clone)]
pub struct Document<V> {
    /// The unique key
    pub key: String,
    /// The stored value
    pub value: V,
    /// Last time the document was written or successfully read
    pub stored_at: Instant,
}

impl<V> Document<V> {
    // == Constructor ==
    /// Creates a document stamped with the current instant.
    pub fn new(key: String, value: V) -> Self {
        Self {
            key,
            value,
            stored_at: Instant::now(),
        }
    }

    // == Replace ==
    /// Overwrites the value and refreshes the timestamp, returning the old value.
    pub fn replace(&mut self, value: V) -> V {
        self.touch();
        std::mem::replace(&mut self.value, value)
    }

    // == Touch ==
    /// Refreshes the timestamp without changing the value.
    pub fn touch(&mut self) {
        self.stored_at = Instant::now();
    }

    // == Age ==
    /// Time elapsed since the document was last touched, as seen from `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    // == Is Expired ==
    /// Checks whether the document has outlived `expiry_time` at `now`.
    ///
    /// A document is expired once its age is strictly greater than the
    /// expiry time. A zero expiry time disables expiration.
    pub fn is_expired(&self, expiry_time: Duration, now: Instant) -> bool {
        !expiry_time.is_zero() && self.age(now) > expiry_time
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_document_creation() {
        let doc = Document::new("name".to_string(), "John Snow".to_string());

        assert_eq!(doc.key, "name");
        assert_eq!(doc.value, "John Snow");
        assert!(!doc.is_expired(Duration::from_secs(10), Instant::now()));
    }

    #[test]
    fn test_document_expiration() {
        let doc = Document::new("key".to_string(), 1u32);

        sleep(Duration::from_millis(30));

        assert!(doc.is_expired(Duration::from_millis(10), Instant::now()));
        assert!(!doc.is_expired(Duration::from_secs(10), Instant::now()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let doc = Document::new("key".to_string(), 1u32);
        let exactly_at_limit = doc.stored_at + Duration::from_millis(50);

        // Age equal to the expiry time is still live
        assert!(!doc.is_expired(Duration::from_millis(50), exactly_at_limit));
        assert!(doc.is_expired(
            Duration::from_millis(50),
            exactly_at_limit + Duration::from_millis(1)
        ));
    }

    #[test]
    fn test_zero_expiry_never_expires() {
        let doc = Document::new("key".to_string(), 1u32);
        let much_later = doc.stored_at + Duration::from_secs(3600);

        assert!(!doc.is_expired(Duration::ZERO, much_later));
    }

    #[test]
    fn test_replace_refreshes_timestamp() {
        let mut doc = Document::new("key".to_string(), "old".to_string());
        let first = doc.stored_at;

        sleep(Duration::from_millis(5));
        let previous = doc.replace("new".to_string());

        assert_eq!(previous, "old");
        assert_eq!(doc.value, "new");
        assert!(doc.stored_at > first);
    }

    #[test]
    fn test_age_before_store_is_zero() {
        let doc = Document::new("key".to_string(), 1u32);
        if let Some(earlier) = doc.stored_at.checked_sub(Duration::from_millis(1)) {
            assert_eq!(doc.age(earlier), Duration::ZERO);
        }
    }
}
