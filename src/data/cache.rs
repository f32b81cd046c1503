use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::Value;

const RESPONSE_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(n) => n,
    None => panic!("cache size must be non-zero"),
};

struct Entry {
    stored_at: Instant,
    ttl: Duration,
    body: Value,
}

/// Raw JSON bodies of immutable resources, keyed by request path.
pub struct DataCache {
    responses: LruCache<String, Entry>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::with_capacity(RESPONSE_CACHE_SIZE)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            responses: LruCache::new(capacity),
        }
    }

    /// Get a cached body. Returns None if expired or missing.
    pub fn get(&mut self, path: &str) -> Option<Value> {
        let entry = self.responses.get(path)?;
        if entry.stored_at.elapsed() < entry.ttl {
            Some(entry.body.clone())
        } else {
            self.responses.pop(path);
            None
        }
    }

    pub fn put(&mut self, path: String, body: Value, ttl: Duration) {
        self.responses.put(
            path,
            Entry {
                stored_at: Instant::now(),
                ttl,
                body,
            },
        );
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_put_and_get() {
        let mut cache = DataCache::new();
        cache.put("block/1".to_string(), json!({"number": 1}), HOUR);
        assert_eq!(cache.get("block/1"), Some(json!({"number": 1})));
    }

    #[test]
    fn test_get_missing() {
        let mut cache = DataCache::new();
        assert!(cache.get("block/999").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let mut cache = DataCache::new();
        cache.put("parcel/ab".to_string(), json!({"hash": "ab"}), Duration::ZERO);
        assert!(cache.get("parcel/ab").is_none());
        assert!(cache.responses.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = DataCache::with_capacity(NonZeroUsize::new(2).unwrap());
        cache.put("block/1".to_string(), json!(1), HOUR);
        cache.put("block/2".to_string(), json!(2), HOUR);
        cache.put("block/3".to_string(), json!(3), HOUR);
        assert!(cache.get("block/1").is_none());
        assert!(cache.get("block/3").is_some());
    }

    #[test]
    fn test_overwrite_existing_key() {
        let mut cache = DataCache::new();
        cache.put("block/1".to_string(), json!({"hash": "old"}), HOUR);
        cache.put("block/1".to_string(), json!({"hash": "new"}), HOUR);
        assert_eq!(cache.get("block/1"), Some(json!({"hash": "new"})));
    }
}
