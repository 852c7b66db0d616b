//! Bounded path → thumbnail table with least-recently-used eviction.

use std::num::NonZeroUsize;

use ::lru::LruCache;

use crate::thumb::asset::VisualAsset;

/// Capacity used when none (or zero) is configured.
pub const DEFAULT_CAPACITY: usize = 500;

/// Decoded thumbnails keyed by normalised path.
///
/// Only touched from the UI thread, so no locking.
pub struct BoundedCache {
    entries: LruCache<String, VisualAsset>,
}

impl BoundedCache {
    /// Creates a cache holding at most `capacity` entries.
    /// A capacity of `0` falls back to [`DEFAULT_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
        }
    }

    /// Returns the asset for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<VisualAsset> {
        self.entries.get(key).cloned()
    }

    /// Checks presence without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Inserts or replaces `key`. Returns the key evicted to make room,
    /// if any.
    pub fn insert(&mut self, key: String, asset: VisualAsset) -> Option<String> {
        match self.entries.push(key.clone(), asset) {
            Some((old_key, _)) if old_key != key => {
                tracing::trace!(evicted = %old_key, "thumbnail cache full");
                Some(old_key)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(cache: &mut BoundedCache, keys: &[&str]) {
        for k in keys {
            cache.insert(k.to_string(), VisualAsset::blank(1));
        }
    }

    #[test]
    fn evicts_exactly_the_least_recent_entry() {
        let mut cache = BoundedCache::new(3);
        fill(&mut cache, &["/a", "/b", "/c"]);

        let evicted = cache.insert("/d".to_string(), VisualAsset::blank(1));

        assert_eq!(evicted.as_deref(), Some("/a"));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("/a"));
        assert!(cache.contains("/d"));
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = BoundedCache::new(3);
        fill(&mut cache, &["/a", "/b", "/c"]);
        assert!(cache.get("/a").is_some());

        let evicted = cache.insert("/d".to_string(), VisualAsset::blank(1));

        assert_eq!(evicted.as_deref(), Some("/b"));
        assert!(cache.contains("/a"));
    }

    #[test]
    fn replacing_a_key_is_not_an_eviction() {
        let mut cache = BoundedCache::new(2);
        fill(&mut cache, &["/a", "/b"]);
        let replacement = VisualAsset::blank(2);

        assert_eq!(cache.insert("/a".to_string(), replacement.clone()), None);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("/a").unwrap().ptr_eq(&replacement));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut cache = BoundedCache::new(5);
        for i in 0..50 {
            cache.insert(format!("/f{i}"), VisualAsset::blank(1));
            assert!(cache.len() <= 5);
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn zero_capacity_uses_default() {
        assert_eq!(BoundedCache::new(0).capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn clear_empties() {
        let mut cache = BoundedCache::new(2);
        fill(&mut cache, &["/a"]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
