//! In-memory cache of resolved and filled documents

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// A cached document and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDocument {
    pub data: Vec<u8>,
    pub origin: String,
}

struct Entries {
    lru: LruCache<String, CachedDocument>,
    total_bytes: usize,
}

/// LRU document cache bounded by entry count and total bytes
pub struct DocumentCache {
    entries: Mutex<Entries>,
    max_bytes: usize,
}

impl DocumentCache {
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store a document under a fresh key and return the key.
    ///
    /// Returns `None` when the document is larger than the whole byte budget
    /// and was not stored.
    pub fn insert(&self, data: Vec<u8>, origin: impl Into<String>) -> Option<String> {
        let size = data.len();
        if size > self.max_bytes {
            tracing::warn!(size, max_bytes = self.max_bytes, "Document too large to cache");
            return None;
        }

        let mut entries = self.entries.lock();
        let key = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !entries.lru.contains(&candidate) {
                break candidate;
            }
        };

        while entries.total_bytes + size > self.max_bytes {
            match entries.lru.pop_lru() {
                Some((_, evicted)) => {
                    entries.total_bytes = entries.total_bytes.saturating_sub(evicted.data.len());
                }
                None => break,
            }
        }

        if let Some((_, evicted)) = entries.lru.push(
            key.clone(),
            CachedDocument {
                data,
                origin: origin.into(),
            },
        ) {
            // Capacity eviction
            entries.total_bytes = entries.total_bytes.saturating_sub(evicted.data.len());
        }
        entries.total_bytes += size;
        Some(key)
    }

    pub fn get(&self, key: &str) -> Option<CachedDocument> {
        self.entries.lock().lru.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().lru.contains(key)
    }

    pub fn remove(&self, key: &str) -> Option<CachedDocument> {
        let mut entries = self.entries.lock();
        let removed = entries.lru.pop(key)?;
        entries.total_bytes = entries.total_bytes.saturating_sub(removed.data.len());
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().lru.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.entries.lock().total_bytes
    }
}
