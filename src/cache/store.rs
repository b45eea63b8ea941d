//! L1 response store.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;

use super::config::CacheConfig;
use super::keys::L1Key;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";
const METRIC_L1_HIT_TOTAL: &str = "sitedesk_cache_l1_hit_total";
const METRIC_L1_MISS_TOTAL: &str = "sitedesk_cache_l1_miss_total";
const METRIC_L1_EVICT_TOTAL: &str = "sitedesk_cache_l1_evict_total";

/// Cached HTTP response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// LRU store of rendered API responses.
///
/// `generation` advances whenever invalidation runs, so a response computed
/// across an invalidation can be recognized and left uncached.
pub struct L1Store {
    responses: RwLock<LruCache<L1Key, CachedResponse>>,
    generation: AtomicU64,
}

impl L1Store {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            responses: RwLock::new(LruCache::new(config.response_limit_non_zero())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &L1Key) -> Option<CachedResponse> {
        let hit = rw_write(&self.responses, SOURCE, "l1_get")
            .get(key)
            .cloned();
        match hit {
            Some(_) => counter!(METRIC_L1_HIT_TOTAL).increment(1),
            None => counter!(METRIC_L1_MISS_TOTAL).increment(1),
        }
        hit
    }

    /// Insert a response, returning the key evicted to make room, if any.
    pub fn set(&self, key: L1Key, response: CachedResponse) -> Option<L1Key> {
        let evicted = rw_write(&self.responses, SOURCE, "l1_set")
            .push(key.clone(), response)
            .and_then(|(evicted_key, _)| (evicted_key != key).then_some(evicted_key));
        if evicted.is_some() {
            counter!(METRIC_L1_EVICT_TOTAL).increment(1);
        }
        evicted
    }

    /// Returns whether an entry was removed.
    pub fn invalidate(&self, key: &L1Key) -> bool {
        rw_write(&self.responses, SOURCE, "l1_invalidate")
            .pop(key)
            .is_some()
    }

    pub fn invalidate_all(&self) {
        rw_write(&self.responses, SOURCE, "l1_invalidate_all").clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn len(&self) -> usize {
        rw_read(&self.responses, SOURCE, "l1_len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn response(body: &'static str) -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Bytes::from(body),
        }
    }

    #[test]
    fn response_roundtrip_and_invalidate() {
        let store = L1Store::new(&CacheConfig::default());
        let key = L1Key::new("/api/v1/shared", "");

        assert!(store.get(&key).is_none());
        assert!(store.set(key.clone(), response("{}")).is_none());

        let cached = store.get(&key).expect("cached response");
        assert_eq!(cached.body, Bytes::from("{}"));

        assert!(store.invalidate(&key));
        assert!(!store.invalidate(&key));
        assert!(store.is_empty());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let config = CacheConfig {
            response_limit: 2,
            ..Default::default()
        };
        let store = L1Store::new(&config);
        let a = L1Key::new("/a", "");
        let b = L1Key::new("/b", "");
        let c = L1Key::new("/c", "");

        store.set(a.clone(), response("a"));
        store.set(b.clone(), response("b"));
        assert!(store.get(&a).is_some());

        assert_eq!(store.set(c, response("c")), Some(b));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replacing_a_key_is_not_an_eviction() {
        let store = L1Store::new(&CacheConfig::default());
        let key = L1Key::new("/a", "");

        store.set(key.clone(), response("1"));
        assert!(store.set(key.clone(), response("2")).is_none());
        assert_eq!(store.get(&key).map(|r| r.body), Some(Bytes::from("2")));
    }

    #[test]
    fn generation_advances_monotonically() {
        let store = L1Store::new(&CacheConfig::default());
        let before = store.generation();
        assert_eq!(store.advance_generation(), before + 1);
        assert_eq!(store.generation(), before + 1);
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = L1Store::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .responses
                .write()
                .expect("responses lock should be acquired");
            panic!("poison responses lock");
        }));

        store.set(L1Key::new("/a", ""), response("a"));
        assert_eq!(store.len(), 1);
    }
}
