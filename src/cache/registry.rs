//! Bidirectional cache registry.
//!
//! Tracks which cached responses were built from which logical pages, so a
//! page invalidation can find every response it makes stale.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::keys::{InvalidationTarget, L1Key, PagePath};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::registry";

pub struct CacheRegistry {
    page_to_keys: RwLock<HashMap<PagePath, HashSet<L1Key>>>,
    key_to_pages: RwLock<HashMap<L1Key, HashSet<PagePath>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            page_to_keys: RwLock::new(HashMap::new()),
            key_to_pages: RwLock::new(HashMap::new()),
        }
    }

    /// Register a cached response with the pages it depends on, replacing
    /// any earlier registration of the same key.
    pub fn register(&self, key: L1Key, pages: HashSet<PagePath>) {
        let mut p2k = rw_write(&self.page_to_keys, SOURCE, "register.page_to_keys");
        let mut k2p = rw_write(&self.key_to_pages, SOURCE, "register.key_to_pages");

        if let Some(previous) = k2p.remove(&key) {
            detach(&mut p2k, &key, previous);
        }
        for page in &pages {
            p2k.entry(page.clone()).or_default().insert(key.clone());
        }
        k2p.insert(key, pages);
    }

    pub fn keys_for_page(&self, page: &PagePath) -> HashSet<L1Key> {
        rw_read(&self.page_to_keys, SOURCE, "keys_for_page")
            .get(page)
            .cloned()
            .unwrap_or_default()
    }

    /// Every registered key whose pages fall under `target`.
    pub fn keys_for_target(&self, target: &InvalidationTarget) -> HashSet<L1Key> {
        match target {
            InvalidationTarget::Exact(page) => self.keys_for_page(page),
            InvalidationTarget::Layout(_) => {
                rw_read(&self.page_to_keys, SOURCE, "keys_for_target")
                    .iter()
                    .filter(|(page, _)| target.covers(page))
                    .flat_map(|(_, keys)| keys.iter().cloned())
                    .collect()
            }
        }
    }

    pub fn pages_for_key(&self, key: &L1Key) -> HashSet<PagePath> {
        rw_read(&self.key_to_pages, SOURCE, "pages_for_key")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove a key and clean up its page mappings.
    pub fn unregister(&self, key: &L1Key) {
        let mut p2k = rw_write(&self.page_to_keys, SOURCE, "unregister.page_to_keys");
        let mut k2p = rw_write(&self.key_to_pages, SOURCE, "unregister.key_to_pages");

        if let Some(pages) = k2p.remove(key) {
            detach(&mut p2k, key, pages);
        }
    }

    pub fn clear(&self) {
        rw_write(&self.page_to_keys, SOURCE, "clear.page_to_keys").clear();
        rw_write(&self.key_to_pages, SOURCE, "clear.key_to_pages").clear();
    }

    pub fn page_count(&self) -> usize {
        rw_read(&self.page_to_keys, SOURCE, "page_count").len()
    }

    pub fn key_count(&self) -> usize {
        rw_read(&self.key_to_pages, SOURCE, "key_count").len()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn detach(
    page_to_keys: &mut HashMap<PagePath, HashSet<L1Key>>,
    key: &L1Key,
    pages: HashSet<PagePath>,
) {
    for page in pages {
        if let Some(keys) = page_to_keys.get_mut(&page) {
            keys.remove(key);
            if keys.is_empty() {
                page_to_keys.remove(&page);
            }
        }
    }
}
