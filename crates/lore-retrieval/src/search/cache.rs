//! In-memory cache of successful strategy results.
//!
//! Keys are blake3 hashes of (strategy, collection, query, k).
//! Only clean successes are stored; fallbacks and failures are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use lore_core::config::CacheConfig;
use lore_core::models::{RetrievalCandidate, StrategyKind};

pub struct RetrievalCache {
    cache: Cache<String, Arc<Vec<RetrievalCandidate>>>,
}

impl RetrievalCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        Self { cache }
    }

    pub fn key(strategy: StrategyKind, collection_id: &str, query: &str, k: usize) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(strategy.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(collection_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(query.as_bytes());
        hasher.update(b"\0");
        hasher.update(&(k as u64).to_le_bytes());
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<RetrievalCandidate>>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, candidates: Vec<RetrievalCandidate>) {
        self.cache.insert(key, Arc::new(candidates));
    }

    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::PassageRef;

    #[test]
    fn keys_separate_every_component() {
        let a = RetrievalCache::key(StrategyKind::Standard, "db", "orders", 5);
        assert_ne!(a, RetrievalCache::key(StrategyKind::Hyde, "db", "orders", 5));
        assert_ne!(a, RetrievalCache::key(StrategyKind::Standard, "kb", "orders", 5));
        assert_ne!(a, RetrievalCache::key(StrategyKind::Standard, "db", "order", 5));
        assert_ne!(a, RetrievalCache::key(StrategyKind::Standard, "db", "orders", 6));
        assert_eq!(a, RetrievalCache::key(StrategyKind::Standard, "db", "orders", 5));
    }

    #[test]
    fn insert_and_get() {
        let cache = RetrievalCache::new(&CacheConfig::default());
        let candidate =
            RetrievalCandidate::new(PassageRef::new("p1"), "text", 0.5, StrategyKind::Standard);
        let key = RetrievalCache::key(StrategyKind::Standard, "db", "q", 5);
        cache.insert(key.clone(), vec![candidate.clone()]);
        assert_eq!(cache.get(&key).as_deref(), Some(&vec![candidate]));
        assert!(cache.get("missing").is_none());
    }
}
