//! Cache of resolved external entity text
//!
//! External entities and the external DTD subset are fetched through
//! `EventSink::resolve_entity`. A document that references the same
//! external entity many times only asks the sink once per identifier while
//! the entry stays in the LRU window.

use lru::LruCache;
use std::num::NonZeroUsize;

use super::entities::ExternalId;

/// Per-parse LRU cache keyed by external identifier
pub struct EntityCache {
    cache: Option<LruCache<ExternalId, String>>,
}

impl EntityCache {
    /// A capacity of zero disables caching
    pub fn new(capacity: usize) -> Self {
        EntityCache {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    pub fn get(&mut self, id: &ExternalId) -> Option<String> {
        self.cache.as_mut()?.get(id).cloned()
    }

    pub fn insert(&mut self, id: ExternalId, text: String) {
        if let Some(cache) = self.cache.as_mut() {
            cache.put(id, text);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_insert() {
        let mut cache = EntityCache::new(2);
        cache.insert(ExternalId::system("a.ent"), "A".into());
        assert_eq!(cache.get(&ExternalId::system("a.ent")), Some("A".into()));
        assert_eq!(cache.get(&ExternalId::system("b.ent")), None);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let mut cache = EntityCache::new(2);
        cache.insert(ExternalId::system("a"), "A".into());
        cache.insert(ExternalId::system("b"), "B".into());
        cache.get(&ExternalId::system("a"));
        cache.insert(ExternalId::system("c"), "C".into());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&ExternalId::system("b")).is_none());
        assert!(cache.get(&ExternalId::system("a")).is_some());
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = EntityCache::new(0);
        cache.insert(ExternalId::system("a"), "A".into());
        assert!(cache.is_empty());
        assert!(cache.get(&ExternalId::system("a")).is_none());
    }

    #[test]
    fn test_public_id_is_part_of_key() {
        let mut cache = EntityCache::new(4);
        let with_public = ExternalId {
            public_id: Some("-//X//EN".into()),
            system_id: Some("x.dtd".into()),
        };
        cache.insert(with_public.clone(), "X".into());
        assert!(cache.get(&ExternalId::system("x.dtd")).is_none());
        assert_eq!(cache.get(&with_public), Some("X".into()));
    }
}
