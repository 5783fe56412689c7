//! Global caches for type-level mapping metadata
//!
//! Property lists, source scopes and plans are derived from static type descriptions,
//! so they are computed once per key and shared by every mapper and thread.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::bean::TypeKey;
use crate::property_config::PropertyConfig;
use crate::property_config::SourceScope;
use crate::resolver::PropertyDescriptor;

/// Global cache shared across all mapping calls
static MAPPING_CACHE: Lazy<MappingCache> = Lazy::new(MappingCache::new);

/// Key of a cached plan: source scope id and target type
pub type PlanKey = (u64, TypeKey);

/// Thread-safe caches for derived mapping metadata
pub struct MappingCache {
    /// Resolved properties per bean type
    properties: DashMap<TypeKey, Arc<[PropertyDescriptor]>>,
    /// Source scopes per bean type
    scopes:     DashMap<TypeKey, Arc<SourceScope>>,
    /// Property configurations per (source scope, target type)
    plans:      DashMap<PlanKey, Arc<[PropertyConfig]>>,
}

impl MappingCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            properties: DashMap::new(),
            scopes:     DashMap::new(),
            plans:      DashMap::new(),
        }
    }

    /// Cached properties for `key`, computing them on first use
    pub fn properties(
        &self,
        key: TypeKey,
        compute: impl FnOnce() -> Arc<[PropertyDescriptor]>,
    ) -> Arc<[PropertyDescriptor]> {
        get_or_compute(&self.properties, key, compute)
    }

    /// Cached source scope for `key`, computing it on first use
    pub fn scope(&self, key: TypeKey, compute: impl FnOnce() -> Arc<SourceScope>) -> Arc<SourceScope> {
        get_or_compute(&self.scopes, key, compute)
    }

    /// Cached plan for `key`, computing it on first use
    pub fn plan(
        &self,
        key: PlanKey,
        compute: impl FnOnce() -> Arc<[PropertyConfig]>,
    ) -> Arc<[PropertyConfig]> {
        get_or_compute(&self.plans, key, compute)
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.properties.clear();
        self.scopes.clear();
        self.plans.clear();
    }

    /// Number of cached entries across all caches
    pub fn entry_count(&self) -> usize {
        self.properties.len() + self.scopes.len() + self.plans.len()
    }
}

impl Default for MappingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the cached value, or computes one without holding any shard lock and keeps
/// whichever value was inserted first.
fn get_or_compute<K, V>(map: &DashMap<K, V>, key: K, compute: impl FnOnce() -> V) -> V
where
    K: Eq + Hash,
    V: Clone,
{
    let cached = map.get(&key).map(|entry| entry.value().clone());
    if let Some(value) = cached {
        return value;
    }

    let computed = compute();
    map.entry(key).or_insert(computed).value().clone()
}

/// Get the global mapping cache instance
pub fn global_cache() -> &'static MappingCache {
    &MAPPING_CACHE
}

/// Drop every cached property list, scope and plan
///
/// Mapping keeps working afterwards; entries are recomputed on demand.
pub fn clear_caches() {
    let cache = global_cache();
    tracing::debug!(entries = cache.entry_count(), "Clearing mapping caches");
    cache.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let map: DashMap<u8, Arc<str>> = DashMap::new();

        let first = get_or_compute(&map, 1, || Arc::from("first"));
        let second = get_or_compute(&map, 1, || Arc::from("second"));

        assert_eq!(&*first, "first");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn nested_computation_does_not_deadlock() {
        let map: DashMap<u8, u32> = DashMap::new();

        let outer = get_or_compute(&map, 1, || get_or_compute(&map, 2, || 2) + 1);

        assert_eq!(outer, 3);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn local_cache_clears() {
        let cache = MappingCache::new();
        let key = TypeKey::of::<String>();

        let properties = cache.properties(key, || Arc::from(Vec::new()));
        assert!(properties.is_empty());
        assert_eq!(cache.entry_count(), 1);

        cache.clear();
        assert_eq!(cache.entry_count(), 0);
    }
}
