//! Bounded audio resource cache with least-recently-used eviction.
//!
//! One cache exists per sound category (music holds 1 entry, effects 5 by
//! default). Entries are keyed by the caller's key (`"Enter"`) and loaded
//! from the namespaced resource name (`"Se/Enter"`).
//!
//! Recency is tracked with a logical clock that ticks on every insertion and
//! every [`AudioResourceCache::touch`], so timestamps are strictly increasing
//! and eviction order is deterministic. Loading an entry that is already
//! cached does not refresh it; only playback does.

use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;

use crate::error::{ConfigError, LoadError};
use crate::resources::cliploader::{ClipHandle, ResourceLoader};

/// A cached clip and when it was last used.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioResourceEntry {
    pub key: String,
    /// Namespaced name passed to the loader, e.g. `"Bgm/Title"`.
    pub resource_name: String,
    pub clip: ClipHandle,
    pub last_used: u64,
}

/// Key to entry map that never grows past its capacity.
#[derive(Debug)]
pub struct AudioResourceCache {
    namespace: String,
    capacity: NonZeroUsize,
    entries: FxHashMap<String, AudioResourceEntry>,
    clock: u64,
}

impl AudioResourceCache {
    /// Create a cache loading from `"<namespace>/<key>"`.
    ///
    /// A capacity of zero is a configuration error.
    pub fn new(namespace: impl Into<String>, capacity: usize) -> Result<Self, ConfigError> {
        let namespace = namespace.into();
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| ConfigError::ZeroCapacity {
            pool: namespace.clone(),
        })?;
        Ok(Self::bounded(namespace, capacity))
    }

    /// Create a cache whose capacity is non-zero by construction.
    pub fn bounded(namespace: impl Into<String>, capacity: NonZeroUsize) -> Self {
        AudioResourceCache {
            namespace: namespace.into(),
            capacity,
            entries: FxHashMap::default(),
            clock: 0,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&AudioResourceEntry> {
        self.entries.get(key)
    }

    /// Cached keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resource name a key is loaded from.
    pub fn resource_name(&self, key: &str) -> String {
        format!("{}/{}", self.namespace, key)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Make sure `key` is cached, loading it through `loader` if needed.
    ///
    /// A cached key is left untouched. A new entry is stamped with the
    /// current time; if that puts the cache over capacity the entry with the
    /// oldest `last_used` (other than the new one) is evicted and returned.
    /// Nothing is inserted when the load fails.
    pub fn ensure_loaded(
        &mut self,
        key: &str,
        loader: &mut dyn ResourceLoader,
    ) -> Result<Option<AudioResourceEntry>, LoadError> {
        if self.entries.contains_key(key) {
            return Ok(None);
        }

        let resource_name = self.resource_name(key);
        let clip = loader.load(&resource_name)?;
        let last_used = self.tick();
        log::debug!(
            "[audio] cached '{}' from '{}' ({}/{})",
            key,
            resource_name,
            self.entries.len() + 1,
            self.capacity
        );
        self.entries.insert(
            key.to_string(),
            AudioResourceEntry {
                key: key.to_string(),
                resource_name,
                clip,
                last_used,
            },
        );

        if self.entries.len() <= self.capacity.get() {
            return Ok(None);
        }
        Ok(self.evict_oldest(key))
    }

    fn evict_oldest(&mut self, keep: &str) -> Option<AudioResourceEntry> {
        let oldest = self
            .entries
            .values()
            .filter(|entry| entry.key != keep)
            .min_by(|a, b| a.last_used.cmp(&b.last_used).then_with(|| a.key.cmp(&b.key)))
            .map(|entry| entry.key.clone())?;
        let evicted = self.entries.remove(&oldest);
        if let Some(entry) = &evicted {
            log::debug!(
                "[audio] evicted '{}' from {} cache (last used {})",
                entry.key,
                self.namespace,
                entry.last_used
            );
        }
        evicted
    }

    /// Mark `key` as used now. Returns the new timestamp, or `None` if the
    /// key is not cached.
    pub fn touch(&mut self, key: &str) -> Option<u64> {
        if !self.entries.contains_key(key) {
            return None;
        }
        let now = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_used = now;
        Some(now)
    }

    /// Drop every entry. Clip lifetime is left to whoever still holds a handle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::cliploader::AudioClip;
    use std::sync::Arc;

    fn loader() -> impl FnMut(&str) -> Result<ClipHandle, LoadError> {
        |path: &str| Ok(Arc::new(AudioClip::new(path, 1.0)))
    }

    fn sorted_keys(cache: &AudioResourceCache) -> Vec<String> {
        let mut keys: Vec<String> = cache.keys().map(str::to_string).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(
            AudioResourceCache::new("Se", 0).unwrap_err(),
            ConfigError::ZeroCapacity {
                pool: "Se".to_string()
            }
        );
    }

    #[test]
    fn test_loads_namespaced_resource() {
        let mut cache = AudioResourceCache::new("Se", 5).unwrap();
        let mut requested = Vec::new();
        let mut load = |path: &str| -> Result<ClipHandle, LoadError> {
            requested.push(path.to_string());
            Ok(Arc::new(AudioClip::new(path, 1.0)))
        };

        cache.ensure_loaded("Enter", &mut load).unwrap();
        cache.ensure_loaded("Enter", &mut load).unwrap();

        assert_eq!(requested, vec!["Se/Enter".to_string()]);
        let entry = cache.get("Enter").unwrap();
        assert_eq!(entry.resource_name, "Se/Enter");
        assert_eq!(entry.key, "Enter");
    }

    #[test]
    fn test_sixth_load_evicts_first() {
        let mut cache = AudioResourceCache::new("Se", 5).unwrap();
        let mut load = loader();
        let mut evicted = Vec::new();
        for key in ["A", "B", "C", "D", "E", "F"] {
            if let Some(entry) = cache.ensure_loaded(key, &mut load).unwrap() {
                evicted.push(entry.key);
            }
        }
        assert_eq!(evicted, vec!["A".to_string()]);
        assert_eq!(sorted_keys(&cache), vec!["B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_touch_protects_from_eviction() {
        let mut cache = AudioResourceCache::new("Se", 2).unwrap();
        let mut load = loader();
        cache.ensure_loaded("A", &mut load).unwrap();
        cache.ensure_loaded("B", &mut load).unwrap();
        cache.touch("A");
        let evicted = cache.ensure_loaded("C", &mut load).unwrap();

        assert_eq!(evicted.map(|e| e.key), Some("B".to_string()));
        assert_eq!(sorted_keys(&cache), vec!["A", "C"]);
    }

    #[test]
    fn test_reload_does_not_refresh_recency() {
        let mut cache = AudioResourceCache::new("Se", 2).unwrap();
        let mut load = loader();
        cache.ensure_loaded("A", &mut load).unwrap();
        cache.ensure_loaded("B", &mut load).unwrap();
        cache.ensure_loaded("A", &mut load).unwrap();
        let evicted = cache.ensure_loaded("C", &mut load).unwrap();
        assert_eq!(evicted.map(|e| e.key), Some("A".to_string()));
    }

    #[test]
    fn test_touch_strictly_increases() {
        let mut cache = AudioResourceCache::new("Bgm", 1).unwrap();
        let mut load = loader();
        cache.ensure_loaded("Title", &mut load).unwrap();
        let first = cache.get("Title").unwrap().last_used;
        let t1 = cache.touch("Title").unwrap();
        let t2 = cache.touch("Title").unwrap();
        assert!(first < t1 && t1 < t2);
        assert_eq!(cache.touch("Missing"), None);
    }

    #[test]
    fn test_capacity_one_keeps_newest() {
        let mut cache = AudioResourceCache::new("Bgm", 1).unwrap();
        let mut load = loader();
        cache.ensure_loaded("Title", &mut load).unwrap();
        cache.touch("Title");
        let evicted = cache.ensure_loaded("Game", &mut load).unwrap();
        assert_eq!(evicted.map(|e| e.key), Some("Title".to_string()));
        assert_eq!(sorted_keys(&cache), vec!["Game"]);
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut cache = AudioResourceCache::new("Se", 3).unwrap();
        let mut load = loader();
        let keys = ["a", "b", "a", "c", "d", "b", "e", "a", "f", "c", "g"];
        for (i, key) in keys.iter().enumerate() {
            cache.ensure_loaded(key, &mut load).unwrap();
            if i % 2 == 0 {
                cache.touch(key);
            }
            assert!(cache.len() <= cache.capacity());
        }
    }

    #[test]
    fn test_failed_load_inserts_nothing() {
        let mut cache = AudioResourceCache::new("Se", 2).unwrap();
        let mut failing = |path: &str| -> Result<ClipHandle, LoadError> {
            Err(LoadError::NotFound {
                path: path.to_string(),
            })
        };
        assert!(cache.ensure_loaded("Enter", &mut failing).is_err());
        assert!(cache.is_empty());
    }
}
