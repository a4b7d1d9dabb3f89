/// Render bundles kept per composite.
pub(super) const BUNDLE_CACHE_LIMIT: usize = 4;

/// What a recorded bundle draws.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct BundleKey {
    pub first_index: u32,
    pub index_count: u32,
    pub texture: Option<u32>,
}

/// Small least-recently-used cache of recorded bundles.
///
/// Entries are kept oldest first; a hit moves the entry to the back and an
/// insert into a full cache evicts the front.
#[derive(Debug)]
pub(super) struct BundleCache<B> {
    entries: Vec<(BundleKey, B)>,
    limit: usize,
}

impl<B> BundleCache<B> {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::with_capacity(limit),
            limit: limit.max(1),
        }
    }

    /// Marks `key` as most recently used. Returns `false` on a miss.
    pub fn touch(&mut self, key: &BundleKey) -> bool {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                let entry = self.entries.remove(pos);
                self.entries.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &BundleKey) -> Option<&B> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, b)| b)
    }

    pub fn insert(&mut self, key: BundleKey, bundle: B) {
        self.entries.retain(|(k, _)| *k != key);
        if self.entries.len() >= self.limit {
            self.entries.remove(0);
        }
        self.entries.push((key, bundle));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(first_index: u32) -> BundleKey {
        BundleKey {
            first_index,
            index_count: 6,
            texture: Some(1),
        }
    }

    #[test]
    fn sliding_ranges_stay_within_limit() {
        let mut cache = BundleCache::new(BUNDLE_CACHE_LIMIT);
        for first in 0..100 {
            if !cache.touch(&key(first)) {
                cache.insert(key(first), first);
            }
            assert!(cache.len() <= BUNDLE_CACHE_LIMIT);
        }
        assert_eq!(cache.len(), BUNDLE_CACHE_LIMIT);
        assert_eq!(cache.get(&key(99)), Some(&99));
        assert_eq!(cache.get(&key(0)), None);
    }

    #[test]
    fn touched_entry_survives_eviction() {
        let mut cache = BundleCache::new(2);
        cache.insert(key(0), "a");
        cache.insert(key(6), "b");
        assert!(cache.touch(&key(0)));
        cache.insert(key(12), "c");

        assert_eq!(cache.get(&key(0)), Some(&"a"));
        assert_eq!(cache.get(&key(6)), None);
        assert_eq!(cache.get(&key(12)), Some(&"c"));
    }

    #[test]
    fn reinserting_a_key_replaces_it() {
        let mut cache = BundleCache::new(2);
        cache.insert(key(0), 1);
        cache.insert(key(0), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(0)), Some(&2));
        assert!(!cache.touch(&key(6)));
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
