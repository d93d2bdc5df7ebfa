/// Per-key loading flags for outstanding service requests.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counts outstanding requests per key. A key reads as loading while at
/// least one request for it is unresolved.
#[derive(Debug)]
pub struct InFlight<K> {
    counts: Mutex<FxHashMap<K, usize>>,
}

impl<K> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            counts: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn counts(&self) -> MutexGuard<'_, FxHashMap<K, usize>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a request for `key` as started. Overlapping requests for the
    /// same key are allowed; the flag clears when the last guard drops.
    pub fn begin(&self, key: K) -> InFlightGuard<'_, K> {
        *self.counts().entry(key.clone()).or_insert(0) += 1;
        InFlightGuard { owner: self, key }
    }

    /// Starts a request only if none is outstanding for `key`.
    pub fn try_begin(&self, key: K) -> Option<InFlightGuard<'_, K>> {
        let mut counts = self.counts();
        if counts.get(&key).is_some_and(|n| *n > 0) {
            return None;
        }
        counts.insert(key.clone(), 1);
        Some(InFlightGuard { owner: self, key })
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.count(key) > 0
    }

    pub fn count(&self, key: &K) -> usize {
        self.counts().get(key).copied().unwrap_or(0)
    }

    fn finish(&self, key: &K) {
        let mut counts = self.counts();
        if let Some(n) = counts.get_mut(key) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                counts.remove(key);
            }
        }
    }
}

/// Clears one request's share of a loading flag when dropped, on success
/// and failure paths alike.
#[derive(Debug)]
pub struct InFlightGuard<'a, K: Eq + Hash + Clone> {
    owner: &'a InFlight<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        self.owner.finish(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_requests_keep_flag_set() {
        let flags: InFlight<&str> = InFlight::new();
        let first = flags.begin("a");
        let second = flags.begin("a");
        assert_eq!(flags.count(&"a"), 2);

        drop(first);
        assert!(flags.is_active(&"a"));
        drop(second);
        assert!(!flags.is_active(&"a"));
    }

    #[test]
    fn keys_are_independent() {
        let flags: InFlight<u32> = InFlight::new();
        let _one = flags.begin(1);
        assert!(flags.is_active(&1));
        assert!(!flags.is_active(&2));
    }

    #[test]
    fn try_begin_is_exclusive() {
        let flags: InFlight<()> = InFlight::new();
        let guard = flags.try_begin(()).unwrap();
        assert!(flags.try_begin(()).is_none());
        drop(guard);
        assert!(flags.try_begin(()).is_some());
    }
}
