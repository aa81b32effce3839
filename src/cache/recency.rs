//! Recency tracking for the resident set.
//!
//! A tracker answers one question for the cache: given which keys are
//! resident, which one was used least recently. Two strategies are provided:
//!
//! - [`AccessLog`]: every access is appended to a history that is never
//!   compacted. Rankings are re-derived by scanning the history backwards and
//!   keeping the first occurrence of each key, so the latest access of a key
//!   always decides its position no matter how often it was touched before.
//!   Cost is linear in the number of recorded accesses.
//! - [`LinkedRecency`]: a linked ordering over resident keys only
//!   (`lru::LruCache<K, ()>`). Promotion and victim lookup are O(1) and
//!   history for dropped keys is discarded immediately.
//!
//! For any sequence of operations issued by the cache both trackers produce
//! the same resident ranking.

use crate::cache::config::RecencyMode;
use lru::LruCache;
use std::collections::HashSet;
use std::hash::Hash;

/// Ordering of accessed keys, most recent first.
pub trait RecencyTracker<K> {
    /// Records one access to `key`.
    fn record_access(&mut self, key: &K);

    /// Called when `key` leaves the resident set.
    fn forget(&mut self, key: &K);

    /// Every distinct key the tracker still knows, most recently used first.
    /// Each call starts a fresh traversal.
    fn keys_most_recent_first(&self) -> Box<dyn Iterator<Item = &K> + '_>;

    /// Number of entries held internally (history length or tracked keys).
    fn tracked_len(&self) -> usize;

    /// Resident keys, most recently used first, stopping after `limit` keys.
    fn ranking(&self, is_resident: &dyn Fn(&K) -> bool, limit: usize) -> Vec<K>
    where
        K: Clone,
    {
        self.keys_most_recent_first()
            .filter(|k| is_resident(k))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Last element of [`ranking`](Self::ranking); `None` when nothing is resident.
    fn least_recently_used(&self, is_resident: &dyn Fn(&K) -> bool, limit: usize) -> Option<K>
    where
        K: Clone,
    {
        self.ranking(is_resident, limit).pop()
    }
}

/// Builds the tracker selected by `mode`.
pub fn tracker_for<K>(mode: RecencyMode) -> Box<dyn RecencyTracker<K> + Send>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    match mode {
        RecencyMode::AccessLog => Box::new(AccessLog::new()),
        RecencyMode::Linked => Box::new(LinkedRecency::new()),
    }
}

// ---------------------------------------------------------------------------
// AccessLog
// ---------------------------------------------------------------------------

/// Append-only access history.
#[derive(Debug, Clone)]
pub struct AccessLog<K> {
    history: Vec<K>,
}

impl<K> AccessLog<K> {
    #[must_use]
    pub fn new() -> Self {
        Self { history: Vec::new() }
    }

    /// Raw history, oldest access first.
    pub fn history(&self) -> &[K] {
        &self.history
    }
}

impl<K> Default for AccessLog<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> RecencyTracker<K> for AccessLog<K> {
    fn record_access(&mut self, key: &K) {
        self.history.push(key.clone());
    }

    // History is never rewritten; residency filtering happens at scan time.
    fn forget(&mut self, _key: &K) {}

    fn keys_most_recent_first(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        let mut seen: HashSet<&K> = HashSet::new();
        Box::new(self.history.iter().rev().filter(move |k| seen.insert(*k)))
    }

    fn tracked_len(&self) -> usize {
        self.history.len()
    }
}

// ---------------------------------------------------------------------------
// LinkedRecency
// ---------------------------------------------------------------------------

/// Linked MRU→LRU ordering over resident keys.
pub struct LinkedRecency<K: Hash + Eq> {
    order: LruCache<K, ()>,
}

impl<K: Hash + Eq> LinkedRecency<K> {
    #[must_use]
    pub fn new() -> Self {
        Self { order: LruCache::unbounded() }
    }
}

impl<K: Hash + Eq> Default for LinkedRecency<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> RecencyTracker<K> for LinkedRecency<K> {
    fn record_access(&mut self, key: &K) {
        // `get` moves an existing key to the MRU position
        if self.order.get(key).is_none() {
            self.order.put(key.clone(), ());
        }
    }

    fn forget(&mut self, key: &K) {
        self.order.pop(key);
    }

    fn keys_most_recent_first(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        Box::new(self.order.iter().map(|(k, _)| k))
    }

    fn tracked_len(&self) -> usize {
        self.order.len()
    }

    fn least_recently_used(&self, is_resident: &dyn Fn(&K) -> bool, limit: usize) -> Option<K> {
        if limit >= self.order.len()
            && let Some((k, _)) = self.order.peek_lru()
            && is_resident(k)
        {
            return Some(k.clone());
        }
        self.ranking(is_resident, limit).pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(_: &char) -> bool {
        true
    }

    fn feed(t: &mut dyn RecencyTracker<char>, keys: &str) {
        for c in keys.chars() {
            t.record_access(&c);
        }
    }

    #[test]
    fn latest_occurrence_decides_position() {
        let mut log = AccessLog::<char>::new();
        feed(&mut log, "aaaabcb");
        let order: Vec<char> = log.keys_most_recent_first().copied().collect();
        assert_eq!(order, vec!['b', 'c', 'a']);
        assert_eq!(log.tracked_len(), 7);
    }

    #[test]
    fn ranking_stops_at_limit() {
        let mut log = AccessLog::<char>::new();
        feed(&mut log, "abcd");
        assert_eq!(log.ranking(&all, 2), vec!['d', 'c']);
        assert_eq!(log.least_recently_used(&all, 2), Some('c'));
        assert_eq!(log.least_recently_used(&all, 10), Some('a'));
    }

    #[test]
    fn ranking_skips_non_resident_keys() {
        let mut log = AccessLog::<char>::new();
        feed(&mut log, "abcb");
        let resident = |k: &char| *k != 'c';
        assert_eq!(log.ranking(&resident, 3), vec!['b', 'a']);
        assert_eq!(log.least_recently_used(&resident, 3), Some('a'));
    }

    #[test]
    fn empty_tracker_has_no_victim() {
        let log: AccessLog<char> = AccessLog::new();
        assert_eq!(log.least_recently_used(&all, 4), None);
        let linked: LinkedRecency<char> = LinkedRecency::new();
        assert_eq!(linked.least_recently_used(&all, 4), None);
    }

    #[test]
    fn traversal_is_restartable() {
        let mut log = AccessLog::<char>::new();
        feed(&mut log, "xyz");
        let first: Vec<char> = log.keys_most_recent_first().copied().collect();
        let second: Vec<char> = log.keys_most_recent_first().copied().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn linked_promotes_and_forgets() {
        let mut linked = LinkedRecency::<char>::new();
        feed(&mut linked, "abca");
        let order: Vec<char> = linked.keys_most_recent_first().copied().collect();
        assert_eq!(order, vec!['a', 'c', 'b']);
        assert_eq!(linked.least_recently_used(&all, 3), Some('b'));

        linked.forget(&'b');
        assert_eq!(linked.tracked_len(), 2);
        assert_eq!(linked.least_recently_used(&all, 3), Some('c'));
    }

    #[test]
    fn both_trackers_agree_on_ranking() {
        let seq = "abacabdeedcbaffa";
        let mut log = AccessLog::<char>::new();
        let mut linked = LinkedRecency::<char>::new();
        feed(&mut log, seq);
        feed(&mut linked, seq);
        for limit in 1..=6 {
            assert_eq!(log.ranking(&all, limit), linked.ranking(&all, limit));
        }
    }

    #[test]
    fn tracker_for_honours_mode() {
        let mut t = tracker_for::<u8>(RecencyMode::Linked);
        t.record_access(&1);
        t.record_access(&1);
        assert_eq!(t.tracked_len(), 1);

        let mut t = tracker_for::<u8>(RecencyMode::AccessLog);
        t.record_access(&1);
        t.record_access(&1);
        assert_eq!(t.tracked_len(), 2);
    }
}
