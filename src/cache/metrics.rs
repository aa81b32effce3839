use std::sync::atomic::{AtomicU64, Ordering};

/// Log target for statistics resets and summaries; `logger` routes it to `metrics.log`.
pub const METRICS_TARGET: &str = "throughcache::metrics";

/// Counters describing cache behaviour.
///
/// `accesses` counts completed `get`/`put` calls, `faults` counts those that
/// had to install a key into the resident set. The rest are diagnostic.
#[derive(Default, Debug)]
pub struct CacheMetrics {
    pub accesses: AtomicU64,
    pub faults: AtomicU64,
    pub hits: AtomicU64,
    pub absent: AtomicU64,
    pub evictions: AtomicU64,
    pub removes: AtomicU64,
}

impl CacheMetrics {
    /// Reads every counter. `accesses` is bumped before the outcome counters
    /// and is loaded last here, so `faults <= accesses` holds in the result.
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        let faults = self.faults.load(Ordering::Acquire);
        let hits = self.hits.load(Ordering::Acquire);
        let absent = self.absent.load(Ordering::Acquire);
        let evictions = self.evictions.load(Ordering::Acquire);
        let removes = self.removes.load(Ordering::Acquire);
        let accesses = self.accesses.load(Ordering::Acquire);
        CacheMetricsSnapshot { accesses, faults, hits, absent, evictions, removes }
    }

    /// Zeroes every counter, outcome counters before `accesses`.
    /// Not atomic as a whole; callers sharing a cache reset under its lock.
    pub fn reset(&self) {
        for c in [
            &self.faults,
            &self.hits,
            &self.absent,
            &self.evictions,
            &self.removes,
            &self.accesses,
        ] {
            c.store(0, Ordering::Release);
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::AcqRel);
    }

    pub fn fault_rate_percent(&self) -> f64 {
        self.snapshot().fault_rate_percent()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub accesses: u64,
    pub faults: u64,
    pub hits: u64,
    pub absent: u64,
    pub evictions: u64,
    pub removes: u64,
}

impl CacheMetricsSnapshot {
    /// `100 * faults / accesses`, or `0.0` before any access.
    pub fn fault_rate_percent(&self) -> f64 {
        percent(self.faults, self.accesses)
    }

    pub fn hit_rate_percent(&self) -> f64 {
        percent(self.hits, self.accesses)
    }
}

#[inline]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_without_accesses() {
        let m = CacheMetrics::default();
        assert_eq!(m.fault_rate_percent(), 0.0);
        assert_eq!(m.snapshot().hit_rate_percent(), 0.0);
    }

    #[test]
    fn reset_clears_all_counters() {
        let m = CacheMetrics::default();
        CacheMetrics::bump(&m.accesses);
        CacheMetrics::bump(&m.accesses);
        CacheMetrics::bump(&m.faults);
        CacheMetrics::bump(&m.evictions);
        assert_eq!(m.fault_rate_percent(), 50.0);
        m.reset();
        assert_eq!(m.snapshot(), CacheMetricsSnapshot::default());
    }

    #[test]
    fn snapshot_keeps_faults_within_accesses_during_updates() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicBool;

        let m = Arc::new(CacheMetrics::default());
        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let m = Arc::clone(&m);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    CacheMetrics::bump(&m.accesses);
                    CacheMetrics::bump(&m.faults);
                }
            })
        };
        for _ in 0..50_000 {
            let s = m.snapshot();
            assert!(s.faults <= s.accesses, "{s:?}");
        }
        done.store(true, Ordering::Relaxed);
        writer.join().unwrap();
    }
}
