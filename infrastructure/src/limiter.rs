//! Fixed-window rate limiter
//!
//! Counts attempts per key within a fixed window. The per-key counter
//! uses atomic increment-and-compare, so two concurrent attempts at the
//! last free slot cannot both pass.

use accord_application::{Clock, RateLimiter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

struct WindowSlot {
    epoch: AtomicI64,
    count: AtomicU32,
}

/// Process-local fixed-window limiter keyed by caller-supplied strings
/// (typically requesting network origins).
pub struct FixedWindowLimiter {
    limit: u32,
    window_secs: i64,
    clock: Arc<dyn Clock>,
    slots: RwLock<HashMap<String, Arc<WindowSlot>>>,
    // Serializes slot creation only; counting never takes this lock.
    insert: Mutex<()>,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, window: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window_secs: window.as_secs().max(1) as i64,
            clock,
            slots: RwLock::new(HashMap::new()),
            insert: Mutex::new(()),
        }
    }

    /// Limiter matching an invite policy's attempts-per-hour setting.
    pub fn per_hour(limit: u32, clock: Arc<dyn Clock>) -> Self {
        Self::new(limit, std::time::Duration::from_secs(3600), clock)
    }

    fn slot(&self, key: &str) -> Arc<WindowSlot> {
        if let Some(slot) = self.slots.read().expect("limiter poisoned").get(key) {
            return Arc::clone(slot);
        }
        let _insert = self.insert.lock().expect("limiter poisoned");
        let mut slots = self.slots.write().expect("limiter poisoned");
        Arc::clone(slots.entry(key.to_string()).or_insert_with(|| {
            Arc::new(WindowSlot {
                epoch: AtomicI64::new(-1),
                count: AtomicU32::new(0),
            })
        }))
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn allow(&self, key: &str) -> bool {
        let epoch = self.clock.now().timestamp() / self.window_secs;
        let slot = self.slot(key);

        let seen = slot.epoch.load(Ordering::Acquire);
        if seen != epoch
            && slot
                .epoch
                .compare_exchange(seen, epoch, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            // First attempt of a fresh window resets the counter
            slot.count.store(0, Ordering::Release);
        }
        slot.count.fetch_add(1, Ordering::AcqRel) < self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_application::ManualClock;
    use chrono::Utc;
    use std::time::Duration;

    fn limiter(limit: u32) -> (FixedWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (
            FixedWindowLimiter::new(limit, Duration::from_secs(3600), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_limit_enforced_within_window() {
        let (limiter, _) = limiter(3);
        assert!(limiter.allow("origin"));
        assert!(limiter.allow("origin"));
        assert!(limiter.allow("origin"));
        assert!(!limiter.allow("origin"));
        assert!(!limiter.allow("origin"));
    }

    #[test]
    fn test_keys_are_independent() {
        let (limiter, _) = limiter(1);
        assert!(limiter.allow("a"));
        assert!(!limiter.allow("a"));
        assert!(limiter.allow("b"));
    }

    #[test]
    fn test_fresh_window_resets_count() {
        let (limiter, clock) = limiter(1);
        assert!(limiter.allow("origin"));
        assert!(!limiter.allow("origin"));

        clock.advance(chrono::Duration::hours(2));
        assert!(limiter.allow("origin"));
    }

    #[test]
    fn test_concurrent_attempts_cannot_exceed_limit() {
        let limit = 10;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let limiter = Arc::new(FixedWindowLimiter::new(
            limit,
            Duration::from_secs(3600),
            clock,
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(std::thread::spawn(move || {
                (0..10).filter(|_| limiter.allow("origin")).count()
            }));
        }
        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, limit as usize);
    }
}
