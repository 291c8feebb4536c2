//! Rate limiter port
//!
//! Injected abstraction over a shared counter store, keyed by requesting
//! network origin. Call sites never see the backing implementation, so a
//! process-local limiter can be swapped for a distributed one without
//! touching them.

/// Decides whether one more attempt from `key` is allowed right now.
///
/// Implementations must be safe under concurrent access and use atomic
/// increment-and-compare, not read-then-write.
pub trait RateLimiter: Send + Sync {
    fn allow(&self, key: &str) -> bool;
}

/// Null object: allows everything. Used in tests and local demos.
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn allow(&self, _key: &str) -> bool {
        true
    }
}
