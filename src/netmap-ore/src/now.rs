//! Wall-clock abstraction.
//!
//! The record store and every timestamped write path go through [`now_secs`]
//! rather than calling `chrono`/`std::time` directly, so that a future test
//! harness can substitute a deterministic clock without touching call sites.

use std::sync::Arc;

/// A source of the current wall-clock time, in UTC seconds since the epoch.
pub type NowFn = Arc<dyn Fn() -> i64 + Send + Sync>;

/// The real system clock.
pub fn system_time() -> NowFn {
    Arc::new(now_secs)
}

/// The current wall-clock time, UTC seconds since the epoch.
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
