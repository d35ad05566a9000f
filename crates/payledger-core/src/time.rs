//! Time helpers shared by the scheduler and the storage layer.
//!
//! All instants are epoch milliseconds (`i64`), matching the wallet snapshot
//! the ledger hands over.

use chrono::{DateTime, Utc};

pub const SECOND_MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock pinned to one instant. Handy for replaying a decision.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// `n` days in milliseconds. Negative counts are allowed; out-of-range
/// counts saturate.
pub fn days(n: i64) -> i64 {
    n.saturating_mul(DAY_MS)
}

/// `n` days in milliseconds, or `None` when that does not fit an `i64`.
pub fn checked_days(n: i64) -> Option<i64> {
    n.checked_mul(DAY_MS)
}

/// RFC 3339 rendering for logs; falls back to the raw number when out of range.
pub fn display_ms(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| epoch_ms.to_string())
}
