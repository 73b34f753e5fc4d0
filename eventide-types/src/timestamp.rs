//! Hybrid timestamps for stamping events.
//!
//! A single writer stamps every event of a log from one clock. Wall time
//! keeps stamps close to real time; the logical counter keeps them strictly
//! increasing when several events land in the same millisecond or the
//! system clock steps backwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds plus a logical counter.
///
/// Field order matters: the derived `Ord` compares `wall_time` first, then
/// `logical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HybridTimestamp {
    wall_time: u64,
    logical: u32,
}

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl HybridTimestamp {
    /// The current wall time with a zero counter.
    #[must_use]
    pub fn now() -> Self {
        Self::new(wall_clock_millis(), 0)
    }

    #[must_use]
    pub const fn new(wall_time: u64, logical: u32) -> Self {
        Self { wall_time, logical }
    }

    /// The greatest timestamp within `wall_time`.
    ///
    /// Selecting a millisecond includes every event stamped in it, whatever
    /// its counter.
    #[must_use]
    pub const fn end_of_millisecond(wall_time: u64) -> Self {
        Self::new(wall_time, u32::MAX)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn wall_time(&self) -> u64 {
        self.wall_time
    }

    #[must_use]
    pub const fn logical(&self) -> u32 {
        self.logical
    }

    /// The next stamp after `self`, strictly greater.
    ///
    /// Follows the wall clock when it has moved past `self`; otherwise bumps
    /// the counter, carrying into the next millisecond if it is exhausted.
    #[must_use]
    pub fn tick(&self) -> Self {
        let now = wall_clock_millis();
        if now > self.wall_time {
            return Self::new(now, 0);
        }
        match self.logical.checked_add(1) {
            Some(logical) => Self::new(self.wall_time, logical),
            None => Self::new(self.wall_time.saturating_add(1), 0),
        }
    }
}

impl fmt::Display for HybridTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.wall_time, self.logical)
    }
}
