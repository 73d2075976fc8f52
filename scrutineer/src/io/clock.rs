//! Timestamps that are guaranteed to move forward.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::core::stamp::Stamp;

/// Source of strictly advancing stamps.
pub trait StampSource {
    /// Return a stamp strictly greater than `floor`.
    fn advance_past(&self, floor: Stamp) -> Stamp;
}

/// Wall-clock stamps at whole-second granularity.
///
/// Whole seconds survive a write/read round trip on any filesystem, at the
/// cost of a bounded wait: when the current second does not yet exceed the
/// floor, [`advance_past`](StampSource::advance_past) polls until it does,
/// at most about one second per call. Floors in the future are waited out
/// too, which is what a skewed filesystem deserves.
#[derive(Debug, Clone)]
pub struct WallClock {
    poll_interval: Duration,
}

impl Default for WallClock {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_micros(500),
        }
    }
}

impl StampSource for WallClock {
    fn advance_past(&self, floor: Stamp) -> Stamp {
        let mut candidate = Stamp::from_unix_secs(now_unix_secs());
        if candidate <= floor {
            debug!(floor = %floor, "waiting for the clock to pass the floor");
            while candidate <= floor {
                thread::sleep(self.poll_interval);
                candidate = Stamp::from_unix_secs(now_unix_secs());
            }
        }
        candidate
    }
}

fn now_unix_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
