use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{CUSTOM_EPOCH, Error, Result, TimeSource};

/// The wall clock, read on every call.
///
/// Backward jumps (NTP step, manual change) are reported as-is, so a generator
/// built on this clock rejects them with [`Error::ClockRegression`] instead of
/// issuing out-of-order IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// A wall clock counting from [`CUSTOM_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(CUSTOM_EPOCH)
    }
}

impl SystemClock {
    /// A wall clock counting from `epoch`, given as a duration since
    /// 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> Result<u64> {
        millis_since(SystemTime::now(), self.epoch)
    }

    fn epoch(&self) -> Duration {
        self.epoch
    }
}

/// Milliseconds from `epoch` to `now`, or [`Error::Clock`] if `now` is
/// earlier.
pub(crate) fn millis_since(now: SystemTime, epoch: Duration) -> Result<u64> {
    match now.duration_since(UNIX_EPOCH + epoch) {
        Ok(elapsed) => Ok(elapsed.as_millis() as u64),
        Err(e) => Err(Error::Clock {
            behind_by_ms: e.duration().as_millis().max(1) as u64,
        }),
    }
}
