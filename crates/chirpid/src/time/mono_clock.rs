use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime},
};

use crate::{CUSTOM_EPOCH, Result, TimeSource, time::system::millis_since};

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A clock that never moves backward.
///
/// The wall-clock offset from the epoch is captured once at construction.
/// After that, a background thread publishes the elapsed monotonic time
/// (`Instant`) once per millisecond, so later wall-clock steps have no effect
/// and reads never make a syscall.
///
/// Generators on this clock never see a regression within one process. The
/// trade-off is drift from wall time over long uptimes, and no protection
/// across a restart with a rewound wall clock.
///
/// The ticker thread exits once every clone has been dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    epoch: Duration,
    epoch_offset: u64, // in milliseconds
}

impl MonotonicClock {
    /// A monotonic clock counting from [`CUSTOM_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clock`] if the wall clock is before the epoch.
    ///
    /// [`Error::Clock`]: crate::Error::Clock
    pub fn new() -> Result<Self> {
        Self::with_epoch(CUSTOM_EPOCH)
    }

    /// A monotonic clock counting from `epoch`, given as a duration since
    /// 1970-01-01 UTC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clock`] if the wall clock is before `epoch`.
    ///
    /// # Example
    ///
    /// ```
    /// use chirpid::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new().unwrap();
    /// let a = clock.current_millis().unwrap();
    /// std::thread::sleep(std::time::Duration::from_millis(5));
    /// let b = clock.current_millis().unwrap();
    /// assert!(b >= a);
    /// ```
    ///
    /// [`Error::Clock`]: crate::Error::Clock
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let start = Instant::now();
        let offset = millis_since(SystemTime::now(), epoch)?;

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to the tick after the actual time
                tick = now_ms + 1;
            }
        });

        // Freshly created above, so the cell is empty.
        let _ = inner._handle.set(handle);

        Ok(Self {
            inner,
            epoch,
            epoch_offset: offset,
        })
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> Result<u64> {
        Ok(self.epoch_offset + self.inner.current.load(Ordering::Relaxed))
    }

    fn epoch(&self) -> Duration {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, SystemClock};

    #[test]
    fn tracks_wall_clock_at_start() {
        let mono = MonotonicClock::new().unwrap();
        let wall = SystemClock::default();
        let m = mono.current_millis().unwrap();
        let w = wall.current_millis().unwrap();
        assert!(w.abs_diff(m) < 1000, "wall {w} vs monotonic {m}");
    }

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::new().unwrap();
        let mut last = clock.current_millis().unwrap();
        for _ in 0..1000 {
            let now = clock.current_millis().unwrap();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances() {
        let clock = MonotonicClock::new().unwrap();
        let a = clock.current_millis().unwrap();
        thread::sleep(Duration::from_millis(20));
        let b = clock.current_millis().unwrap();
        assert!(b > a);
    }

    #[test]
    fn rejects_future_epoch() {
        let far_future = CUSTOM_EPOCH + Duration::from_secs(500 * 365 * 24 * 3600);
        assert!(matches!(
            MonotonicClock::with_epoch(far_future),
            Err(Error::Clock { .. })
        ));
    }
}
