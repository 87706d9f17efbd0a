use core::time::Duration;
use std::sync::Arc;

use crate::Result;

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// A source of millisecond timestamps relative to an epoch.
///
/// Generators read the clock through this trait so tests can substitute a
/// mocked clock that stalls, steps, or moves backward.
///
/// # Example
///
/// ```
/// use chirpid::{Result, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> Result<u64> {
///         Ok(1234)
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis().unwrap(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since [`Self::epoch`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Clock`] if the clock reads earlier than the epoch.
    ///
    /// [`Error::Clock`]: crate::Error::Clock
    fn current_millis(&self) -> Result<u64>;

    /// The origin of [`Self::current_millis`], as a duration since the Unix
    /// epoch.
    fn epoch(&self) -> Duration {
        CUSTOM_EPOCH
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> Result<u64> {
        (**self).current_millis()
    }

    fn epoch(&self) -> Duration {
        (**self).epoch()
    }
}
