/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `chirpid` can produce.
///
/// Only the sequence-exhaustion wait is retried internally. Every variant here
/// is surfaced to the caller as soon as it is observed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The machine id is outside `0..=1023`.
    ///
    /// Raised once, when a generator is built. Startup should fail fast on it.
    #[error("machine id {machine_id} is outside 0..={max}", max = crate::MachineId::MAX)]
    Configuration {
        /// The rejected value, as supplied.
        machine_id: i64,
    },

    /// The wall clock reads earlier than the epoch ids are counted from.
    #[error("system clock is {behind_by_ms}ms behind the epoch")]
    Clock {
        /// How far before the epoch the clock currently is.
        behind_by_ms: u64,
    },

    /// The clock moved backward relative to the last issued id.
    ///
    /// The generator never reuses or fabricates a timestamp. Callers should
    /// treat this as a transient infrastructure fault and may retry after a
    /// delay.
    #[error("clock moved backwards: last id issued at {last}ms, clock now reads {now}ms")]
    ClockRegression {
        /// Timestamp of the last issued id, in ms since the epoch.
        last: u64,
        /// The regressed clock reading, in ms since the epoch.
        now: u64,
    },

    /// A caller-supplied value was rejected: a batch size outside `1..=1000`,
    /// or an id that is negative, sets the reserved bit, or is not an integer.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// The clock has moved past what the 41-bit timestamp field can hold.
    #[error("timestamp {millis}ms does not fit the 41-bit timestamp field")]
    TimestampOverflow {
        /// The clock reading that overflowed, in ms since the epoch.
        millis: u64,
    },

    /// A thread panicked while holding the generator lock.
    ///
    /// Not available with `parking-lot`, whose mutexes do not poison.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
