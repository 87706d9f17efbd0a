use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdGenStatus, MachineId, Result, SnowflakeGenerator, SnowflakeId, TimeSource,
    generator::{Mutex, MutexGuard, step::advance},
};

/// A lock-based Snowflake ID generator for multi-threaded environments.
///
/// The last issued ID lives in an [`Arc<Mutex<_>>`]. Reading the clock,
/// comparing against the last ID, and recording the new one all happen in a
/// single critical section, so concurrent callers can never observe
/// overlapping sequence states.
///
/// Clones share the same state and machine ID. Build one per process and hand
/// clones to whoever needs IDs.
///
/// ## Recommended When
/// - Many threads or tasks share one generator
/// - Fair access across threads is important
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<Option<SnowflakeId>>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<Option<SnowflakeId>>>,
    machine_id: MachineId,
    time: T,
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator that has not issued anything yet.
    ///
    /// # Parameters
    ///
    /// - `machine_id`: identifies this process. Encoded into every ID.
    /// - `time`: the [`TimeSource`] read on every attempt (e.g.
    ///   [`SystemClock`]).
    ///
    /// # Example
    /// ```
    /// use chirpid::{LockSnowflakeGenerator, MachineId, SnowflakeGenerator, SystemClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(MachineId::new(3).unwrap(), SystemClock::default());
    /// let id = generator.generate().unwrap();
    /// assert_eq!(id.machine_id(), 3);
    /// ```
    ///
    /// [`SystemClock`]: crate::SystemClock
    pub fn new(machine_id: MachineId, time: T) -> Self {
        Self::with_state(None, machine_id, time)
    }

    /// Validates a configured machine ID and creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `machine_id` is outside
    /// `0..=1023`.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    pub fn try_new(machine_id: i64, time: T) -> Result<Self> {
        Ok(Self::new(MachineId::new(machine_id)?, time))
    }

    /// Creates a generator that resumes after an already issued ID.
    ///
    /// Useful for controlling the starting point manually, e.g. to restore
    /// known state or to exercise sequence exhaustion. In typical use,
    /// prefer [`Self::new`].
    pub fn from_components(
        timestamp: u64,
        machine_id: MachineId,
        sequence: u64,
        time: T,
    ) -> Self {
        let last = SnowflakeId::from_components(timestamp, machine_id.get().into(), sequence);
        Self::with_state(Some(last), machine_id, time)
    }

    fn with_state(last: Option<SnowflakeId>, machine_id: MachineId, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(last))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(last)),
            machine_id,
            time,
        }
    }

    /// The most recently issued ID, if any.
    ///
    /// # Errors
    ///
    /// Returns `Error::LockPoisoned` if the std mutex is poisoned.
    pub fn last_issued(&self) -> Result<Option<SnowflakeId>> {
        Ok(*self.lock()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<SnowflakeId>>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Attempts to issue the next ID.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID was issued
    /// - `Ok(IdGenStatus::Pending { yield_for })`: the sequence for this
    ///   millisecond is spent; wait `yield_for` ms
    /// - `Err(e)`: the clock is unusable or moved backward, or the lock is
    ///   poisoned. State is left untouched.
    ///
    /// # Errors
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(machine_id = %self.machine_id)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut last = self.lock()?;

        // Read under the lock: a caller preempted between reading the clock
        // and taking the lock would otherwise look like a regression.
        let now = self.time.current_millis()?;

        match advance(*last, now, self.machine_id)? {
            Some(id) => {
                *last = Some(id);
                Ok(IdGenStatus::Ready { id })
            }
            None => Ok(IdGenStatus::Pending { yield_for: 1 }),
        }
    }
}

impl<T> Clone for LockSnowflakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            machine_id: self.machine_id,
            time: self.time.clone(),
        }
    }
}

impl<T> SnowflakeGenerator for LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn machine_id(&self) -> MachineId {
        self.machine_id
    }

    fn epoch(&self) -> Duration {
        self.time.epoch()
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.try_poll_id()
    }
}
