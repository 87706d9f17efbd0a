use core::time::Duration;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdGenStatus, MachineId, Result, SnowflakeGenerator, SnowflakeId, TimeSource,
    generator::step::advance,
};

/// Raw state meaning "nothing issued yet". Valid IDs never set the reserved
/// bit, so this can't collide with a real ID.
const UNSET: u64 = SnowflakeId::RESERVED_MASK;

/// A lock-free Snowflake ID generator suitable for multi-threaded environments.
///
/// The last issued ID is stored in an [`AtomicU64`] and advanced with a
/// compare-and-swap. A caller that loses the race gets
/// [`IdGenStatus::Pending`] with `yield_for == 0` and retries immediately.
///
/// Unlike [`LockSnowflakeGenerator`], this type does not share state across
/// clones; wrap it in an [`Arc`](std::sync::Arc) or borrow it to share it.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    machine_id: MachineId,
    time: T,
}

impl<T> AtomicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator that has not issued anything yet.
    ///
    /// # Example
    /// ```
    /// use chirpid::{AtomicSnowflakeGenerator, MachineId, MonotonicClock, SnowflakeGenerator};
    ///
    /// let generator = AtomicSnowflakeGenerator::new(MachineId::new(0).unwrap(), MonotonicClock::new().unwrap());
    /// let ids = generator.generate_batch(10).unwrap();
    /// assert!(ids.windows(2).all(|w| w[0] < w[1]));
    /// ```
    pub fn new(machine_id: MachineId, time: T) -> Self {
        Self::with_raw(UNSET, machine_id, time)
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
    /// In typical use, prefer [`Self::new`].
    pub fn from_components(
        timestamp: u64,
        machine_id: MachineId,
        sequence: u64,
        time: T,
    ) -> Self {
        let last = SnowflakeId::from_components(timestamp, machine_id.get().into(), sequence);
        Self::with_raw(last.to_raw(), machine_id, time)
    }

    fn with_raw(raw: u64, machine_id: MachineId, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(raw)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(raw),
            machine_id,
            time,
        }
    }

    /// The most recently issued ID, if any.
    pub fn last_issued(&self) -> Option<SnowflakeId> {
        decode(self.state.load(Ordering::Acquire))
    }

    /// Attempts to issue the next ID.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: a new ID was issued
    /// - `Ok(IdGenStatus::Pending { yield_for: 1 })`: the sequence for this
    ///   millisecond is spent
    /// - `Ok(IdGenStatus::Pending { yield_for: 0 })`: another thread won the
    ///   CAS; retry at once
    ///
    /// # Errors
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(machine_id = %self.machine_id)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        // Load before reading the clock. Any ID in the loaded state was stamped
        // from an earlier reading, so a correct clock can't appear behind it.
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis()?;

        let Some(next_id) = advance(decode(current_raw), now, self.machine_id)? else {
            return Ok(IdGenStatus::Pending { yield_for: 1 });
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            Ok(IdGenStatus::Ready { id: next_id })
        } else {
            // Lost the race. Yield 0 to retry immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

fn decode(raw: u64) -> Option<SnowflakeId> {
    (raw != UNSET).then(|| SnowflakeId::from_raw(raw))
}

impl<T> SnowflakeGenerator for AtomicSnowflakeGenerator<T>
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
