use crate::SnowflakeId;

/// Represents the result of one attempt to generate a new ID.
///
/// This type models the outcome of [`SnowflakeGenerator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means no ID could be issued yet. Wait
///   `yield_for` milliseconds and try again.
///
/// This allows non-blocking generation loops and clean backoff strategies.
///
/// # Example
///
/// ```
/// use chirpid::{IdGenStatus, LockSnowflakeGenerator, MachineId, Result, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> Result<u64> {
///         Ok(1)
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::new(MachineId::new(1).unwrap(), FixedTime);
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// ```
///
/// [`SnowflakeGenerator::try_poll_id`]: crate::SnowflakeGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// The sequence for the current millisecond is exhausted (`yield_for` is
    /// 1), or a lock-free update lost a race (`yield_for` is 0, retry at
    /// once).
    Pending {
        /// Milliseconds to wait before the next attempt.
        yield_for: u64,
    },
}
