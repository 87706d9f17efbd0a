use core::time::Duration;

use crate::{Error, IdGenStatus, MachineId, ParsedId, Result, SnowflakeId};

/// Largest `count` accepted by [`SnowflakeGenerator::generate_batch`].
pub const MAX_BATCH_SIZE: usize = 1000;

/// Checks a batch size against `1..=MAX_BATCH_SIZE`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `count` is zero or exceeds
/// [`MAX_BATCH_SIZE`].
pub fn validate_batch_size(count: usize) -> Result<usize> {
    if count == 0 || count > MAX_BATCH_SIZE {
        return Err(Error::invalid_argument(format!(
            "batch count must be between 1 and {MAX_BATCH_SIZE}, got {count}"
        )));
    }
    Ok(count)
}

/// The interface shared by every Snowflake ID generator.
///
/// Implementors provide one non-blocking attempt, [`Self::try_poll_id`]. The
/// blocking, batch, and parse operations are built on it.
pub trait SnowflakeGenerator {
    /// The machine ID stamped into every issued ID.
    fn machine_id(&self) -> MachineId;

    /// The epoch the generator's clock counts from.
    fn epoch(&self) -> Duration;

    /// Makes one attempt at issuing an ID.
    ///
    /// # Errors
    ///
    /// - [`Error::Clock`] if the clock reads before the epoch
    /// - [`Error::ClockRegression`] if the clock moved backward since the last
    ///   issued ID
    /// - [`Error::TimestampOverflow`] once the 41-bit timestamp is exhausted
    /// - `Error::LockPoisoned` if the generator's std mutex is poisoned
    fn try_poll_id(&self) -> Result<IdGenStatus>;

    /// Issues an ID, calling `backoff` with the suggested wait (in
    /// milliseconds) whenever the generator reports
    /// [`IdGenStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Any error from [`Self::try_poll_id`].
    fn try_next_id(&self, mut backoff: impl FnMut(u64)) -> Result<SnowflakeId> {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_for } => backoff(yield_for),
            }
        }
    }

    /// Issues an ID, sleeping the current thread while the sequence for the
    /// current millisecond is exhausted.
    ///
    /// The returned ID is strictly greater than every ID this generator issued
    /// before.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::try_poll_id`].
    ///
    /// # Example
    ///
    /// ```
    /// use chirpid::{Generator, SnowflakeGenerator, SystemClock};
    ///
    /// let generator = Generator::try_new(7, SystemClock::default()).unwrap();
    /// let a = generator.generate().unwrap();
    /// let b = generator.generate().unwrap();
    /// assert!(b > a);
    /// assert_eq!(generator.parse(b.to_raw()).unwrap().machine_id, 7);
    /// ```
    fn generate(&self) -> Result<SnowflakeId> {
        self.try_next_id(thread_backoff)
    }

    /// Issues `count` IDs in order. Each is strictly greater than the one
    /// before.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `count` is outside
    ///   `1..=MAX_BATCH_SIZE`
    /// - any error from [`Self::generate`]; IDs issued before the failure are
    ///   discarded
    fn generate_batch(&self, count: usize) -> Result<Vec<SnowflakeId>> {
        let count = validate_batch_size(count)?;
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.generate()?);
        }
        Ok(ids)
    }

    /// Decodes a raw ID against this generator's epoch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `raw` sets the reserved top bit.
    fn parse(&self, raw: u64) -> Result<ParsedId> {
        let id = SnowflakeId::try_from(raw)?;
        Ok(ParsedId::with_epoch(id, self.epoch()))
    }
}

/// Default wait between attempts: a short sleep bounded by the clock tick, or
/// a spin hint when the generator asked for an immediate retry.
pub(crate) fn thread_backoff(yield_for: u64) {
    if yield_for == 0 {
        core::hint::spin_loop();
    } else {
        std::thread::sleep(Duration::from_millis(yield_for));
    }
}
