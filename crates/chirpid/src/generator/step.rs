use core::cmp::Ordering;

use crate::{Error, MachineId, Result, SnowflakeId};

/// Computes the ID that follows `last` at clock reading `now`.
///
/// Returns `Ok(None)` when the sequence for `now` is exhausted. `last` is
/// `None` until the generator has issued its first ID.
#[inline]
pub(crate) fn advance(
    last: Option<SnowflakeId>,
    now: u64,
    machine_id: MachineId,
) -> Result<Option<SnowflakeId>> {
    if now > SnowflakeId::MAX_TIMESTAMP {
        return Err(cold_timestamp_overflow(now));
    }

    let Some(last) = last else {
        return Ok(Some(SnowflakeId::first_for(now, machine_id)));
    };

    let current_ts = last.timestamp();
    match now.cmp(&current_ts) {
        Ordering::Equal => {
            if last.has_sequence_room() {
                Ok(Some(last.increment_sequence()))
            } else {
                Ok(None)
            }
        }
        Ordering::Greater => Ok(Some(last.rollover_to_timestamp(now))),
        Ordering::Less => Err(cold_clock_behind(now, current_ts)),
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(now: u64, last: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(last, now, "clock moved backwards, refusing to issue id");
    Error::ClockRegression { last, now }
}

#[cold]
#[inline(never)]
fn cold_timestamp_overflow(millis: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::error!(millis, "timestamp field exhausted");
    Error::TimestampOverflow { millis }
}
