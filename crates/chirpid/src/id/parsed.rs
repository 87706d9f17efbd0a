use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{CUSTOM_EPOCH, Error, Result, SnowflakeId};

/// The decoded fields of a [`SnowflakeId`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedId {
    /// The raw ID that was decoded.
    pub id: u64,
    /// Absolute issue time, in ms since the Unix epoch.
    pub timestamp: u64,
    /// The raw timestamp field, in ms since the generator's epoch.
    pub timestamp_offset: u64,
    pub machine_id: u16,
    pub sequence: u16,
}

impl ParsedId {
    /// Decodes `id` against a specific epoch.
    pub fn with_epoch(id: SnowflakeId, epoch: Duration) -> Self {
        let offset = id.timestamp();
        Self {
            id: id.to_raw(),
            timestamp: offset + epoch.as_millis() as u64,
            timestamp_offset: offset,
            // Both fields are masked to 10 and 12 bits.
            machine_id: id.machine_id() as u16,
            sequence: id.sequence() as u16,
        }
    }

    /// The issue time as a [`SystemTime`].
    pub fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.timestamp)
    }
}

impl From<SnowflakeId> for ParsedId {
    /// Decodes `id` against [`CUSTOM_EPOCH`].
    fn from(id: SnowflakeId) -> Self {
        Self::with_epoch(id, CUSTOM_EPOCH)
    }
}

/// Decodes a raw ID issued against [`CUSTOM_EPOCH`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `raw` is negative or sets the
/// reserved top bit. Any other 64-bit value decodes.
///
/// # Example
///
/// ```
/// use chirpid::{CUSTOM_EPOCH, parse};
///
/// let parsed = parse(1000_u64 << 22).unwrap();
/// assert_eq!(parsed.timestamp_offset, 1000);
/// assert_eq!(parsed.timestamp, CUSTOM_EPOCH.as_millis() as u64 + 1000);
/// assert!(parse(-1_i64).is_err());
/// ```
pub fn parse<R>(raw: R) -> Result<ParsedId>
where
    R: TryInto<SnowflakeId, Error = Error>,
{
    Ok(ParsedId::from(raw.try_into()?))
}
