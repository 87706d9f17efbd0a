use core::fmt;

use crate::{Error, Result, SnowflakeId};

/// Identifies the process that issues IDs, in `0..=1023`.
///
/// Distinct processes in one deployment must be given distinct machine IDs
/// out-of-band (environment, config). Nothing in this crate can detect two
/// generators sharing one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MachineId(u16);

impl MachineId {
    /// Largest valid machine ID.
    pub const MAX: u16 = SnowflakeId::MAX_MACHINE_ID as u16;

    /// Validates a configured machine ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `raw` is outside `0..=1023`.
    ///
    /// # Example
    ///
    /// ```
    /// use chirpid::{Error, MachineId};
    ///
    /// assert_eq!(MachineId::new(1023).unwrap().get(), 1023);
    /// assert!(matches!(MachineId::new(1024), Err(Error::Configuration { .. })));
    /// assert!(matches!(MachineId::new(-1), Err(Error::Configuration { .. })));
    /// ```
    pub fn new(raw: i64) -> Result<Self> {
        match u16::try_from(raw) {
            Ok(id) if id <= Self::MAX => Ok(Self(id)),
            _ => Err(Error::Configuration { machine_id: raw }),
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub(crate) const fn to_u64(self) -> u64 {
        self.0 as u64
    }
}

impl TryFrom<i64> for MachineId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<MachineId> for u16 {
    fn from(id: MachineId) -> Self {
        id.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
