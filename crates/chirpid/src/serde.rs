//! Serde support for [`SnowflakeId`].
//!
//! By default an ID serializes as its native integer. Deserializing rejects
//! values that set the reserved top bit. Use [`as_string`] for consumers that
//! can't hold a 64-bit integer exactly (e.g. JavaScript).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SnowflakeId;

impl Serialize for SnowflakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(s)
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Serialize a [`SnowflakeId`] as a decimal string.
///
/// ```
/// use chirpid::SnowflakeId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Tweet {
///     #[serde(with = "chirpid::serde::as_string")]
///     id: SnowflakeId,
/// }
///
/// let tweet = Tweet { id: SnowflakeId::from_components(1, 2, 3) };
/// let json = serde_json::to_string(&tweet).unwrap();
/// assert_eq!(json, r#"{"id":"4202499"}"#);
/// ```
pub mod as_string {
    use super::{Deserialize, Deserializer, Serializer};
    use crate::SnowflakeId;

    /// Serialize an ID as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// Deserialize an ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a 64-bit integer
    /// - The value is negative or sets the reserved top bit
    pub fn deserialize<'de, D>(d: D) -> Result<SnowflakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
