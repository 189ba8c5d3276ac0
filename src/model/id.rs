use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("malformed object id: {0:?}")]
    Malformed(String),
}

/// 12-byte document identifier: a big-endian unix-second timestamp in the
/// first four bytes, random entropy in the remaining eight. Rendered as a
/// 24-character lowercase hex string everywhere outside the store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let secs = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        ObjectId(bytes)
    }

    pub fn parse_str(s: &str) -> Result<Self, IdError> {
        if s.len() != 24 {
            return Err(IdError::Malformed(s.to_owned()));
        }
        let raw = hex::decode(s).map_err(|_| IdError::Malformed(s.to_owned()))?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&raw);
        Ok(ObjectId(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Unix seconds embedded at creation time.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_hex() {
        let id = ObjectId::new();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 24);
        assert_eq!(ObjectId::parse_str(&hex).unwrap(), id);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(ObjectId::parse_str("not-an-id").is_err());
        assert!(ObjectId::parse_str("abcd").is_err());
        // right length, non-hex characters
        assert!(ObjectId::parse_str("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn embeds_creation_timestamp() {
        let before = Utc::now().timestamp() as u32;
        let id = ObjectId::new();
        let after = Utc::now().timestamp() as u32;
        assert!(id.timestamp() >= before && id.timestamp() <= after);
    }
}
