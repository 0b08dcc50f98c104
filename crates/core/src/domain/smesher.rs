// Smesher Identity & Coinbase

use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub const ADDRESS_LENGTH: usize = 20;

/// Reward destination address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Build an address from arbitrary bytes.
    ///
    /// Short inputs are left-padded with zeros, long inputs keep their
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut out = [0u8; ADDRESS_LENGTH];
        let take = bytes.len().min(ADDRESS_LENGTH);
        out[ADDRESS_LENGTH - take..].copy_from_slice(&bytes[bytes.len() - take..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

impl FromStr for Address {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s)?;
        if bytes.is_empty() {
            return Err(AppError::InvalidArgument("address must not be empty".into()));
        }
        Ok(Self::from_bytes(&bytes))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Public identity of this node as a smesher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SmesherId(Vec<u8>);

impl SmesherId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> Result<Self, AppError> {
        Ok(Self(decode_hex(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

impl Serialize for SmesherId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SmesherId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SmesherId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, AppError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits)
        .map_err(|e| AppError::InvalidArgument(format!("invalid hex string {:?}: {}", s, e)))
}
