use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/**
    Transaction id in display order (the byte reversed double sha256).
    Written reversed wherever it appears inside a transaction.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Txid([u8; 32]);

impl Txid {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// From the hash256 of a serialized transaction
    pub fn from_hash(hash: [u8; 32]) -> Self {
        let mut bytes = hash;
        bytes.reverse();
        Self(bytes)
    }

    /// From the reversed form found on the wire
    pub fn from_wire(wire: [u8; 32]) -> Self {
        Self::from_hash(wire)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_wire(&self) -> [u8; 32] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Txid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes.try_into()
            .map_err(|b: Vec<u8>| Error::Deserialize(format!("txid must be 32 bytes, got {}", b.len())))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl<'de> Deserialize<'de> for Txid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
