//! Transaction id type shared by the chain backends.
//!
//! Provides `Txid`, a 32-byte identifier displayed as byte-reversed hex,
//! matching the Bitcoin-family convention for transaction ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a transaction id in bytes.
pub const TXID_SIZE: usize = 32;

/// A 32-byte transaction identifier.
///
/// When displayed as a string the bytes are reversed, matching the
/// convention used by block explorers and node RPCs (little-endian
/// internal, big-endian display).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Txid([u8; TXID_SIZE]);

impl Txid {
    /// Create a Txid from a raw 32-byte array.
    ///
    /// The bytes are stored as-is (internal byte order).
    pub fn new(bytes: [u8; TXID_SIZE]) -> Self {
        Txid(bytes)
    }

    /// Create a Txid from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(Txid)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != TXID_SIZE {
            return Err(PrimitivesError::InvalidTxid(format!(
                "invalid txid length of {}, want {}",
                bytes.len(),
                TXID_SIZE
            )));
        }
        let mut arr = [0u8; TXID_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Txid(arr))
    }

    /// Create a Txid from a byte-reversed hex string.
    ///
    /// The hex string represents bytes in display order (reversed from
    /// internal storage) and must be exactly 64 characters.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string.
    ///
    /// # Returns
    /// `Ok(Txid)` on success, or an error for invalid input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != TXID_SIZE * 2 {
            return Err(PrimitivesError::InvalidTxid(format!(
                "txid hex must be {} characters, got {}",
                TXID_SIZE * 2,
                hex_str.len()
            )));
        }
        let decoded = hex::decode(hex_str)?;
        let mut dst = [0u8; TXID_SIZE];
        for (i, byte) in decoded.iter().rev().enumerate() {
            dst[i] = *byte;
        }
        Ok(Txid(dst))
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; TXID_SIZE] {
        &self.0
    }
}

/// Display the txid as byte-reversed hex.
impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

/// Parse a byte-reversed hex string into a Txid.
///
/// Equivalent to `Txid::from_hex`.
impl FromStr for Txid {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Txid::from_hex(s)
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for Txid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for Txid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Txid::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the double SHA-256 of `data` and return it as a Txid.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A `Txid` containing the double-SHA-256 digest.
pub fn double_hash(data: &[u8]) -> Txid {
    Txid(sha256d(data))
}
