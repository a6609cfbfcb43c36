use std::fmt;
use std::str::FromStr;

use crate::hex;
use crate::HashError;

/// A git object identifier: the SHA-1 hash of an object's canonical framed
/// form, held as 20 raw bytes.
///
/// Equality and ordering are on the raw bytes; the textual form is 40
/// lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// The null OID (all zeros).
    pub const NULL: Self = Self([0u8; 20]);

    /// Create an ObjectId from raw bytes. Must be exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != 20 {
            return Err(HashError::InvalidHashLength {
                expected: 20,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse a 40-character hex string. Rejects any other length and any
    /// non-hex character.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        if hex.len() != 40 {
            return Err(HashError::InvalidHexLength {
                expected: 40,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; 20];
        hex::decode_into(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// The raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Is this the null (all-zeros) OID?
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The 40-character lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The loose object path component: `"xx/yyyy..."`, where `xx` is the
    /// first byte in hex (the fan-out directory).
    pub fn loose_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..8])
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
