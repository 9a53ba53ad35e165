//! uPow compact addresses.
//!
//! An address is 33 bytes on the wire: one parity prefix byte (42 for an
//! even Y coordinate, 43 for odd) followed by the little-endian X
//! coordinate of the P-256 public point. The textual form is plain Base58
//! of those 33 bytes with the Bitcoin alphabet, no checksum.

use p256::ecdsa::VerifyingKey;
use thiserror::Error;

/// Serialized address length in bytes.
pub const ADDRESS_LEN: usize = 33;

/// Prefix byte marking an even Y coordinate.
pub const PREFIX_EVEN_Y: u8 = 42;

/// Prefix byte marking an odd Y coordinate.
pub const PREFIX_ODD_Y: u8 = 43;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid base58: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),

    #[error("invalid address length {0} (expected {ADDRESS_LEN})")]
    InvalidLength(usize),

    #[error("invalid address prefix byte {0}")]
    InvalidPrefix(u8),
}

/// Compact 33-byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Validate and wrap a 33-byte compact form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        if bytes[0] != PREFIX_EVEN_Y && bytes[0] != PREFIX_ODD_Y {
            return Err(AddressError::InvalidPrefix(bytes[0]));
        }
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse the Base58 text form.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s).into_vec()?;
        Self::from_bytes(&bytes)
    }

    /// Derive the address belonging to a P-256 verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let sec1 = point.as_bytes();
        // SEC1 compressed tag: 0x02 = even Y, 0x03 = odd Y.
        let mut arr = [0u8; ADDRESS_LEN];
        arr[0] = if sec1[0] == 0x02 { PREFIX_EVEN_Y } else { PREFIX_ODD_Y };
        // The X coordinate is big-endian in SEC1; the wire wants it reversed.
        for (dst, src) in arr[1..].iter_mut().zip(sec1[1..33].iter().rev()) {
            *dst = *src;
        }
        Self(arr)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}
