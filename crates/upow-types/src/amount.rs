//! Fixed-point amount arithmetic.
//!
//! Ledger amounts travel as unsigned integers in the smallest unit
//! (10^8 per uPow). Conversion from and to the human-readable decimal form
//! is done entirely with arbitrary-precision integers; floats never touch
//! an amount.

use num_bigint::BigUint;
use num_traits::Zero;
use thiserror::Error;

/// Smallest units per uPow (10^8).
pub const COIN: u64 = 100_000_000;

/// Number of decimal places for display.
pub const DISPLAY_DECIMAL_POINT: usize = 8;

/// Widest amount field the wire format carries. The length prefix is one
/// byte, but the format caps values at 32 bytes.
pub const MAX_AMOUNT_WIDTH: usize = 32;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("invalid amount '{0}': expected a non-negative decimal with at most 8 fractional digits")]
    InvalidAmount(String),

    #[error("amount does not fit in {MAX_AMOUNT_WIDTH} bytes")]
    AmountTooWide,
}

/// Convert a decimal string (e.g. `"1.5"`) to smallest units.
pub fn to_smallest_unit(s: &str) -> Result<BigUint, AmountError> {
    let trimmed = s.trim();
    let invalid = || AmountError::InvalidAmount(s.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (whole_str, frac_str) = match trimmed.find('.') {
        Some(dot) => (&trimmed[..dot], &trimmed[dot + 1..]),
        None => (trimmed, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(invalid());
    }
    if frac_str.len() > DISPLAY_DECIMAL_POINT {
        return Err(invalid());
    }
    if !whole_str.bytes().all(|b| b.is_ascii_digit()) || !frac_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: BigUint = if whole_str.is_empty() {
        BigUint::zero()
    } else {
        whole_str.parse().map_err(|_| invalid())?
    };
    let frac: BigUint = if frac_str.is_empty() {
        BigUint::zero()
    } else {
        // Right-pad to 8 digits so "0.5" scales to 50_000_000.
        let padded = format!("{frac_str:0<8}");
        padded.parse().map_err(|_| invalid())?
    };

    Ok(whole * COIN + frac)
}

/// Format smallest units as a human-readable decimal (e.g. `"1.23456789"`).
pub fn format_amount(atomic: &BigUint) -> String {
    let coin = BigUint::from(COIN);
    let whole = atomic / &coin;
    let frac = atomic % &coin;
    if frac.is_zero() {
        format!("{whole}.0")
    } else {
        let frac_str = format!("{frac:08}");
        let trimmed = frac_str.trim_end_matches('0');
        format!("{whole}.{trimmed}")
    }
}

/// A whole-uPow count in smallest units.
pub fn coins(n: u64) -> BigUint {
    BigUint::from(n) * COIN
}

/// Smallest number of bytes able to hold `value` unsigned little-endian.
/// Zero encodes at width 1.
pub fn minimal_byte_width(value: &BigUint) -> Result<usize, AmountError> {
    let width = if value.is_zero() {
        1
    } else {
        ((value.bits() + 7) / 8) as usize
    };
    if width > MAX_AMOUNT_WIDTH {
        return Err(AmountError::AmountTooWide);
    }
    Ok(width)
}

/// Encode `value` as `width` little-endian bytes.
pub fn encode_le(value: &BigUint, width: usize) -> Vec<u8> {
    let mut bytes = value.to_bytes_le();
    bytes.resize(width, 0);
    bytes
}

/// Decode a little-endian unsigned integer. Exact inverse of [`encode_le`].
pub fn decode_le(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}
