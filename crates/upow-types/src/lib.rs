//! Core types and constants for the uPow ledger.
//!
//! This crate provides the foundational pieces shared by the transaction,
//! RPC, and wallet crates: fixed-point amount arithmetic in the smallest
//! unit, the compact address form with its Base58 text encoding, and the
//! output-kind enumeration with the network's fixed parameters.

pub mod address;
pub mod amount;
pub mod constants;

pub use address::{Address, AddressError};
pub use amount::{AmountError, COIN};
pub use constants::{OutputKind, TRANSACTION_VERSION};
