//! uPow wallet core.
//!
//! Ties the ledger-node client, the pure transaction core, and signing into
//! the high-level operation set: transfer, stake/unstake, inode and
//! validator registration, voting, revocation, dust consolidation, and
//! balance reporting.
//!
//! Every operation is an independent, stateless fetch → build → sign →
//! broadcast flow over an immutable state snapshot. Nothing is locked
//! locally; two concurrent operations on the same key can select
//! overlapping outputs, and the node arbitrates at broadcast time.

pub mod balance;
pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod wallet;

pub use balance::BalanceInfo;
pub use error::WalletError;
pub use ledger::LedgerClient;
pub use wallet::{Recipient, TxReceipt, Wallet};
