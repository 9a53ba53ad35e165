//! uPow RPC client library.
//!
//! Async HTTP client for the uPow ledger node: address state, transaction
//! broadcast, ballot queries, and the active-inode roster.
//!
//! Requests are made exactly once, with no retry or backoff. A failed
//! fetch or broadcast surfaces verbatim, and the caller decides whether to
//! rebuild and resubmit (the whole build-and-sign flow is idempotent given
//! identical ledger state).
//!
//! # Example
//!
//! ```ignore
//! use upow_rpc::NodeRpc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let node = NodeRpc::new("https://api.upow.ai");
//!     let info = node
//!         .get_address_info("Dq2...", &Default::default())
//!         .await
//!         .unwrap();
//!     println!("spendable outputs: {}", info.spendable_outputs.len());
//! }
//! ```

pub mod client;
pub mod error;
pub mod node;

pub use client::{NodeConfig, RpcClient};
pub use error::RpcError;
pub use node::{NodeRpc, StateQuery};
