//! Wallet error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("RPC error: {0}")]
    Rpc(#[from] upow_rpc::RpcError),

    #[error("transaction error: {0}")]
    Tx(#[from] upow_tx::TxError),

    #[error("amount error: {0}")]
    Amount(#[from] upow_types::AmountError),

    #[error("invalid address: {0}")]
    Address(#[from] upow_types::AddressError),

    #[error("malformed node data: {0}")]
    BadNodeData(String),
}
