//! Ledger-node capability.
//!
//! The wallet consumes the node through this narrow trait so tests (and
//! alternative transports) can stand in for the HTTP client.

use async_trait::async_trait;
use upow_rpc::node::{ActiveInode, AddressInfo, DelegateBallot, StateQuery, ValidatorBallot};
use upow_rpc::{NodeRpc, RpcError};

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch the state slice for one address.
    async fn address_info(
        &self,
        address: &str,
        query: &StateQuery,
    ) -> Result<AddressInfo, RpcError>;

    /// Submit a signed record hex. Ok means the node accepted it.
    async fn broadcast(&self, tx_hex: &str) -> Result<(), RpcError>;

    /// Ballots validators currently hold toward an inode.
    async fn validator_ballots(&self, inode: &str) -> Result<Vec<ValidatorBallot>, RpcError>;

    /// Ballots delegates currently hold toward a validator.
    async fn delegate_ballots(&self, validator: &str) -> Result<Vec<DelegateBallot>, RpcError>;

    /// The active inode roster.
    async fn active_inodes(&self) -> Result<Vec<ActiveInode>, RpcError>;
}

#[async_trait]
impl LedgerClient for NodeRpc {
    async fn address_info(
        &self,
        address: &str,
        query: &StateQuery,
    ) -> Result<AddressInfo, RpcError> {
        self.get_address_info(address, query).await
    }

    async fn broadcast(&self, tx_hex: &str) -> Result<(), RpcError> {
        self.push_tx(tx_hex).await
    }

    async fn validator_ballots(&self, inode: &str) -> Result<Vec<ValidatorBallot>, RpcError> {
        self.get_validators_info(Some(inode)).await
    }

    async fn delegate_ballots(&self, validator: &str) -> Result<Vec<DelegateBallot>, RpcError> {
        self.get_delegates_info(Some(validator)).await
    }

    async fn active_inodes(&self) -> Result<Vec<ActiveInode>, RpcError> {
        self.dobby_info().await
    }
}
