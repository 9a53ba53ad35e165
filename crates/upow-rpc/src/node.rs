//! Typed node endpoints.
//!
//! Wraps the uPow node HTTP API: `get_address_info`, `push_tx`,
//! `get_validators_info`, `get_delegates_info`, `dobby_info`, and
//! `get_transaction`. Response structs default every optional section so a
//! node answering a narrower query still deserializes, and carry catch-all
//! maps for fields this client does not read.

use crate::client::{NodeConfig, RpcClient};
use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// =============================================================================
// Wire Types
// =============================================================================

/// Envelope most endpoints answer with.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

/// Amount field as the node sends it: decimal string or JSON number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(f64),
}

impl AmountField {
    /// Decimal string form, suitable for smallest-unit conversion.
    pub fn as_decimal(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            // Shortest round-trip form; "1" rather than "1.0".
            Self::Number(n) => format!("{n}"),
        }
    }
}

/// One spendable/stake/vote/registration output as reported by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputEntry {
    pub tx_hash: String,
    pub index: u8,
    #[serde(default)]
    pub amount: Option<AmountField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to an output consumed by a pending transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct OutPointEntry {
    pub tx_hash: String,
    pub index: u8,
}

/// Input of a pending transaction (only the fields the wallet reads).
#[derive(Debug, Clone, Deserialize)]
pub struct PendingInput {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output of a pending transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingOutput {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A transaction still in the node's pool.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingTransaction {
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PendingInput>,
    #[serde(default)]
    pub outputs: Vec<PendingOutput>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `get_address_info` result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressInfo {
    #[serde(default)]
    pub balance: Option<AmountField>,
    #[serde(default)]
    pub stake: Option<AmountField>,
    #[serde(default)]
    pub spendable_outputs: Vec<OutputEntry>,
    #[serde(default)]
    pub pending_spent_outputs: Vec<OutPointEntry>,
    #[serde(default)]
    pub pending_transactions: Vec<PendingTransaction>,
    #[serde(default)]
    pub stake_outputs: Vec<OutputEntry>,
    #[serde(default)]
    pub delegate_unspent_votes: Vec<OutputEntry>,
    #[serde(default)]
    pub delegate_spent_votes: Vec<OutputEntry>,
    #[serde(default)]
    pub validator_unspent_votes: Vec<OutputEntry>,
    #[serde(default)]
    pub inode_registration_outputs: Vec<OutputEntry>,
    #[serde(default)]
    pub is_inode_registered: bool,
    #[serde(default)]
    pub is_validator: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One vote inside a ballot.
#[derive(Debug, Clone, Deserialize)]
pub struct BallotVote {
    pub tx_hash: String,
    pub index: u8,
    #[serde(default)]
    pub vote_count: Option<AmountField>,
    #[serde(default)]
    pub wallet: Option<String>,
}

/// A validator's ballot: the votes it currently holds toward inodes.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorBallot {
    #[serde(default)]
    pub validator: Option<String>,
    #[serde(default)]
    pub vote: Vec<BallotVote>,
}

/// A delegate's ballot: the votes it currently holds toward validators.
#[derive(Debug, Clone, Deserialize)]
pub struct DelegateBallot {
    #[serde(default)]
    pub delegate: Option<String>,
    #[serde(default)]
    pub vote: Vec<BallotVote>,
}

/// Active inode roster entry from `dobby_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveInode {
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query flags for `get_address_info`. Each flag switches one optional
/// section of the response on; operations request only the slice they need.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateQuery {
    pub stake_outputs: bool,
    pub delegate_spent_votes: bool,
    pub delegate_unspent_votes: bool,
    pub address_state: bool,
    pub inode_registration_outputs: bool,
    pub validator_unspent_votes: bool,
}

impl StateQuery {
    /// Everything on. Voting and revocation need the full picture.
    pub fn full() -> Self {
        Self {
            stake_outputs: true,
            delegate_spent_votes: true,
            delegate_unspent_votes: true,
            address_state: true,
            inode_registration_outputs: true,
            validator_unspent_votes: true,
        }
    }

    /// Stake and delegate-ballot sections, used by stake and unstake.
    pub fn staking() -> Self {
        Self {
            stake_outputs: true,
            delegate_spent_votes: true,
            delegate_unspent_votes: true,
            ..Default::default()
        }
    }
}

// =============================================================================
// Typed Client
// =============================================================================

/// Typed async client for the uPow node.
pub struct NodeRpc {
    client: RpcClient,
}

impl NodeRpc {
    pub fn new(url: &str) -> Self {
        Self {
            client: RpcClient::new(url),
        }
    }

    pub fn with_config(config: NodeConfig) -> Self {
        Self {
            client: RpcClient::with_config(config),
        }
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }

    /// Fetch the state slice for one address.
    pub async fn get_address_info(
        &self,
        address: &str,
        query: &StateQuery,
    ) -> Result<AddressInfo, RpcError> {
        let params = [
            ("address", address.to_string()),
            ("transactions_count_limit", "0".to_string()),
            ("show_pending", "true".to_string()),
            ("stake_outputs", query.stake_outputs.to_string()),
            ("delegate_spent_votes", query.delegate_spent_votes.to_string()),
            ("delegate_unspent_votes", query.delegate_unspent_votes.to_string()),
            ("address_state", query.address_state.to_string()),
            ("inode_registration_outputs", query.inode_registration_outputs.to_string()),
            ("validator_unspent_votes", query.validator_unspent_votes.to_string()),
        ];
        let value = self.client.get("get_address_info", &params).await?;
        let env: Envelope<AddressInfo> = serde_json::from_value(value)?;
        unwrap_envelope(env, "get_address_info")
    }

    /// Submit a signed record. Ok means the node accepted it into its pool.
    pub async fn push_tx(&self, tx_hex: &str) -> Result<(), RpcError> {
        let value = self.client.post("push_tx", &json!({ "tx_hex": tx_hex })).await?;
        let env: Envelope<Value> = serde_json::from_value(value)?;
        if env.ok {
            Ok(())
        } else {
            let reason = env.error.unwrap_or_else(|| "transaction not pushed".to_string());
            log::warn!("push_tx rejected: {reason}");
            Err(RpcError::Rejected(reason))
        }
    }

    /// Ballots validators currently hold, optionally narrowed to one inode.
    /// This endpoint answers with a bare array, no envelope.
    pub async fn get_validators_info(
        &self,
        inode: Option<&str>,
    ) -> Result<Vec<ValidatorBallot>, RpcError> {
        let mut params = Vec::new();
        if let Some(inode) = inode {
            params.push(("inode", inode.to_string()));
        }
        let value = self.client.get("get_validators_info", &params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Ballots delegates currently hold, optionally narrowed to one
    /// validator. Bare array, no envelope.
    pub async fn get_delegates_info(
        &self,
        validator: Option<&str>,
    ) -> Result<Vec<DelegateBallot>, RpcError> {
        let mut params = Vec::new();
        if let Some(validator) = validator {
            params.push(("validator", validator.to_string()));
        }
        let value = self.client.get("get_delegates_info", &params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// The active inode roster.
    pub async fn dobby_info(&self) -> Result<Vec<ActiveInode>, RpcError> {
        let value = self.client.get("dobby_info", &[]).await?;
        let env: Envelope<Vec<ActiveInode>> = serde_json::from_value(value)?;
        unwrap_envelope(env, "dobby_info")
    }

    /// Raw detail blob for one transaction.
    pub async fn get_transaction(&self, tx_hash: &str) -> Result<Value, RpcError> {
        let params = [
            ("tx_hash", tx_hash.to_string()),
            ("verify", "true".to_string()),
        ];
        let value = self.client.get("get_transaction", &params).await?;
        let env: Envelope<Value> = serde_json::from_value(value)?;
        unwrap_envelope(env, "get_transaction")
    }
}

fn unwrap_envelope<T>(env: Envelope<T>, endpoint: &str) -> Result<T, RpcError> {
    if !env.ok {
        return Err(RpcError::Node(
            env.error.unwrap_or_else(|| format!("{endpoint} failed")),
        ));
    }
    env.result.ok_or_else(|| RpcError::NoResult(endpoint.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_info_deserializes_narrow_response() {
        let value = json!({
            "ok": true,
            "result": {
                "balance": "12.5",
                "spendable_outputs": [
                    { "tx_hash": "ab", "index": 0, "amount": "1.5" },
                    { "tx_hash": "cd", "index": 2, "amount": 3 }
                ],
                "pending_spent_outputs": [ { "tx_hash": "ab", "index": 0 } ]
            }
        });
        let env: Envelope<AddressInfo> = serde_json::from_value(value).unwrap();
        let info = unwrap_envelope(env, "get_address_info").unwrap();
        assert_eq!(info.spendable_outputs.len(), 2);
        assert_eq!(info.spendable_outputs[0].amount.as_ref().unwrap().as_decimal(), "1.5");
        assert_eq!(info.spendable_outputs[1].amount.as_ref().unwrap().as_decimal(), "3");
        assert_eq!(info.pending_spent_outputs[0].index, 0);
        assert!(info.stake_outputs.is_empty());
        assert!(!info.is_inode_registered);
    }

    #[test]
    fn test_envelope_error_maps_to_node_error() {
        let value = json!({ "ok": false, "error": "address not found" });
        let env: Envelope<AddressInfo> = serde_json::from_value(value).unwrap();
        let err = unwrap_envelope(env, "get_address_info").unwrap_err();
        assert!(matches!(err, RpcError::Node(msg) if msg == "address not found"));
    }

    #[test]
    fn test_envelope_ok_without_result() {
        let value = json!({ "ok": true });
        let env: Envelope<AddressInfo> = serde_json::from_value(value).unwrap();
        assert!(matches!(
            unwrap_envelope(env, "x"),
            Err(RpcError::NoResult(_))
        ));
    }

    #[test]
    fn test_ballot_deserialization() {
        let value = json!([
            {
                "validator": "Val1",
                "vote": [
                    { "tx_hash": "ee", "index": 1, "vote_count": "2.5", "wallet": "Inode1" }
                ]
            }
        ]);
        let ballots: Vec<ValidatorBallot> = serde_json::from_value(value).unwrap();
        assert_eq!(ballots[0].validator.as_deref(), Some("Val1"));
        assert_eq!(ballots[0].vote[0].wallet.as_deref(), Some("Inode1"));
    }

    #[test]
    fn test_pending_transaction_extra_fields_ignored() {
        let value = json!({
            "transaction_type": "VOTE_AS_DELEGATE",
            "inputs": [ { "address": "Me", "unexpected": 1 } ],
            "outputs": [],
            "hash": "ff"
        });
        let tx: PendingTransaction = serde_json::from_value(value).unwrap();
        assert_eq!(tx.transaction_type.as_deref(), Some("VOTE_AS_DELEGATE"));
        assert_eq!(tx.inputs[0].address.as_deref(), Some("Me"));
    }

    #[test]
    fn test_state_query_presets() {
        let full = StateQuery::full();
        assert!(full.stake_outputs && full.address_state && full.validator_unspent_votes);

        let staking = StateQuery::staking();
        assert!(staking.stake_outputs && staking.delegate_spent_votes);
        assert!(!staking.address_state && !staking.inode_registration_outputs);

        let basic = StateQuery::default();
        assert!(!basic.stake_outputs);
    }

    #[test]
    fn test_amount_field_decimal_forms() {
        assert_eq!(AmountField::Text("0.5".into()).as_decimal(), "0.5");
        assert_eq!(AmountField::Number(3.0).as_decimal(), "3");
        assert_eq!(AmountField::Number(0.25).as_decimal(), "0.25");
    }
}
