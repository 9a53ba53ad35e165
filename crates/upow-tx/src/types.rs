//! Typed transaction record structures and ledger-state snapshots.

use num_bigint::BigUint;
use std::collections::HashSet;
use upow_types::{amount, Address, OutputKind, TRANSACTION_VERSION};

/// Reference to a transaction output on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub tx_hash: [u8; 32],
    pub index: u8,
}

/// Read-only view of one unspent output. The client never mutates these,
/// only references them as inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub tx_hash: [u8; 32],
    pub index: u8,
    pub amount: BigUint,
}

impl Utxo {
    pub fn outpoint(&self) -> OutPoint {
        OutPoint {
            tx_hash: self.tx_hash,
            index: self.index,
        }
    }
}

/// Transaction input: a consumed output reference.
///
/// Wire form is 34 bytes: hash, index, and a reserved zero byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxInput {
    pub tx_hash: [u8; 32],
    pub index: u8,
}

impl From<&Utxo> for TxInput {
    fn from(utxo: &Utxo) -> Self {
        Self {
            tx_hash: utxo.tx_hash,
            index: utxo.index,
        }
    }
}

/// Transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub address: Address,
    pub amount: BigUint,
    pub kind: OutputKind,
}

impl TxOutput {
    pub fn new(address: Address, amount: BigUint, kind: OutputKind) -> Self {
        Self { address, amount, kind }
    }

    /// Human-readable amount (smallest units divided by 10^8).
    pub fn display_amount(&self) -> String {
        amount::format_amount(&self.amount)
    }
}

/// ECDSA signature in wire byte order: `r` then `s`, each 32 bytes
/// little-endian (reversed from the signing primitive's big-endian form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// A complete transaction record, signed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub version: u8,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub message: Option<String>,
    pub signature: Option<RecordSignature>,
}

impl TransactionRecord {
    /// New unsigned record at the current wire version. An empty message is
    /// normalized away (the wire has no empty-message form).
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>, message: Option<String>) -> Self {
        let message = message.filter(|m| !m.is_empty());
        Self {
            version: TRANSACTION_VERSION,
            inputs,
            outputs,
            message,
            signature: None,
        }
    }

    /// Sum of all output amounts.
    pub fn total_output(&self) -> BigUint {
        self.outputs.iter().map(|o| &o.amount).sum()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// A transfer destination.
#[derive(Debug, Clone)]
pub struct Beneficiary {
    pub address: Address,
    pub amount: BigUint,
    pub kind: OutputKind,
}

impl Beneficiary {
    /// Plain-transfer destination.
    pub fn regular(address: Address, amount: BigUint) -> Self {
        Self {
            address,
            amount,
            kind: OutputKind::Regular,
        }
    }
}

/// Immutable slice of ledger state for one address, fetched per operation.
///
/// The candidate accessors exclude outputs already consumed by pending
/// (unconfirmed) transactions, so a builder never double-selects them.
/// Callers that want locking or retry-on-conflict layer it on top of this
/// snapshot; the core never mutates it.
#[derive(Debug, Clone, Default)]
pub struct AddressSnapshot {
    pub spendable: Vec<Utxo>,
    pub pending_spent: HashSet<OutPoint>,
    pub stake_outputs: Vec<Utxo>,
    pub delegate_unspent_votes: Vec<Utxo>,
    pub delegate_spent_votes: Vec<Utxo>,
    pub validator_unspent_votes: Vec<Utxo>,
    pub inode_registrations: Vec<Utxo>,
    pub is_inode: bool,
    pub is_validator: bool,
    pub pending_vote_as_delegate: bool,
}

impl AddressSnapshot {
    fn excluding_pending(&self, set: &[Utxo]) -> Vec<Utxo> {
        set.iter()
            .filter(|u| !self.pending_spent.contains(&u.outpoint()))
            .cloned()
            .collect()
    }

    pub fn spendable_candidates(&self) -> Vec<Utxo> {
        self.excluding_pending(&self.spendable)
    }

    pub fn stake_candidates(&self) -> Vec<Utxo> {
        self.excluding_pending(&self.stake_outputs)
    }

    pub fn delegate_vote_candidates(&self) -> Vec<Utxo> {
        self.excluding_pending(&self.delegate_unspent_votes)
    }

    pub fn validator_vote_candidates(&self) -> Vec<Utxo> {
        self.excluding_pending(&self.validator_unspent_votes)
    }

    pub fn inode_registration_candidates(&self) -> Vec<Utxo> {
        self.excluding_pending(&self.inode_registrations)
    }

    /// Total delegate voting power, spent and unspent, pending txs ignored.
    pub fn delegate_total_power(&self) -> BigUint {
        self.delegate_unspent_votes
            .iter()
            .chain(&self.delegate_spent_votes)
            .map(|u| &u.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utxo(id: u8, amount: u64) -> Utxo {
        Utxo {
            tx_hash: [id; 32],
            index: 0,
            amount: BigUint::from(amount),
        }
    }

    fn addr() -> Address {
        let mut bytes = [0x11u8; 33];
        bytes[0] = 42;
        Address::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_outpoint_from_utxo() {
        let u = utxo(7, 100);
        let op = u.outpoint();
        assert_eq!(op.tx_hash, [7; 32]);
        assert_eq!(op.index, 0);
    }

    #[test]
    fn test_record_normalizes_empty_message() {
        let record = TransactionRecord::new(vec![], vec![], Some(String::new()));
        assert!(record.message.is_none());
        let record = TransactionRecord::new(vec![], vec![], Some("hi".into()));
        assert_eq!(record.message.as_deref(), Some("hi"));
        assert_eq!(record.version, TRANSACTION_VERSION);
        assert!(!record.is_signed());
    }

    #[test]
    fn test_total_output() {
        let outputs = vec![
            TxOutput::new(addr(), BigUint::from(30u8), OutputKind::Regular),
            TxOutput::new(addr(), BigUint::from(12u8), OutputKind::Stake),
        ];
        let record = TransactionRecord::new(vec![], outputs, None);
        assert_eq!(record.total_output(), BigUint::from(42u8));
    }

    #[test]
    fn test_display_amount() {
        let out = TxOutput::new(addr(), BigUint::from(150_000_000u64), OutputKind::Regular);
        assert_eq!(out.display_amount(), "1.5");
    }

    #[test]
    fn test_snapshot_candidates_exclude_pending() {
        let mut snapshot = AddressSnapshot {
            spendable: vec![utxo(1, 10), utxo(2, 20), utxo(3, 30)],
            ..Default::default()
        };
        snapshot.pending_spent.insert(utxo(2, 20).outpoint());

        let candidates = snapshot.spendable_candidates();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|u| u.tx_hash != [2; 32]));
    }

    #[test]
    fn test_snapshot_stake_candidates_exclude_pending() {
        let mut snapshot = AddressSnapshot {
            stake_outputs: vec![utxo(9, 500)],
            ..Default::default()
        };
        assert_eq!(snapshot.stake_candidates().len(), 1);
        snapshot.pending_spent.insert(utxo(9, 500).outpoint());
        assert!(snapshot.stake_candidates().is_empty());
    }

    #[test]
    fn test_delegate_total_power_ignores_pending() {
        let mut snapshot = AddressSnapshot {
            delegate_unspent_votes: vec![utxo(1, 400_000_000)],
            delegate_spent_votes: vec![utxo(2, 600_000_000)],
            ..Default::default()
        };
        // Pending spends do not reduce the ballot total.
        snapshot.pending_spent.insert(utxo(1, 400_000_000).outpoint());
        assert_eq!(snapshot.delegate_total_power(), BigUint::from(1_000_000_000u64));
    }
}
