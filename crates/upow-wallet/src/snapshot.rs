//! Wire JSON to typed-snapshot conversion.
//!
//! Node responses carry hex hashes and decimal amounts as strings (or bare
//! numbers); the pure transaction core wants fixed byte arrays and
//! smallest-unit integers. All parsing happens here, before any selection
//! or assembly runs.

use crate::error::WalletError;
use num_bigint::BigUint;
use std::collections::HashSet;
use upow_rpc::node::{
    AddressInfo, AmountField, BallotVote, DelegateBallot, OutPointEntry, OutputEntry,
    PendingTransaction, ValidatorBallot,
};
use upow_tx::{AddressSnapshot, OutPoint, Utxo};
use upow_types::amount;

/// Pending transaction type tag the node uses for delegate votes.
const VOTE_AS_DELEGATE_TYPE: &str = "VOTE_AS_DELEGATE";

fn parse_tx_hash(s: &str) -> Result<[u8; 32], WalletError> {
    let bytes =
        hex::decode(s).map_err(|e| WalletError::BadNodeData(format!("tx hash '{s}': {e}")))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| WalletError::BadNodeData(format!("tx hash '{s}' is not 32 bytes")))
}

pub(crate) fn parse_amount_field(field: Option<&AmountField>) -> Result<BigUint, WalletError> {
    let text = field.map(AmountField::as_decimal).unwrap_or_else(|| "0".to_string());
    Ok(amount::to_smallest_unit(&text)?)
}

fn convert_outputs(entries: &[OutputEntry]) -> Result<Vec<Utxo>, WalletError> {
    entries
        .iter()
        .map(|e| {
            Ok(Utxo {
                tx_hash: parse_tx_hash(&e.tx_hash)?,
                index: e.index,
                amount: parse_amount_field(e.amount.as_ref())?,
            })
        })
        .collect()
}

fn pending_outpoints(entries: &[OutPointEntry]) -> Result<HashSet<OutPoint>, WalletError> {
    entries
        .iter()
        .map(|e| {
            Ok(OutPoint {
                tx_hash: parse_tx_hash(&e.tx_hash)?,
                index: e.index,
            })
        })
        .collect()
}

fn has_pending_delegate_vote(pending: &[PendingTransaction], address: &str) -> bool {
    pending.iter().any(|tx| {
        tx.transaction_type.as_deref() == Some(VOTE_AS_DELEGATE_TYPE)
            && tx.inputs.first().and_then(|i| i.address.as_deref()) == Some(address)
    })
}

/// Build the immutable snapshot a builder consumes.
pub fn snapshot_from_info(info: &AddressInfo, address: &str) -> Result<AddressSnapshot, WalletError> {
    Ok(AddressSnapshot {
        spendable: convert_outputs(&info.spendable_outputs)?,
        pending_spent: pending_outpoints(&info.pending_spent_outputs)?,
        stake_outputs: convert_outputs(&info.stake_outputs)?,
        delegate_unspent_votes: convert_outputs(&info.delegate_unspent_votes)?,
        delegate_spent_votes: convert_outputs(&info.delegate_spent_votes)?,
        validator_unspent_votes: convert_outputs(&info.validator_unspent_votes)?,
        inode_registrations: convert_outputs(&info.inode_registration_outputs)?,
        is_inode: info.is_inode_registered,
        is_validator: info.is_validator,
        pending_vote_as_delegate: has_pending_delegate_vote(&info.pending_transactions, address),
    })
}

/// Extract `voter`'s ballot toward `target` from validator ballots.
pub fn validator_ballot_utxos(
    ballots: &[ValidatorBallot],
    voter: &str,
    target: &str,
    pending: &HashSet<OutPoint>,
) -> Result<Vec<Utxo>, WalletError> {
    ballot_utxos(
        ballots
            .iter()
            .filter(|b| b.validator.as_deref() == Some(voter))
            .flat_map(|b| &b.vote),
        target,
        pending,
    )
}

/// Extract `voter`'s ballot toward `target` from delegate ballots.
pub fn delegate_ballot_utxos(
    ballots: &[DelegateBallot],
    voter: &str,
    target: &str,
    pending: &HashSet<OutPoint>,
) -> Result<Vec<Utxo>, WalletError> {
    ballot_utxos(
        ballots
            .iter()
            .filter(|b| b.delegate.as_deref() == Some(voter))
            .flat_map(|b| &b.vote),
        target,
        pending,
    )
}

fn ballot_utxos<'a>(
    votes: impl Iterator<Item = &'a BallotVote>,
    target: &str,
    pending: &HashSet<OutPoint>,
) -> Result<Vec<Utxo>, WalletError> {
    let mut out = Vec::new();
    for vote in votes {
        if vote.wallet.as_deref() != Some(target) {
            continue;
        }
        let tx_hash = parse_tx_hash(&vote.tx_hash)?;
        if pending.contains(&OutPoint { tx_hash, index: vote.index }) {
            continue;
        }
        out.push(Utxo {
            tx_hash,
            index: vote.index,
            amount: parse_amount_field(vote.vote_count.as_ref())?,
        });
    }
    Ok(out)
}
