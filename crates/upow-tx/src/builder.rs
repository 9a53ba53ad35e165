//! Transaction-kind assemblers.
//!
//! Each builder takes an immutable [`AddressSnapshot`] (plus whatever
//! roster data the kind needs), applies the ledger's eligibility rules,
//! and composes an unsigned record. Eligibility is checked before any
//! selection runs, in the order the state was fetched; no record is
//! produced until every check passes.
//!
//! Value conservation holds throughout: funded outputs sum to exactly the
//! selected inputs, with surplus returned to the sender as one change
//! output. The voting-power grant outputs (first stake, validator
//! registration) are minted by the ledger and carry no input backing.

use crate::select::{self, SelectionPolicy};
use crate::types::{AddressSnapshot, Beneficiary, TransactionRecord, TxInput, TxOutput, Utxo};
use crate::TxError;
use num_bigint::BigUint;
use num_traits::Zero;
use upow_types::amount::coins;
use upow_types::constants::{
    marker, FIXED_FEE, INODE_DEPOSIT, MAX_INODES, MAX_TX_INPUTS, VALIDATOR_DEPOSIT, VOTE_CAP,
    VOTING_POWER_GRANT,
};
use upow_types::{Address, OutputKind};

fn to_inputs(selected: &[Utxo]) -> Vec<TxInput> {
    selected.iter().map(TxInput::from).collect()
}

/// Change output for the surplus above `spent`, if any.
fn change_output(
    sender: &Address,
    total_in: &BigUint,
    spent: &BigUint,
    kind: OutputKind,
) -> Option<TxOutput> {
    if total_in > spent {
        Some(TxOutput::new(*sender, total_in - spent, kind))
    } else {
        None
    }
}

/// Plain transfer to one or more beneficiaries, with an optional message.
///
/// The fixed fee widens the selection target so the record clears the
/// node's minimum; the surplus over the beneficiary sum still comes back as
/// change in full.
pub fn build_transfer(
    snapshot: &AddressSnapshot,
    sender: &Address,
    beneficiaries: &[Beneficiary],
    message: Option<String>,
) -> Result<TransactionRecord, TxError> {
    if beneficiaries.is_empty() {
        return Err(TxError::EmptyBeneficiaries);
    }

    let spend_total: BigUint = beneficiaries.iter().map(|b| &b.amount).sum();
    let target = &spend_total + &BigUint::from(FIXED_FEE);

    let candidates = snapshot.spendable_candidates();
    let picked = select::select_utxos(&candidates, &target, SelectionPolicy::AccumulateAscending)?;

    let mut outputs: Vec<TxOutput> = beneficiaries
        .iter()
        .map(|b| TxOutput::new(b.address, b.amount.clone(), b.kind))
        .collect();
    outputs.extend(change_output(sender, &picked.total, &spend_total, OutputKind::Regular));

    Ok(TransactionRecord::new(to_inputs(&picked.selected), outputs, message))
}

/// Stake an amount. The first stake makes the address a delegate and grants
/// its initial voting power.
pub fn build_stake(
    snapshot: &AddressSnapshot,
    sender: &Address,
    amount: BigUint,
) -> Result<TransactionRecord, TxError> {
    if !snapshot.stake_candidates().is_empty() {
        return Err(TxError::AlreadyStaked);
    }

    let ballot = snapshot.delegate_total_power();
    if ballot > coins(VOTE_CAP) {
        return Err(TxError::VotingPowerExceeded(VOTE_CAP));
    }

    let candidates = snapshot.spendable_candidates();
    if candidates.is_empty() {
        return Err(TxError::NoSpendableOutputs);
    }

    let picked = select::select_utxos(&candidates, &amount, SelectionPolicy::AccumulateAscending)?;

    let mut outputs = vec![TxOutput::new(*sender, amount.clone(), OutputKind::Stake)];
    outputs.extend(change_output(sender, &picked.total, &amount, OutputKind::Regular));
    if ballot.is_zero() {
        outputs.push(TxOutput::new(
            *sender,
            coins(VOTING_POWER_GRANT),
            OutputKind::VotingPowerDelegate,
        ));
    }

    Ok(TransactionRecord::new(to_inputs(&picked.selected), outputs, None))
}

/// Release the active stake in full. The staked amount is locked behind any
/// votes still cast as a delegate, so those must be revoked first.
pub fn build_unstake(
    snapshot: &AddressSnapshot,
    sender: &Address,
) -> Result<TransactionRecord, TxError> {
    let stakes = snapshot.stake_candidates();
    let stake = stakes.first().ok_or(TxError::NoStake)?;

    if !snapshot.delegate_spent_votes.is_empty() {
        return Err(TxError::OutstandingVotes);
    }
    if snapshot.pending_vote_as_delegate {
        return Err(TxError::PendingVoteRelease);
    }

    let outputs = vec![TxOutput::new(*sender, stake.amount.clone(), OutputKind::Unstake)];
    Ok(TransactionRecord::new(vec![TxInput::from(stake)], outputs, None))
}

/// Shared eligibility for inode/validator registration. Returns the
/// spendable candidates on success.
fn registration_candidates(
    snapshot: &AddressSnapshot,
    deposit: &BigUint,
) -> Result<Vec<Utxo>, TxError> {
    let candidates = snapshot.spendable_candidates();
    if candidates.is_empty() {
        return Err(TxError::NoSpendableOutputs);
    }
    let available: BigUint = candidates.iter().map(|u| &u.amount).sum();
    if &available < deposit {
        return Err(TxError::InsufficientFunds {
            required: deposit.clone(),
            available,
        });
    }
    if snapshot.stake_candidates().is_empty() {
        return Err(TxError::NotADelegate);
    }
    if snapshot.is_inode {
        return Err(TxError::AlreadyInode);
    }
    if snapshot.is_validator {
        return Err(TxError::AlreadyValidator);
    }
    Ok(candidates)
}

/// Register this address as an inode by locking the fixed deposit.
pub fn build_register_inode(
    snapshot: &AddressSnapshot,
    sender: &Address,
    active_inode_count: usize,
) -> Result<TransactionRecord, TxError> {
    let deposit = coins(INODE_DEPOSIT);
    let candidates = registration_candidates(snapshot, &deposit)?;
    if active_inode_count >= MAX_INODES {
        return Err(TxError::InodeSlotsFull(MAX_INODES));
    }

    let picked = select::select_utxos(&candidates, &deposit, SelectionPolicy::ThresholdThenFill)?;

    let mut outputs = vec![TxOutput::new(*sender, deposit.clone(), OutputKind::InodeDeposit)];
    outputs.extend(change_output(sender, &picked.total, &deposit, OutputKind::Regular));

    Ok(TransactionRecord::new(to_inputs(&picked.selected), outputs, None))
}

/// Return the inode deposit. Only a node absent from the active roster may
/// de-register.
pub fn build_deregister_inode(
    snapshot: &AddressSnapshot,
    sender: &Address,
    is_active: bool,
) -> Result<TransactionRecord, TxError> {
    let registrations = snapshot.inode_registration_candidates();
    if registrations.is_empty() {
        return Err(TxError::NotRegisteredInode);
    }
    if is_active {
        return Err(TxError::ActiveInode);
    }

    let refund: BigUint = registrations.iter().map(|u| &u.amount).sum();
    let outputs = vec![TxOutput::new(*sender, refund, OutputKind::InodeRefund)];
    Ok(TransactionRecord::new(to_inputs(&registrations), outputs, None))
}

/// Register this address as a validator: deposit, initial validator voting
/// power, change.
pub fn build_register_validator(
    snapshot: &AddressSnapshot,
    sender: &Address,
) -> Result<TransactionRecord, TxError> {
    let deposit = coins(VALIDATOR_DEPOSIT);
    let candidates = registration_candidates(snapshot, &deposit)?;

    let picked = select::select_utxos(&candidates, &deposit, SelectionPolicy::ThresholdThenFill)?;

    let mut outputs = vec![
        TxOutput::new(*sender, deposit.clone(), OutputKind::ValidatorDeposit),
        TxOutput::new(*sender, coins(VOTING_POWER_GRANT), OutputKind::VotingPowerValidator),
    ];
    outputs.extend(change_output(sender, &picked.total, &deposit, OutputKind::Regular));

    Ok(TransactionRecord::new(
        to_inputs(&picked.selected),
        outputs,
        Some(marker::REGISTER_VALIDATOR.to_string()),
    ))
}

/// Cast `weight` voting power toward `recipient`. Validators vote with
/// validator power toward inodes, delegates with delegate power toward
/// validators; surplus power returns to the sender.
pub fn build_vote(
    snapshot: &AddressSnapshot,
    sender: &Address,
    weight: &BigUint,
    recipient: &Address,
) -> Result<TransactionRecord, TxError> {
    if weight.is_zero() || weight > &coins(VOTE_CAP) {
        return Err(TxError::InvalidVotingRange(VOTE_CAP));
    }
    if snapshot.is_inode {
        return Err(TxError::CannotVoteAsInode);
    }

    let candidates = if snapshot.is_validator {
        snapshot.validator_vote_candidates()
    } else {
        snapshot.delegate_vote_candidates()
    };
    if candidates.is_empty() {
        return Err(TxError::NoVotingPower);
    }
    let available: BigUint = candidates.iter().map(|u| &u.amount).sum();
    if &available < weight {
        return Err(TxError::InsufficientVotingPower {
            required: weight.clone(),
            available,
        });
    }

    let picked = select::select_utxos(&candidates, weight, SelectionPolicy::ThresholdThenFill)?;

    let (vote_kind, power_kind, mark) = if snapshot.is_validator {
        (OutputKind::VoteValidator, OutputKind::VotingPowerValidator, marker::VOTE_AS_VALIDATOR)
    } else {
        (OutputKind::VoteDelegate, OutputKind::VotingPowerDelegate, marker::VOTE_AS_DELEGATE)
    };

    let mut outputs = vec![TxOutput::new(*recipient, weight.clone(), vote_kind)];
    outputs.extend(change_output(sender, &picked.total, weight, power_kind));

    Ok(TransactionRecord::new(
        to_inputs(&picked.selected),
        outputs,
        Some(mark.to_string()),
    ))
}

/// Take back a previously cast ballot. `ballot` holds this voter's vote
/// outputs toward the target, already filtered for pending spends; the
/// summed weight returns to the sender as voting power.
pub fn build_revoke(
    sender: &Address,
    ballot: &[Utxo],
    as_validator: bool,
) -> Result<TransactionRecord, TxError> {
    if ballot.is_empty() {
        return Err(TxError::NotVoted);
    }

    let total: BigUint = ballot.iter().map(|u| &u.amount).sum();
    let (power_kind, mark) = if as_validator {
        (OutputKind::VotingPowerValidator, marker::REVOKE_AS_VALIDATOR)
    } else {
        (OutputKind::VotingPowerDelegate, marker::REVOKE_AS_DELEGATE)
    };

    let outputs = vec![TxOutput::new(*sender, total, power_kind)];
    Ok(TransactionRecord::new(to_inputs(ballot), outputs, Some(mark.to_string())))
}

/// Merge dust: spend every output at or below `max_amount` (up to
/// `max_count` of them) back to the sender as a single output.
pub fn build_consolidation(
    snapshot: &AddressSnapshot,
    sender: &Address,
    max_amount: &BigUint,
    max_count: usize,
) -> Result<TransactionRecord, TxError> {
    let dust = select::select_consolidation(
        &snapshot.spendable_candidates(),
        max_amount,
        max_count.min(MAX_TX_INPUTS),
    );
    if dust.is_empty() {
        return Err(TxError::NoSpendableOutputs);
    }

    let total: BigUint = dust.iter().map(|u| &u.amount).sum();
    let outputs = vec![TxOutput::new(*sender, total, OutputKind::Regular)];
    Ok(TransactionRecord::new(to_inputs(&dust), outputs, None))
}
