//! Balance reporting.
//!
//! Confirmed balances come straight from the node; pending deltas are
//! recomputed from the pool transactions touching this address, the same
//! way the reference client derives them.

use crate::error::WalletError;
use crate::snapshot::parse_amount_field;
use num_bigint::{BigInt, BigUint};
use std::collections::HashSet;
use upow_rpc::node::AddressInfo;
use upow_types::amount;

/// Balance breakdown for one address, in smallest units. The pending
/// fields can go negative while spends are in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceInfo {
    pub total: BigUint,
    pub pending: BigInt,
    pub stake: BigUint,
    pub pending_stake: BigInt,
}

impl BalanceInfo {
    /// Display form of the confirmed balance.
    pub fn display_total(&self) -> String {
        amount::format_amount(&self.total)
    }

    /// Display form of the confirmed stake.
    pub fn display_stake(&self) -> String {
        amount::format_amount(&self.stake)
    }
}

/// Compute the balance breakdown from an address-info response.
pub fn balance_from_info(info: &AddressInfo, address: &str) -> Result<BalanceInfo, WalletError> {
    let total = parse_amount_field(info.balance.as_ref())?;
    let stake = parse_amount_field(info.stake.as_ref())?;

    let spendable_hashes: HashSet<&str> = info
        .spendable_outputs
        .iter()
        .map(|o| o.tx_hash.as_str())
        .collect();

    let mut pending = BigInt::from(0);
    let mut pending_stake = BigInt::from(0);

    for tx in &info.pending_transactions {
        let releases_stake = tx
            .outputs
            .iter()
            .any(|o| o.kind.as_deref() == Some("UN_STAKE"));

        for input in &tx.inputs {
            if input.address.as_deref() != Some(address) {
                continue;
            }
            let Some(hash) = input.tx_hash.as_deref() else {
                continue;
            };
            if !spendable_hashes.contains(hash) {
                continue;
            }
            let amt = BigInt::from(parse_amount_field(input.amount.as_ref())?);
            if releases_stake {
                pending += &amt;
            } else if tx.transaction_type.as_deref() == Some("REGULAR") {
                pending -= &amt;
            }
        }

        for output in &tx.outputs {
            if output.address.as_deref() != Some(address) {
                continue;
            }
            let amt = BigInt::from(parse_amount_field(output.amount.as_ref())?);
            match output.kind.as_deref() {
                Some("STAKE") => pending_stake += &amt,
                Some("UN_STAKE") => pending_stake -= &amt,
                Some("REGULAR") => pending += &amt,
                _ => {}
            }
        }
    }

    Ok(BalanceInfo {
        total,
        pending,
        stake,
        pending_stake,
    })
}
