//! UTXO selection policies.
//!
//! Given a candidate list and a target amount, pick an ordered subset whose
//! sum covers the target. The walks mirror the ledger's established
//! behavior exactly, overshoot included, so downstream consumers see the
//! same input sets the reference client would produce.

use crate::types::Utxo;
use crate::TxError;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use upow_types::constants::MAX_TX_INPUTS;

/// Available selection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Sort ascending by amount and accumulate greedily, stopping at the
    /// first crossing of the target. Used by transfers and stakes.
    AccumulateAscending,
    /// Prefer the smallest single input covering the target alone; if none
    /// exists, accumulate largest-first until the target is crossed. Used
    /// when spending a bounded quantity such as voting power.
    ThresholdThenFill,
}

/// Result of a selection.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    /// Chosen inputs, in selection order.
    pub selected: Vec<Utxo>,
    /// Their summed amount (>= the target).
    pub total: BigUint,
}

/// Select UTXOs so that their sum reaches `target`.
///
/// Candidates must already have pending-spent outputs filtered out (see
/// `AddressSnapshot`). Ties in amount keep the candidate list order.
pub fn select_utxos(
    candidates: &[Utxo],
    target: &BigUint,
    policy: SelectionPolicy,
) -> Result<SelectionResult, TxError> {
    let available: BigUint = candidates.iter().map(|u| &u.amount).sum();
    if &available < target {
        return Err(TxError::InsufficientFunds {
            required: target.clone(),
            available,
        });
    }

    match policy {
        SelectionPolicy::AccumulateAscending => {
            let mut sorted = candidates.to_vec();
            sorted.sort_by(|a, b| a.amount.cmp(&b.amount));
            accumulate(sorted, target)
        }
        SelectionPolicy::ThresholdThenFill => {
            let single = candidates
                .iter()
                .filter(|u| &u.amount >= target)
                .min_by(|a, b| a.amount.cmp(&b.amount));
            if let Some(hit) = single {
                return Ok(SelectionResult {
                    total: hit.amount.clone(),
                    selected: vec![hit.clone()],
                });
            }
            let mut sorted = candidates.to_vec();
            sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
            accumulate(sorted, target)
        }
    }
}

/// Gather small outputs for consolidation: everything at or below
/// `max_amount`, smallest first, capped at `max_count`. No threshold test;
/// the caller merges whatever comes back.
pub fn select_consolidation(
    candidates: &[Utxo],
    max_amount: &BigUint,
    max_count: usize,
) -> Vec<Utxo> {
    let mut filtered: Vec<Utxo> = candidates
        .iter()
        .filter(|u| &u.amount <= max_amount)
        .cloned()
        .collect();
    filtered.sort_by(|a, b| a.amount.cmp(&b.amount));
    if filtered.len() > max_count {
        log::debug!(
            "limiting consolidation set from {} to {} outputs",
            filtered.len(),
            max_count
        );
        filtered.truncate(max_count);
    }
    filtered
}

/// Walk `ordered` until the running sum crosses `target`. Never truncates
/// silently: needing a 256th input is a hard error, since a shortened input
/// list would under-fund the transaction.
fn accumulate(ordered: Vec<Utxo>, target: &BigUint) -> Result<SelectionResult, TxError> {
    let mut selected = Vec::new();
    let mut total = BigUint::zero();

    for utxo in ordered {
        if selected.len() >= MAX_TX_INPUTS {
            return Err(TxError::TooManyInputs { limit: MAX_TX_INPUTS });
        }
        total += &utxo.amount;
        selected.push(utxo);
        if &total >= target {
            return Ok(SelectionResult { selected, total });
        }
    }

    Err(TxError::InsufficientFunds {
        required: target.clone(),
        available: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidates(amounts: &[u64]) -> Vec<Utxo> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| Utxo {
                tx_hash: [i as u8; 32],
                index: i as u8,
                amount: BigUint::from(amount),
            })
            .collect()
    }

    fn amounts(result: &SelectionResult) -> Vec<u64> {
        result
            .selected
            .iter()
            .map(|u| u.amount.to_u64_digits().first().copied().unwrap_or(0))
            .collect()
    }

    // -- accumulate-ascending ------------------------------------------------

    #[test]
    fn test_ascending_picks_smallest_set_crossing_target() {
        let candidates = make_candidates(&[1, 2, 5, 10]);
        let result =
            select_utxos(&candidates, &BigUint::from(7u8), SelectionPolicy::AccumulateAscending)
                .unwrap();
        assert_eq!(amounts(&result), vec![1, 2, 5]);
        assert_eq!(result.total, BigUint::from(8u8));
    }

    #[test]
    fn test_ascending_stops_at_first_crossing() {
        let candidates = make_candidates(&[10, 1, 2]);
        let result =
            select_utxos(&candidates, &BigUint::from(3u8), SelectionPolicy::AccumulateAscending)
                .unwrap();
        // 1 + 2 = 3 crosses; the 10 never gets touched.
        assert_eq!(amounts(&result), vec![1, 2]);
    }

    #[test]
    fn test_ascending_tie_break_keeps_list_order() {
        let candidates = make_candidates(&[5, 5, 5]);
        let result =
            select_utxos(&candidates, &BigUint::from(10u8), SelectionPolicy::AccumulateAscending)
                .unwrap();
        assert_eq!(result.selected[0].index, 0);
        assert_eq!(result.selected[1].index, 1);
    }

    #[test]
    fn test_insufficient_funds_reports_totals() {
        let candidates = make_candidates(&[1, 1]);
        let err = select_utxos(&candidates, &BigUint::from(5u8), SelectionPolicy::AccumulateAscending)
            .unwrap_err();
        match err {
            TxError::InsufficientFunds { required, available } => {
                assert_eq!(required, BigUint::from(5u8));
                assert_eq!(available, BigUint::from(2u8));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_candidates_insufficient() {
        let err = select_utxos(&[], &BigUint::from(1u8), SelectionPolicy::AccumulateAscending)
            .unwrap_err();
        assert!(matches!(err, TxError::InsufficientFunds { .. }));
    }

    // -- threshold-then-fill -------------------------------------------------

    #[test]
    fn test_threshold_prefers_single_covering_input() {
        let candidates = make_candidates(&[3, 4, 20]);
        let result =
            select_utxos(&candidates, &BigUint::from(15u8), SelectionPolicy::ThresholdThenFill)
                .unwrap();
        assert_eq!(amounts(&result), vec![20]);
    }

    #[test]
    fn test_threshold_picks_smallest_covering_input() {
        let candidates = make_candidates(&[50, 20, 30]);
        let result =
            select_utxos(&candidates, &BigUint::from(15u8), SelectionPolicy::ThresholdThenFill)
                .unwrap();
        assert_eq!(amounts(&result), vec![20]);
    }

    #[test]
    fn test_threshold_falls_back_to_largest_first() {
        let candidates = make_candidates(&[3, 4, 20]);
        let result =
            select_utxos(&candidates, &BigUint::from(25u8), SelectionPolicy::ThresholdThenFill)
                .unwrap();
        // No single input covers 25: descending walk 20, 4 (24), 3 (27).
        assert_eq!(amounts(&result), vec![20, 4, 3]);
        assert_eq!(result.total, BigUint::from(27u8));
    }

    #[test]
    fn test_threshold_fallback_stops_at_crossing() {
        let candidates = make_candidates(&[10, 9, 1, 1]);
        let result =
            select_utxos(&candidates, &BigUint::from(19u8), SelectionPolicy::ThresholdThenFill)
                .unwrap();
        assert_eq!(amounts(&result), vec![10, 9]);
    }

    // -- input ceiling -------------------------------------------------------

    #[test]
    fn test_256th_input_is_a_hard_error() {
        let candidates = make_candidates(&vec![1u64; 256]);
        let err = select_utxos(
            &candidates,
            &BigUint::from(256u16),
            SelectionPolicy::AccumulateAscending,
        )
        .unwrap_err();
        assert!(matches!(err, TxError::TooManyInputs { limit: 255 }));
    }

    #[test]
    fn test_255_inputs_is_allowed() {
        let candidates = make_candidates(&vec![1u64; 255]);
        let result = select_utxos(
            &candidates,
            &BigUint::from(255u16),
            SelectionPolicy::AccumulateAscending,
        )
        .unwrap();
        assert_eq!(result.selected.len(), 255);
    }

    #[test]
    fn test_ceiling_applies_to_threshold_fallback() {
        let candidates = make_candidates(&vec![1u64; 300]);
        let err = select_utxos(
            &candidates,
            &BigUint::from(300u16),
            SelectionPolicy::ThresholdThenFill,
        )
        .unwrap_err();
        assert!(matches!(err, TxError::TooManyInputs { .. }));
    }

    // -- consolidation -------------------------------------------------------

    #[test]
    fn test_consolidation_filters_sorts_truncates() {
        let candidates = make_candidates(&[50, 3, 100, 7, 5]);
        let picked = select_consolidation(&candidates, &BigUint::from(50u8), 3);
        let picked_amounts: Vec<u64> = picked
            .iter()
            .map(|u| u.amount.to_u64_digits().first().copied().unwrap_or(0))
            .collect();
        assert_eq!(picked_amounts, vec![3, 5, 7]);
    }

    #[test]
    fn test_consolidation_no_threshold_test() {
        // Returns whatever qualifies, even if that's nothing.
        let candidates = make_candidates(&[100, 200]);
        assert!(select_consolidation(&candidates, &BigUint::from(10u8), 5).is_empty());
    }
}
