//! High-level wallet.
//!
//! Each operation runs the same stateless flow: fetch the minimal ledger
//! slice, convert it to an immutable snapshot, compose the record with the
//! pure builders, sign, and broadcast. A failed fetch or broadcast surfaces
//! as an error; re-running the whole flow is safe because it is idempotent
//! given identical ledger state.

use crate::balance::{self, BalanceInfo};
use crate::error::WalletError;
use crate::ledger::LedgerClient;
use crate::snapshot;
use upow_rpc::node::StateQuery;
use upow_rpc::NodeRpc;
use upow_tx::{builder, codec, select, sign, Beneficiary, Signer, TransactionRecord, Utxo};
use upow_types::constants::MAX_TX_INPUTS;
use upow_types::{amount, Address, OutputKind};

/// Receipt for a broadcast transaction.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// SHA-256 of the signed record, the node's identifier for it.
    pub tx_hash: String,
    /// Full signed record hex as submitted.
    pub hex: String,
}

/// A transfer destination given in display units.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub address: String,
    pub amount: String,
    pub kind: OutputKind,
}

impl Recipient {
    pub fn new(address: &str, amount: &str) -> Self {
        Self {
            address: address.to_string(),
            amount: amount.to_string(),
            kind: OutputKind::Regular,
        }
    }
}

/// High-level wallet over a ledger-node client.
pub struct Wallet<L: LedgerClient> {
    signer: Signer,
    address: Address,
    ledger: L,
}

impl Wallet<NodeRpc> {
    /// Wallet talking to the node HTTP API at `endpoint`.
    pub fn new(private_key_hex: &str, endpoint: &str) -> Result<Self, WalletError> {
        Self::with_ledger(private_key_hex, NodeRpc::new(endpoint))
    }
}

impl<L: LedgerClient> Wallet<L> {
    /// Wallet over any ledger client (fakes included).
    pub fn with_ledger(private_key_hex: &str, ledger: L) -> Result<Self, WalletError> {
        let signer = Signer::from_private_key_hex(private_key_hex)?;
        let address = signer.address()?;
        Ok(Self {
            signer,
            address,
            ledger,
        })
    }

    /// This wallet's address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    fn address_b58(&self) -> String {
        self.address.to_base58()
    }

    async fn fetch_snapshot(
        &self,
        query: &StateQuery,
    ) -> Result<upow_tx::AddressSnapshot, WalletError> {
        let info = self.ledger.address_info(&self.address_b58(), query).await?;
        snapshot::snapshot_from_info(&info, &self.address_b58())
    }

    /// Sign a composed record and hand it to the node.
    async fn finalize(&self, record: TransactionRecord) -> Result<TxReceipt, WalletError> {
        let signed = self.signer.sign_record(&record)?;
        let bytes = codec::encode(&signed)?;
        let hex_form = hex::encode(&bytes);
        self.ledger.broadcast(&hex_form).await?;
        let tx_hash = hex::encode(sign::record_hash(&bytes));
        log::debug!("broadcast accepted: {tx_hash}");
        Ok(TxReceipt {
            tx_hash,
            hex: hex_form,
        })
    }

    /// Send funds to one or more recipients, with an optional message.
    pub async fn transfer(
        &self,
        recipients: &[Recipient],
        message: Option<String>,
    ) -> Result<TxReceipt, WalletError> {
        let beneficiaries = recipients
            .iter()
            .map(|r| {
                Ok(Beneficiary {
                    address: Address::from_base58(&r.address)?,
                    amount: amount::to_smallest_unit(&r.amount)?,
                    kind: r.kind,
                })
            })
            .collect::<Result<Vec<_>, WalletError>>()?;

        let snap = self.fetch_snapshot(&StateQuery::default()).await?;
        let record = builder::build_transfer(&snap, &self.address, &beneficiaries, message)?;
        self.finalize(record).await
    }

    /// Stake an amount, becoming a delegate if not one already.
    pub async fn stake(&self, amount_dec: &str) -> Result<TxReceipt, WalletError> {
        let value = amount::to_smallest_unit(amount_dec)?;
        let snap = self.fetch_snapshot(&StateQuery::staking()).await?;
        let record = builder::build_stake(&snap, &self.address, value)?;
        self.finalize(record).await
    }

    /// Release the active stake in full.
    pub async fn unstake(&self) -> Result<TxReceipt, WalletError> {
        let snap = self.fetch_snapshot(&StateQuery::staking()).await?;
        let record = builder::build_unstake(&snap, &self.address)?;
        self.finalize(record).await
    }

    /// Register this address as an inode.
    pub async fn register_inode(&self) -> Result<TxReceipt, WalletError> {
        let query = StateQuery {
            stake_outputs: true,
            address_state: true,
            inode_registration_outputs: true,
            validator_unspent_votes: true,
            ..Default::default()
        };
        let snap = self.fetch_snapshot(&query).await?;
        let roster = self.ledger.active_inodes().await?;
        let record = builder::build_register_inode(&snap, &self.address, roster.len())?;
        self.finalize(record).await
    }

    /// De-register this address as an inode and reclaim the deposit.
    pub async fn deregister_inode(&self) -> Result<TxReceipt, WalletError> {
        let query = StateQuery {
            inode_registration_outputs: true,
            ..Default::default()
        };
        let snap = self.fetch_snapshot(&query).await?;
        let roster = self.ledger.active_inodes().await?;
        let me = self.address_b58();
        let is_active = roster.iter().any(|n| n.wallet.as_deref() == Some(me.as_str()));
        let record = builder::build_deregister_inode(&snap, &self.address, is_active)?;
        self.finalize(record).await
    }

    /// Register this address as a validator.
    pub async fn register_validator(&self) -> Result<TxReceipt, WalletError> {
        let query = StateQuery {
            stake_outputs: true,
            address_state: true,
            ..Default::default()
        };
        let snap = self.fetch_snapshot(&query).await?;
        let record = builder::build_register_validator(&snap, &self.address)?;
        self.finalize(record).await
    }

    /// Cast `weight_dec` voting power (display units) toward `recipient`.
    pub async fn vote(&self, weight_dec: &str, recipient: &str) -> Result<TxReceipt, WalletError> {
        let weight = amount::to_smallest_unit(weight_dec)?;
        let to = Address::from_base58(recipient)?;
        let snap = self.fetch_snapshot(&StateQuery::full()).await?;
        let record = builder::build_vote(&snap, &self.address, &weight, &to)?;
        self.finalize(record).await
    }

    /// Take back every vote previously cast toward `target`.
    pub async fn revoke(&self, target: &str) -> Result<TxReceipt, WalletError> {
        let snap = self.fetch_snapshot(&StateQuery::full()).await?;
        let me = self.address_b58();
        let ballot = if snap.is_validator {
            let ballots = self.ledger.validator_ballots(target).await?;
            snapshot::validator_ballot_utxos(&ballots, &me, target, &snap.pending_spent)?
        } else {
            let ballots = self.ledger.delegate_ballots(target).await?;
            snapshot::delegate_ballot_utxos(&ballots, &me, target, &snap.pending_spent)?
        };
        let record = builder::build_revoke(&self.address, &ballot, snap.is_validator)?;
        self.finalize(record).await
    }

    /// Spendable outputs at or below `max_amount` (display units), smallest
    /// first, capped at `max_count`. Handy for sizing up dust.
    pub async fn spendable_utxos(
        &self,
        max_amount: &str,
        max_count: usize,
    ) -> Result<Vec<Utxo>, WalletError> {
        let ceiling = amount::to_smallest_unit(max_amount)?;
        let snap = self.fetch_snapshot(&StateQuery::default()).await?;
        Ok(select::select_consolidation(
            &snap.spendable_candidates(),
            &ceiling,
            max_count,
        ))
    }

    /// Merge dust: spend every output at or below `max_amount` (up to
    /// `max_count` of them) back to this address as a single output.
    pub async fn consolidate(
        &self,
        max_amount: &str,
        max_count: usize,
    ) -> Result<TxReceipt, WalletError> {
        let ceiling = amount::to_smallest_unit(max_amount)?;
        let snap = self.fetch_snapshot(&StateQuery::default()).await?;
        let record = builder::build_consolidation(
            &snap,
            &self.address,
            &ceiling,
            max_count.min(MAX_TX_INPUTS),
        )?;
        self.finalize(record).await
    }

    /// Balance breakdown including pending pool deltas.
    pub async fn balance(&self) -> Result<BalanceInfo, WalletError> {
        let info = self
            .ledger
            .address_info(&self.address_b58(), &StateQuery::default())
            .await?;
        balance::balance_from_info(&info, &self.address_b58())
    }
}
