//! uPow transaction construction, parsing, and signing.
//!
//! Provides the canonical binary record codec, UTXO selection policies,
//! the SHA-256 + P-256 signing pipeline, and per-kind assemblers (transfer,
//! stake, unstake, inode/validator registration, voting, revocation).
//! Everything here is pure and synchronous; talking to a ledger node lives
//! in upow-rpc and upow-wallet.

pub mod builder;
pub mod codec;
pub mod select;
pub mod sign;
pub mod types;

pub use select::{SelectionPolicy, SelectionResult};
pub use sign::Signer;
pub use types::{
    AddressSnapshot, Beneficiary, OutPoint, RecordSignature, TransactionRecord, TxInput, TxOutput,
    Utxo,
};

use num_bigint::BigUint;
use thiserror::Error;
use upow_types::{AddressError, AmountError};

#[derive(Debug, Error)]
pub enum TxError {
    #[error("amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("address error: {0}")]
    Address(#[from] AddressError),

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: BigUint, available: BigUint },

    #[error("transaction would need more than {limit} inputs; consolidate smaller outputs first")]
    TooManyInputs { limit: usize },

    #[error("transaction has more than {limit} outputs")]
    TooManyOutputs { limit: usize },

    #[error("truncated record while reading {0}")]
    Truncated(&'static str),

    #[error("record is not valid hex")]
    MalformedHex,

    #[error("unknown output kind byte {0:#04x}")]
    UnknownOutputKind(u8),

    #[error("message exceeds {} bytes", u16::MAX)]
    MessageTooLong,

    #[error("no private key configured for signing")]
    MissingPrivateKey,

    #[error("private key is not a valid P-256 scalar")]
    InvalidPrivateKey,

    #[error("signing failed")]
    SigningFailed,

    #[error("no beneficiaries specified")]
    EmptyBeneficiaries,

    #[error("no spendable outputs")]
    NoSpendableOutputs,

    #[error("address already has an active stake")]
    AlreadyStaked,

    #[error("address has no active stake")]
    NoStake,

    #[error("votes are still cast as a delegate; release them before unstaking")]
    OutstandingVotes,

    #[error("a vote-as-delegate transaction is still pending; wait for it before unstaking")]
    PendingVoteRelease,

    #[error("address is not a delegate; stake first to become one")]
    NotADelegate,

    #[error("address is already registered as an inode")]
    AlreadyInode,

    #[error("address is already registered as a validator")]
    AlreadyValidator,

    #[error("all {0} inode slots are taken")]
    InodeSlotsFull(usize),

    #[error("address is not registered as an inode")]
    NotRegisteredInode,

    #[error("address is an active inode and cannot de-register")]
    ActiveInode,

    #[error("an inode cannot vote")]
    CannotVoteAsInode,

    #[error("voting weight must be greater than 0 and at most {0} uPow")]
    InvalidVotingRange(u64),

    #[error("no voting power outputs available")]
    NoVotingPower,

    #[error("insufficient voting power: required {required}, available {available}")]
    InsufficientVotingPower { required: BigUint, available: BigUint },

    #[error("delegate ballot exceeds the {0} uPow cap")]
    VotingPowerExceeded(u64),

    #[error("no ballot found toward that address")]
    NotVoted,
}
