//! uPow network constants and the output-kind enumeration.

use serde::{Deserialize, Serialize};

/// Wire version byte at the head of every transaction record.
pub const TRANSACTION_VERSION: u8 = 3;

/// Maximum inputs in one record (the count travels as a single byte).
pub const MAX_TX_INPUTS: usize = 255;

/// Maximum outputs in one record.
pub const MAX_TX_OUTPUTS: usize = 255;

/// Maximum concurrently registered inodes on the network.
pub const MAX_INODES: usize = 12;

/// Flat fee in smallest units (0.0001 uPow). Added to the selection target
/// of a transfer for headroom; never deducted inside the codec.
pub const FIXED_FEE: u64 = 10_000;

/// Inode registration deposit, in whole uPow.
pub const INODE_DEPOSIT: u64 = 1_000;

/// Validator registration deposit, in whole uPow.
pub const VALIDATOR_DEPOSIT: u64 = 100;

/// Voting power granted on first stake (delegate) or validator
/// registration, in whole uPow.
pub const VOTING_POWER_GRANT: u64 = 10;

/// Upper bound of a single vote's weight, in whole uPow.
pub const VOTE_CAP: u64 = 10;

/// Marker messages the ledger expects on certain transaction kinds.
pub mod marker {
    pub const REGISTER_VALIDATOR: &str = "5";
    pub const VOTE_AS_VALIDATOR: &str = "6";
    pub const VOTE_AS_DELEGATE: &str = "7";
    pub const REVOKE_AS_VALIDATOR: &str = "8";
    pub const REVOKE_AS_DELEGATE: &str = "9";
}

/// Output type code.
///
/// Closed enumeration; the byte values are part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OutputKind {
    Regular = 0,
    Stake = 1,
    Unstake = 2,
    InodeDeposit = 3,
    InodeRefund = 4,
    ValidatorDeposit = 5,
    VoteValidator = 6,
    VoteDelegate = 7,
    VotingPowerValidator = 8,
    VotingPowerDelegate = 9,
}

impl OutputKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Regular),
            1 => Some(Self::Stake),
            2 => Some(Self::Unstake),
            3 => Some(Self::InodeDeposit),
            4 => Some(Self::InodeRefund),
            5 => Some(Self::ValidatorDeposit),
            6 => Some(Self::VoteValidator),
            7 => Some(Self::VoteDelegate),
            8 => Some(Self::VotingPowerValidator),
            9 => Some(Self::VotingPowerDelegate),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "REGULAR"),
            Self::Stake => write!(f, "STAKE"),
            Self::Unstake => write!(f, "UN_STAKE"),
            Self::InodeDeposit => write!(f, "INODE_REGISTRATION"),
            Self::InodeRefund => write!(f, "INODE_DE_REGISTRATION"),
            Self::ValidatorDeposit => write!(f, "VALIDATOR_REGISTRATION"),
            Self::VoteValidator => write!(f, "VOTE_AS_VALIDATOR"),
            Self::VoteDelegate => write!(f, "VOTE_AS_DELEGATE"),
            Self::VotingPowerValidator => write!(f, "VALIDATOR_VOTING_POWER"),
            Self::VotingPowerDelegate => write!(f, "DELEGATE_VOTING_POWER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_roundtrip() {
        for v in 0..=9u8 {
            let kind = OutputKind::from_u8(v).unwrap();
            assert_eq!(kind as u8, v);
        }
        assert!(OutputKind::from_u8(10).is_none());
        assert!(OutputKind::from_u8(255).is_none());
    }

    #[test]
    fn test_output_kind_display() {
        assert_eq!(OutputKind::Regular.to_string(), "REGULAR");
        assert_eq!(OutputKind::Unstake.to_string(), "UN_STAKE");
        assert_eq!(OutputKind::VoteDelegate.to_string(), "VOTE_AS_DELEGATE");
    }

    #[test]
    fn test_fixed_parameters() {
        assert_eq!(FIXED_FEE, 10_000);
        assert_eq!(MAX_TX_INPUTS, 255);
        assert_eq!(MAX_INODES, 12);
        assert!(INODE_DEPOSIT > VALIDATOR_DEPOSIT);
    }
}
