use sealbid_types::{
    Amount, Phase, ERROR_ALREADY_REVEALED, ERROR_ALREADY_SETTLED, ERROR_BIDDER_LIMIT,
    ERROR_DEPOSIT_TOO_LOW, ERROR_EMPTY_SECRET, ERROR_INVALID_CONFIG, ERROR_INVALID_PHASE,
    ERROR_NOTHING_TO_WITHDRAW, ERROR_NO_SUCH_COMMITMENT, ERROR_OVERFLOW, ERROR_SECRET_TOO_LONG,
    ERROR_STATE, ERROR_TERMINAL_PHASE, ERROR_TRANSFER_FAILURE,
};
use thiserror::Error;

use crate::{config::ConfigError, phase::Operation, treasury::TransferError};

/// Every way an auction operation can be refused. A refused operation leaves state untouched.
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("{operation} is not allowed in phase {phase:?}")]
    InvalidPhase { operation: Operation, phase: Phase },
    #[error("bidder has no commitment")]
    NoSuchCommitment,
    #[error("auction is already in its terminal phase")]
    TerminalPhase,
    #[error("auction has already been settled")]
    AlreadySettled,
    #[error("nothing to withdraw")]
    NothingToWithdraw,
    #[error("transfer failed: {0}")]
    TransferFailure(#[from] TransferError),
    #[error("commitment has already been revealed")]
    AlreadyRevealed,
    #[error("secret must not be empty")]
    EmptySecret,
    #[error("secret is {len} bytes (max {max})")]
    SecretTooLong { len: usize, max: usize },
    #[error("deposit {deposit} is below the minimum {min}")]
    DepositTooLow { deposit: Amount, min: Amount },
    #[error("bidder limit of {max} reached")]
    BidderLimit { max: usize },
    #[error("amount overflow")]
    Overflow,
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("state error: {0}")]
    State(#[from] anyhow::Error),
}

impl AuctionError {
    /// Stable code reported to clients.
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidPhase { .. } => ERROR_INVALID_PHASE,
            Self::NoSuchCommitment => ERROR_NO_SUCH_COMMITMENT,
            Self::TerminalPhase => ERROR_TERMINAL_PHASE,
            Self::AlreadySettled => ERROR_ALREADY_SETTLED,
            Self::NothingToWithdraw => ERROR_NOTHING_TO_WITHDRAW,
            Self::TransferFailure(_) => ERROR_TRANSFER_FAILURE,
            Self::AlreadyRevealed => ERROR_ALREADY_REVEALED,
            Self::EmptySecret => ERROR_EMPTY_SECRET,
            Self::SecretTooLong { .. } => ERROR_SECRET_TOO_LONG,
            Self::DepositTooLow { .. } => ERROR_DEPOSIT_TOO_LOW,
            Self::BidderLimit { .. } => ERROR_BIDDER_LIMIT,
            Self::Overflow => ERROR_OVERFLOW,
            Self::Config(_) => ERROR_INVALID_CONFIG,
            Self::State(_) => ERROR_STATE,
        }
    }
}
