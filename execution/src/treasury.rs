use commonware_cryptography::ed25519::PublicKey;
use sealbid_types::Amount;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds (available={available}, required={required})")]
    InsufficientFunds { available: Amount, required: Amount },
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Moves value between bidders and the auction's custody.
///
/// `escrow` pulls a deposit from a bidder when they commit; `payout` returns a refund.
/// Both must either move the full amount or leave balances untouched.
pub trait Treasury {
    fn escrow(&mut self, from: &PublicKey, amount: Amount) -> Result<(), TransferError>;
    fn payout(&mut self, to: &PublicKey, amount: Amount) -> Result<(), TransferError>;
}

impl<T: Treasury + ?Sized> Treasury for &mut T {
    fn escrow(&mut self, from: &PublicKey, amount: Amount) -> Result<(), TransferError> {
        (**self).escrow(from, amount)
    }

    fn payout(&mut self, to: &PublicKey, amount: Amount) -> Result<(), TransferError> {
        (**self).payout(to, amount)
    }
}
