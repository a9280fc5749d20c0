use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use sealbid_types::Amount;
use std::collections::HashMap;

use crate::treasury::{TransferError, Treasury};

/// Creates an account keypair for Ed25519 signatures used by bidders
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

/// In-memory [`Treasury`] with scripted balances and injectable failures.
#[derive(Default, Debug, Clone)]
pub struct MockTreasury {
    balances: HashMap<PublicKey, Amount>,
    custody: Amount,
    fail_escrows: usize,
    fail_payouts: usize,
    payouts: Vec<(PublicKey, Amount)>,
}

impl MockTreasury {
    pub fn fund(&mut self, account: &PublicKey, amount: Amount) {
        *self.balances.entry(account.clone()).or_default() += amount;
    }

    pub fn balance(&self, account: &PublicKey) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Value currently escrowed by the auction.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    /// Every successful payout, in order.
    pub fn payouts(&self) -> &[(PublicKey, Amount)] {
        &self.payouts
    }

    /// Reject the next `count` escrows.
    pub fn fail_next_escrows(&mut self, count: usize) {
        self.fail_escrows = count;
    }

    /// Reject the next `count` payouts.
    pub fn fail_next_payouts(&mut self, count: usize) {
        self.fail_payouts = count;
    }
}

impl Treasury for MockTreasury {
    fn escrow(&mut self, from: &PublicKey, amount: Amount) -> Result<(), TransferError> {
        if self.fail_escrows > 0 {
            self.fail_escrows -= 1;
            return Err(TransferError::Rejected("injected escrow failure".to_string()));
        }
        let available = self.balance(from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                available,
                required: amount,
            });
        }
        self.balances.insert(from.clone(), available - amount);
        self.custody += amount;
        Ok(())
    }

    fn payout(&mut self, to: &PublicKey, amount: Amount) -> Result<(), TransferError> {
        if self.fail_payouts > 0 {
            self.fail_payouts -= 1;
            return Err(TransferError::Rejected("injected payout failure".to_string()));
        }
        if self.custody < amount {
            return Err(TransferError::InsufficientFunds {
                available: self.custody,
                required: amount,
            });
        }
        self.custody -= amount;
        *self.balances.entry(to.clone()).or_default() += amount;
        self.payouts.push((to.clone(), amount));
        Ok(())
    }
}
