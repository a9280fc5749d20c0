use super::*;

use commonware_cryptography::sha256::Digest;
use sealbid_types::{Amount, BidRecord, Commitment, InvalidReveal, RevealStatus, MAX_BIDDERS};
use tracing::warn;

use crate::{
    commitment::{validate_secret, verify},
    phase::{ensure_allowed, Operation},
    state::{load_bid, load_registry, load_summary},
};

impl<'a, S: State> Layer<'a, S> {
    // === Bid Ledger Handlers ===

    pub(in crate::layer) fn handle_bid(
        &mut self,
        bidder: &PublicKey,
        digest: &Digest,
        deposit: Amount,
    ) -> Result<Vec<Event>, AuctionError> {
        let mut summary = load_summary(self)?;
        ensure_allowed(Operation::Bid, summary.phase)?;
        if deposit < self.config.min_deposit {
            return Err(AuctionError::DepositTooLow {
                deposit,
                min: self.config.min_deposit,
            });
        }

        // A re-bid replaces the digest in place and keeps the earlier deposit bonded.
        let prior = load_bid(self, bidder)?;
        let total_deposit = match &prior {
            Some(record) => record
                .commitment
                .deposit
                .checked_add(deposit)
                .ok_or(AuctionError::Overflow)?,
            None => deposit,
        };
        summary.total_deposits = summary
            .total_deposits
            .checked_add(deposit)
            .ok_or(AuctionError::Overflow)?;

        if prior.is_none() {
            let mut registry = load_registry(self)?;
            if registry.len() >= MAX_BIDDERS {
                return Err(AuctionError::BidderLimit { max: MAX_BIDDERS });
            }
            registry.insert(bidder);
            self.insert(Key::BidderRegistry, Value::BidderRegistry(registry));
        }

        let record = BidRecord::new(Commitment {
            digest: *digest,
            deposit: total_deposit,
        });
        self.insert(Key::Bid(bidder.clone()), Value::Bid(record));
        self.insert(Key::Auction, Value::Auction(summary));

        debug!(
            bidder = ?bidder,
            digest = ?digest,
            replaced = prior.is_some(),
            "bid committed"
        );
        Ok(vec![Event::BidPlaced {
            bidder: bidder.clone(),
            digest: *digest,
            deposit,
            total_deposit,
        }])
    }

    pub(in crate::layer) fn handle_reveal(
        &mut self,
        bidder: &PublicKey,
        amount: Amount,
        secret: &[u8],
    ) -> Result<Vec<Event>, AuctionError> {
        let mut summary = load_summary(self)?;
        ensure_allowed(Operation::Reveal, summary.phase)?;
        let mut record = load_bid(self, bidder)?.ok_or(AuctionError::NoSuchCommitment)?;
        if record.reveal.is_revealed() {
            return Err(AuctionError::AlreadyRevealed);
        }
        validate_secret(secret, self.config.max_secret_len).map_err(secret_error)?;

        let order = summary.reveal_count;
        summary.reveal_count = order.checked_add(1).ok_or(AuctionError::Overflow)?;

        let rejection = if !verify(&record.commitment.digest, amount, secret) {
            Some(InvalidReveal::DigestMismatch)
        } else if amount > record.commitment.deposit {
            Some(InvalidReveal::ExceedsDeposit)
        } else {
            None
        };

        let event = match rejection {
            Some(reason) => {
                record.reveal = RevealStatus::Invalid { reason, order };
                warn!(bidder = ?bidder, ?reason, order, "reveal rejected");
                Event::RevealRejected {
                    bidder: bidder.clone(),
                    reason,
                    order,
                }
            }
            None => {
                record.reveal = RevealStatus::Valid { amount, order };
                // Strictly greater replaces the leader, so the earliest of equal reveals keeps it.
                if amount > summary.highest_bid {
                    summary.second_highest_bid = summary.highest_bid;
                    summary.highest_bid = amount;
                    summary.highest_bidder = Some(bidder.clone());
                } else if amount > summary.second_highest_bid {
                    summary.second_highest_bid = amount;
                }
                debug!(bidder = ?bidder, amount, order, "bid revealed");
                Event::BidRevealed {
                    bidder: bidder.clone(),
                    amount,
                    order,
                }
            }
        };

        self.insert(Key::Bid(bidder.clone()), Value::Bid(record));
        self.insert(Key::Auction, Value::Auction(summary));
        Ok(vec![event])
    }
}
