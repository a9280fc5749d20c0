use super::*;

use anyhow::anyhow;
use sealbid_types::{Amount, AuctionSummary, BidRecord, Phase, RevealStatus};
use std::cmp::Reverse;
use tracing::info;

use crate::{
    phase::{ensure_allowed, Operation},
    state::{load_bid, load_pending_return, load_registry, load_summary},
};

/// Winner among the valid reveals: the strictly largest positive amount, with the earliest
/// reveal taking ties.
pub fn select_winner<'r, I>(records: I) -> Option<(PublicKey, Amount)>
where
    I: IntoIterator<Item = (&'r PublicKey, &'r BidRecord)>,
{
    records
        .into_iter()
        .filter_map(|(bidder, record)| match record.reveal {
            RevealStatus::Valid { amount, order } if amount > 0 => Some((bidder, amount, order)),
            _ => None,
        })
        .max_by_key(|(_, amount, order)| (*amount, Reverse(*order)))
        .map(|(bidder, amount, _)| (bidder.clone(), amount))
}

impl<'a, S: State> Layer<'a, S> {
    // === Settlement Handlers ===

    /// Queue every refund and close the auction. Callers guarantee it runs at most once.
    pub(in crate::layer) fn settle(
        &mut self,
        mut summary: AuctionSummary,
    ) -> Result<Vec<Event>, AuctionError> {
        let registry = load_registry(self)?;
        let mut records = Vec::with_capacity(registry.len());
        for bidder in registry.bidders {
            let record = load_bid(self, &bidder)?
                .ok_or_else(|| anyhow!("registered bidder {bidder:?} has no commitment"))?;
            records.push((bidder, record));
        }

        let leader = summary.highest_bidder.clone().map(|bidder| (bidder, summary.highest_bid));
        let winner = select_winner(records.iter().map(|(bidder, record)| (bidder, record)));
        if winner != leader {
            return Err(AuctionError::State(anyhow!(
                "recorded leader disagrees with revealed bids"
            )));
        }

        let mut retained = summary.highest_bid;
        let mut events = Vec::new();
        for (bidder, record) in &records {
            let deposit = record.commitment.deposit;
            let refund = if summary.highest_bidder.as_ref() == Some(bidder) {
                deposit
                    .checked_sub(summary.highest_bid)
                    .ok_or(AuctionError::Overflow)?
            } else if self.config.forfeit_unrevealed && !record.reveal.is_revealed() {
                retained = retained.checked_add(deposit).ok_or(AuctionError::Overflow)?;
                0
            } else {
                deposit
            };
            if refund == 0 {
                continue;
            }

            let balance = load_pending_return(self, bidder)?
                .checked_add(refund)
                .ok_or(AuctionError::Overflow)?;
            self.insert(
                Key::PendingReturn(bidder.clone()),
                Value::PendingReturn(balance),
            );
            events.push(Event::RefundQueued {
                bidder: bidder.clone(),
                amount: refund,
            });
        }

        let from = summary.phase;
        summary.phase = Phase::AuctionEnded;
        summary.ended = true;
        summary.retained = retained;
        summary
            .validate_invariants()
            .map_err(|err| AuctionError::State(err.into()))?;

        info!(
            winner = ?summary.highest_bidder,
            winning_amount = summary.highest_bid,
            second_highest_bid = summary.second_highest_bid,
            retained,
            refunds = events.len(),
            "auction settled"
        );
        events.push(Event::PhaseAdvanced {
            from,
            to: Phase::AuctionEnded,
        });
        events.push(Event::AuctionSettled {
            winner: summary.highest_bidder.clone(),
            winning_amount: summary.highest_bid,
            second_highest_bid: summary.second_highest_bid,
            retained,
        });
        self.insert(Key::Auction, Value::Auction(summary));
        Ok(events)
    }

    pub(in crate::layer) fn handle_withdraw(
        &mut self,
        bidder: &PublicKey,
    ) -> Result<Vec<Event>, AuctionError> {
        let mut summary = load_summary(self)?;
        ensure_allowed(Operation::Withdraw, summary.phase)?;
        let amount = load_pending_return(self, bidder)?;
        if amount == 0 {
            return Err(AuctionError::NothingToWithdraw);
        }

        // Zero the balance here; the payout only happens after this batch is applied.
        summary.total_withdrawn = summary
            .total_withdrawn
            .checked_add(amount)
            .ok_or(AuctionError::Overflow)?;
        self.remove(Key::PendingReturn(bidder.clone()));
        self.insert(Key::Auction, Value::Auction(summary));

        debug!(bidder = ?bidder, amount, "withdrawal staged");
        Ok(vec![Event::Withdrawn {
            bidder: bidder.clone(),
            amount,
        }])
    }
}
