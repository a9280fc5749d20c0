use anyhow::{anyhow, Context as _};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use sealbid_types::{
    execution::{Event, Instruction, Key, Value},
    Amount, AuctionSummary, BidRecord, InvalidReveal, Phase, RevealStatus, Settlement,
};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::{
    config::AuctionConfig,
    layer::Layer,
    state::{load_bid, load_pending_return, load_registry, load_summary, undo_log, State},
    treasury::{TransferError, Treasury},
    AuctionError,
};

/// Returned by [`Auction::bid`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidReceipt {
    pub digest: Digest,
    /// Deposit escrowed by this call.
    pub deposit: Amount,
    /// Deposit now bonding the bidder's commitment.
    pub total_deposit: Amount,
}

/// Returned by [`Auction::reveal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    Valid { amount: Amount, order: u64 },
    Invalid { reason: InvalidReveal, order: u64 },
}

impl RevealOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, RevealOutcome::Valid { .. })
    }
}

/// Consistent copy of everything the auction stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuctionSnapshot {
    pub summary: AuctionSummary,
    /// Ordered by bidder.
    pub bids: Vec<(PublicKey, BidRecord)>,
    /// Ordered by bidder; zero balances are omitted.
    pub pending_returns: Vec<(PublicKey, Amount)>,
}

impl AuctionSnapshot {
    pub fn total_pending(&self) -> u128 {
        self.pending_returns
            .iter()
            .map(|(_, amount)| *amount as u128)
            .sum()
    }

    /// Checks that every escrowed unit is accounted for.
    ///
    /// After settlement `deposits == retained + pending + withdrawn`; before it nothing is
    /// retained or owed.
    pub fn is_conserved(&self) -> bool {
        let summary = &self.summary;
        if !summary.ended {
            return summary.retained == 0 && self.pending_returns.is_empty();
        }
        let accounted = summary.retained as u128
            + self.total_pending()
            + summary.total_withdrawn as u128;
        accounted == summary.total_deposits as u128
    }
}

/// A single sealed-bid auction over a [`State`] store and a [`Treasury`].
///
/// Every mutating call stages its writes in a [`Layer`], applies them as one batch and only
/// then moves funds. If the treasury refuses, the batch is undone and the call fails with
/// [`AuctionError::TransferFailure`].
pub struct Auction<S: State, T: Treasury> {
    state: S,
    treasury: T,
    config: AuctionConfig,
    summary: AuctionSummary,
}

impl<S: State, T: Treasury> Auction<S, T> {
    /// Opens the auction stored in `state`, initializing it at `AuctionInit` if empty.
    pub fn new(mut state: S, treasury: T, config: AuctionConfig) -> Result<Self, AuctionError> {
        config.validate()?;
        let summary = match state.get(&Key::Auction)? {
            Some(Value::Auction(summary)) => summary,
            _ => {
                let summary = AuctionSummary::default();
                state.insert(Key::Auction, Value::Auction(summary.clone()))?;
                summary
            }
        };
        summary
            .validate_invariants()
            .context("stored auction summary is inconsistent")?;
        info!(phase = ?summary.phase, "auction opened");
        Ok(Self {
            state,
            treasury,
            config,
            summary,
        })
    }

    /// Executes `instruction` on behalf of `caller`.
    pub fn execute(
        &mut self,
        caller: &PublicKey,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, AuctionError> {
        self.transact(|layer| layer.execute(caller, instruction))
    }

    fn transact<F>(&mut self, op: F) -> Result<Vec<Event>, AuctionError>
    where
        F: FnOnce(&mut Layer<'_, S>) -> Result<Vec<Event>, AuctionError>,
    {
        let (events, changes) = {
            let mut layer = Layer::new(&self.state, &self.config);
            let events = op(&mut layer)?;
            (events, layer.commit())
        };

        let undo = undo_log(&self.state, &changes)?;
        self.state.apply(changes)?;
        if let Err(err) = self.transfer(&events) {
            warn!(error = %err, "transfer failed; rolling back");
            self.state
                .apply(undo)
                .context("failed to roll back after transfer failure")?;
            return Err(AuctionError::TransferFailure(err));
        }

        self.summary = load_summary(&self.state)?;
        Ok(events)
    }

    /// Moves the funds implied by freshly applied events.
    fn transfer(&mut self, events: &[Event]) -> Result<(), TransferError> {
        for event in events {
            match event {
                Event::BidPlaced {
                    bidder, deposit, ..
                } => self.treasury.escrow(bidder, *deposit)?,
                Event::Withdrawn { bidder, amount } => {
                    self.treasury.payout(bidder, *amount)?;
                    info!(bidder = ?bidder, amount, "withdrawal paid");
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn current_phase(&self) -> Phase {
        self.summary.phase
    }

    pub fn summary(&self) -> &AuctionSummary {
        &self.summary
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    /// Move one step along the phase order. Leaving `AuctionDone` settles the auction.
    pub fn advance_phase(&mut self) -> Result<Phase, AuctionError> {
        self.transact(|layer| layer.handle_advance_phase())?;
        Ok(self.summary.phase)
    }

    pub fn bid(
        &mut self,
        bidder: &PublicKey,
        digest: Digest,
        deposit: Amount,
    ) -> Result<BidReceipt, AuctionError> {
        let events = self.execute(bidder, &Instruction::Bid { digest, deposit })?;
        events
            .into_iter()
            .find_map(|event| match event {
                Event::BidPlaced {
                    digest,
                    deposit,
                    total_deposit,
                    ..
                } => Some(BidReceipt {
                    digest,
                    deposit,
                    total_deposit,
                }),
                _ => None,
            })
            .ok_or_else(|| AuctionError::State(anyhow!("bid produced no receipt")))
    }

    pub fn reveal(
        &mut self,
        bidder: &PublicKey,
        amount: Amount,
        secret: &[u8],
    ) -> Result<RevealOutcome, AuctionError> {
        let events = self.execute(
            bidder,
            &Instruction::Reveal {
                amount,
                secret: secret.to_vec(),
            },
        )?;
        events
            .into_iter()
            .find_map(|event| match event {
                Event::BidRevealed { amount, order, .. } => {
                    Some(RevealOutcome::Valid { amount, order })
                }
                Event::RevealRejected { reason, order, .. } => {
                    Some(RevealOutcome::Invalid { reason, order })
                }
                _ => None,
            })
            .ok_or_else(|| AuctionError::State(anyhow!("reveal produced no outcome")))
    }

    /// Settle the auction from `AuctionDone`.
    pub fn auction_end(&mut self) -> Result<Settlement, AuctionError> {
        self.transact(|layer| layer.handle_auction_end())?;
        Ok(Settlement {
            winner: self.summary.highest_bidder.clone(),
            winning_amount: self.summary.highest_bid,
            second_highest_bid: self.summary.second_highest_bid,
        })
    }

    /// Pay out the bidder's pending refund, returning the amount paid.
    pub fn withdraw(&mut self, bidder: &PublicKey) -> Result<Amount, AuctionError> {
        let events = self.execute(bidder, &Instruction::Withdraw)?;
        events
            .into_iter()
            .find_map(|event| match event {
                Event::Withdrawn { amount, .. } => Some(amount),
                _ => None,
            })
            .ok_or_else(|| AuctionError::State(anyhow!("withdraw produced no payout")))
    }

    pub fn bid_of(&self, bidder: &PublicKey) -> Result<Option<BidRecord>, AuctionError> {
        Ok(load_bid(&self.state, bidder)?)
    }

    /// The bidder's validly revealed amount, if any.
    pub fn revealed_of(&self, bidder: &PublicKey) -> Result<Option<Amount>, AuctionError> {
        Ok(self.bid_of(bidder)?.and_then(|record| record.revealed_amount()))
    }

    pub fn pending_return(&self, bidder: &PublicKey) -> Result<Amount, AuctionError> {
        Ok(load_pending_return(&self.state, bidder)?)
    }

    /// Deposit bonding each bidder's commitment, ordered by bidder.
    pub fn deposits(&self) -> Result<Vec<(PublicKey, Amount)>, AuctionError> {
        Ok(self
            .bids()?
            .into_iter()
            .map(|(bidder, record)| (bidder, record.commitment.deposit))
            .collect())
    }

    fn bids(&self) -> Result<Vec<(PublicKey, BidRecord)>, AuctionError> {
        let registry = load_registry(&self.state)?;
        let mut bids = Vec::with_capacity(registry.len());
        for bidder in registry.bidders {
            if let Some(record) = load_bid(&self.state, &bidder)? {
                bids.push((bidder, record));
            }
        }
        Ok(bids)
    }

    pub fn snapshot(&self) -> Result<AuctionSnapshot, AuctionError> {
        let bids = self.bids()?;
        let mut pending_returns = Vec::new();
        for (bidder, _) in &bids {
            let amount = load_pending_return(&self.state, bidder)?;
            if amount > 0 {
                pending_returns.push((bidder.clone(), amount));
            }
        }
        Ok(AuctionSnapshot {
            summary: self.summary.clone(),
            bids,
            pending_returns,
        })
    }

    /// Count of reveals still outstanding.
    pub fn unrevealed(&self) -> Result<usize, AuctionError> {
        Ok(self
            .bids()?
            .iter()
            .filter(|(_, record)| record.reveal == RevealStatus::Pending)
            .count())
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    pub fn treasury_mut(&mut self) -> &mut T {
        &mut self.treasury
    }
}

/// An [`Auction`] shared across threads.
///
/// Mutations take the write lock, so at most one runs at a time; reads take the read lock
/// and return owned copies.
pub struct SharedAuction<S: State, T: Treasury> {
    inner: Arc<RwLock<Auction<S, T>>>,
}

impl<S: State, T: Treasury> Clone for SharedAuction<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: State, T: Treasury> SharedAuction<S, T> {
    pub fn new(auction: Auction<S, T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(auction)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Auction<S, T>>, AuctionError> {
        self.inner
            .read()
            .map_err(|_| AuctionError::State(anyhow!("auction lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Auction<S, T>>, AuctionError> {
        self.inner
            .write()
            .map_err(|_| AuctionError::State(anyhow!("auction lock poisoned")))
    }

    pub fn execute(
        &self,
        caller: &PublicKey,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, AuctionError> {
        self.write()?.execute(caller, instruction)
    }

    pub fn advance_phase(&self) -> Result<Phase, AuctionError> {
        self.write()?.advance_phase()
    }

    pub fn bid(
        &self,
        bidder: &PublicKey,
        digest: Digest,
        deposit: Amount,
    ) -> Result<BidReceipt, AuctionError> {
        self.write()?.bid(bidder, digest, deposit)
    }

    pub fn reveal(
        &self,
        bidder: &PublicKey,
        amount: Amount,
        secret: &[u8],
    ) -> Result<RevealOutcome, AuctionError> {
        self.write()?.reveal(bidder, amount, secret)
    }

    pub fn auction_end(&self) -> Result<Settlement, AuctionError> {
        self.write()?.auction_end()
    }

    pub fn withdraw(&self, bidder: &PublicKey) -> Result<Amount, AuctionError> {
        self.write()?.withdraw(bidder)
    }

    pub fn current_phase(&self) -> Result<Phase, AuctionError> {
        Ok(self.read()?.current_phase())
    }

    pub fn summary(&self) -> Result<AuctionSummary, AuctionError> {
        Ok(self.read()?.summary().clone())
    }

    pub fn snapshot(&self) -> Result<AuctionSnapshot, AuctionError> {
        self.read()?.snapshot()
    }
}
