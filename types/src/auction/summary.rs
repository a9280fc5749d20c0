use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use thiserror::Error as ThisError;

use super::{Amount, Phase, MAX_BIDDERS};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum SummaryInvariantError {
    #[error("ended flag ({ended}) disagrees with phase {phase:?}")]
    EndedPhaseMismatch { ended: bool, phase: Phase },
    #[error("highest bid {highest_bid} recorded without a highest bidder")]
    OrphanHighestBid { highest_bid: Amount },
    #[error("second highest bid {second} exceeds highest bid {highest}")]
    SecondAboveHighest { second: Amount, highest: Amount },
    #[error("value outflow (retained={retained}, withdrawn={withdrawn}) exceeds deposits {deposits}")]
    OutflowExceedsDeposits {
        retained: Amount,
        withdrawn: Amount,
        deposits: Amount,
    },
}

/// Auction-wide scalar state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuctionSummary {
    pub phase: Phase,
    pub highest_bidder: Option<PublicKey>,
    pub highest_bid: Amount,
    pub second_highest_bid: Amount,
    pub ended: bool,
    /// Number of reveals processed so far (valid or not).
    pub reveal_count: u64,
    /// Sum of every deposit escrowed by the auction.
    pub total_deposits: Amount,
    /// Value kept by the auction at settlement (the winning bid plus any forfeits).
    pub retained: Amount,
    /// Sum of every refund paid out by `withdraw`.
    pub total_withdrawn: Amount,
}

impl AuctionSummary {
    pub fn validate_invariants(&self) -> Result<(), SummaryInvariantError> {
        if self.ended != self.phase.is_terminal() {
            return Err(SummaryInvariantError::EndedPhaseMismatch {
                ended: self.ended,
                phase: self.phase,
            });
        }
        if self.highest_bidder.is_none() && self.highest_bid != 0 {
            return Err(SummaryInvariantError::OrphanHighestBid {
                highest_bid: self.highest_bid,
            });
        }
        if self.second_highest_bid > self.highest_bid {
            return Err(SummaryInvariantError::SecondAboveHighest {
                second: self.second_highest_bid,
                highest: self.highest_bid,
            });
        }
        let outflow = self.retained.checked_add(self.total_withdrawn);
        if outflow.map_or(true, |outflow| outflow > self.total_deposits) {
            return Err(SummaryInvariantError::OutflowExceedsDeposits {
                retained: self.retained,
                withdrawn: self.total_withdrawn,
                deposits: self.total_deposits,
            });
        }
        Ok(())
    }

    /// Value currently held in custody by the auction.
    pub fn custody(&self) -> Amount {
        self.total_deposits.saturating_sub(self.total_withdrawn)
    }
}

impl Write for AuctionSummary {
    fn write(&self, writer: &mut impl BufMut) {
        self.phase.write(writer);
        self.highest_bidder.write(writer);
        self.highest_bid.write(writer);
        self.second_highest_bid.write(writer);
        self.ended.write(writer);
        self.reveal_count.write(writer);
        self.total_deposits.write(writer);
        self.retained.write(writer);
        self.total_withdrawn.write(writer);
    }
}

impl Read for AuctionSummary {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            phase: Phase::read(reader)?,
            highest_bidder: Option::<PublicKey>::read(reader)?,
            highest_bid: u64::read(reader)?,
            second_highest_bid: u64::read(reader)?,
            ended: bool::read(reader)?,
            reveal_count: u64::read(reader)?,
            total_deposits: u64::read(reader)?,
            retained: u64::read(reader)?,
            total_withdrawn: u64::read(reader)?,
        })
    }
}

impl EncodeSize for AuctionSummary {
    fn encode_size(&self) -> usize {
        self.phase.encode_size()
            + self.highest_bidder.encode_size()
            + self.highest_bid.encode_size()
            + self.second_highest_bid.encode_size()
            + self.ended.encode_size()
            + self.reveal_count.encode_size()
            + self.total_deposits.encode_size()
            + self.retained.encode_size()
            + self.total_withdrawn.encode_size()
    }
}

/// Outcome of settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// `None` when no bidder revealed validly.
    pub winner: Option<PublicKey>,
    pub winning_amount: Amount,
    pub second_highest_bid: Amount,
}

impl Write for Settlement {
    fn write(&self, writer: &mut impl BufMut) {
        self.winner.write(writer);
        self.winning_amount.write(writer);
        self.second_highest_bid.write(writer);
    }
}

impl Read for Settlement {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            winner: Option::<PublicKey>::read(reader)?,
            winning_amount: u64::read(reader)?,
            second_highest_bid: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Settlement {
    fn encode_size(&self) -> usize {
        self.winner.encode_size()
            + self.winning_amount.encode_size()
            + self.second_highest_bid.encode_size()
    }
}

/// Sorted, deduplicated list of everyone who has bid in the auction.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BidderRegistry {
    pub bidders: Vec<PublicKey>,
}

impl BidderRegistry {
    /// Adds a bidder, keeping the list sorted. Returns `false` if already present.
    pub fn insert(&mut self, bidder: &PublicKey) -> bool {
        match self.bidders.binary_search(bidder) {
            Ok(_) => false,
            Err(index) => {
                self.bidders.insert(index, bidder.clone());
                true
            }
        }
    }

    pub fn contains(&self, bidder: &PublicKey) -> bool {
        self.bidders.binary_search(bidder).is_ok()
    }

    pub fn len(&self) -> usize {
        self.bidders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bidders.is_empty()
    }
}

impl Write for BidderRegistry {
    fn write(&self, writer: &mut impl BufMut) {
        self.bidders.write(writer);
    }
}

impl Read for BidderRegistry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let bidders = Vec::<PublicKey>::read_range(reader, 0..=MAX_BIDDERS)?;
        if bidders.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::Invalid("BidderRegistry", "bidders not sorted"));
        }
        Ok(Self { bidders })
    }
}

impl EncodeSize for BidderRegistry {
    fn encode_size(&self) -> usize {
        self.bidders.encode_size()
    }
}
