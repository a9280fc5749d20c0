use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};

use crate::auction::{
    Amount, AuctionSummary, BidRecord, BidderRegistry, InvalidReveal, Phase, MAX_SECRET_LENGTH,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Commit to a sealed bid, escrowing `deposit`.
    /// Binary: [0] [digest:32] [deposit:u64 BE]
    Bid { digest: Digest, deposit: Amount },

    /// Open a previously committed bid.
    /// Binary: [1] [amount:u64 BE] [secretLen:varint] [secret...]
    Reveal { amount: Amount, secret: Vec<u8> },

    /// Move the auction to its next phase (settles when leaving `AuctionDone`).
    /// Binary: [2]
    AdvancePhase,

    /// Settle the auction.
    /// Binary: [3]
    AuctionEnd,

    /// Pay out the caller's pending refund.
    /// Binary: [4]
    Withdraw,
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Bid { digest, deposit } => {
                0u8.write(writer);
                digest.write(writer);
                deposit.write(writer);
            }
            Self::Reveal { amount, secret } => {
                1u8.write(writer);
                amount.write(writer);
                secret.write(writer);
            }
            Self::AdvancePhase => 2u8.write(writer),
            Self::AuctionEnd => 3u8.write(writer),
            Self::Withdraw => 4u8.write(writer),
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            0 => Self::Bid {
                digest: Digest::read(reader)?,
                deposit: u64::read(reader)?,
            },
            1 => Self::Reveal {
                amount: u64::read(reader)?,
                secret: Vec::<u8>::read_range(reader, 0..=MAX_SECRET_LENGTH)?,
            },
            2 => Self::AdvancePhase,
            3 => Self::AuctionEnd,
            4 => Self::Withdraw,
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Bid { digest, deposit } => digest.encode_size() + deposit.encode_size(),
                Self::Reveal { amount, secret } => amount.encode_size() + secret.encode_size(),
                Self::AdvancePhase | Self::AuctionEnd | Self::Withdraw => 0,
            }
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Auction-wide summary (tag 0)
    Auction,
    /// Per-bidder commitment and reveal (tag 1)
    Bid(PublicKey),
    /// Per-bidder refundable balance (tag 2)
    PendingReturn(PublicKey),
    /// Everyone who has bid (tag 3)
    BidderRegistry,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Auction => 0u8.write(writer),
            Self::Bid(pk) => {
                1u8.write(writer);
                pk.write(writer);
            }
            Self::PendingReturn(pk) => {
                2u8.write(writer);
                pk.write(writer);
            }
            Self::BidderRegistry => 3u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Auction,
            1 => Self::Bid(PublicKey::read(reader)?),
            2 => Self::PendingReturn(PublicKey::read(reader)?),
            3 => Self::BidderRegistry,
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Auction | Self::BidderRegistry => 0,
                Self::Bid(_) | Self::PendingReturn(_) => PublicKey::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    Auction(AuctionSummary),
    Bid(BidRecord),
    PendingReturn(Amount),
    BidderRegistry(BidderRegistry),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Auction(summary) => {
                0u8.write(writer);
                summary.write(writer);
            }
            Self::Bid(record) => {
                1u8.write(writer);
                record.write(writer);
            }
            Self::PendingReturn(amount) => {
                2u8.write(writer);
                amount.write(writer);
            }
            Self::BidderRegistry(registry) => {
                3u8.write(writer);
                registry.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Auction(AuctionSummary::read(reader)?),
            1 => Self::Bid(BidRecord::read(reader)?),
            2 => Self::PendingReturn(u64::read(reader)?),
            3 => Self::BidderRegistry(BidderRegistry::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Auction(summary) => summary.encode_size(),
                Self::Bid(record) => record.encode_size(),
                Self::PendingReturn(amount) => amount.encode_size(),
                Self::BidderRegistry(registry) => registry.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PhaseAdvanced {
        from: Phase,
        to: Phase,
    },
    BidPlaced {
        bidder: PublicKey,
        digest: Digest,
        deposit: Amount,
        /// Deposit backing the live commitment after this bid.
        total_deposit: Amount,
    },
    BidRevealed {
        bidder: PublicKey,
        amount: Amount,
        order: u64,
    },
    RevealRejected {
        bidder: PublicKey,
        reason: InvalidReveal,
        order: u64,
    },
    RefundQueued {
        bidder: PublicKey,
        amount: Amount,
    },
    AuctionSettled {
        winner: Option<PublicKey>,
        winning_amount: Amount,
        second_highest_bid: Amount,
        retained: Amount,
    },
    Withdrawn {
        bidder: PublicKey,
        amount: Amount,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::PhaseAdvanced { from, to } => {
                0u8.write(writer);
                from.write(writer);
                to.write(writer);
            }
            Self::BidPlaced {
                bidder,
                digest,
                deposit,
                total_deposit,
            } => {
                1u8.write(writer);
                bidder.write(writer);
                digest.write(writer);
                deposit.write(writer);
                total_deposit.write(writer);
            }
            Self::BidRevealed {
                bidder,
                amount,
                order,
            } => {
                2u8.write(writer);
                bidder.write(writer);
                amount.write(writer);
                order.write(writer);
            }
            Self::RevealRejected {
                bidder,
                reason,
                order,
            } => {
                3u8.write(writer);
                bidder.write(writer);
                reason.write(writer);
                order.write(writer);
            }
            Self::RefundQueued { bidder, amount } => {
                4u8.write(writer);
                bidder.write(writer);
                amount.write(writer);
            }
            Self::AuctionSettled {
                winner,
                winning_amount,
                second_highest_bid,
                retained,
            } => {
                5u8.write(writer);
                winner.write(writer);
                winning_amount.write(writer);
                second_highest_bid.write(writer);
                retained.write(writer);
            }
            Self::Withdrawn { bidder, amount } => {
                6u8.write(writer);
                bidder.write(writer);
                amount.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            0 => Self::PhaseAdvanced {
                from: Phase::read(reader)?,
                to: Phase::read(reader)?,
            },
            1 => Self::BidPlaced {
                bidder: PublicKey::read(reader)?,
                digest: Digest::read(reader)?,
                deposit: u64::read(reader)?,
                total_deposit: u64::read(reader)?,
            },
            2 => Self::BidRevealed {
                bidder: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                order: u64::read(reader)?,
            },
            3 => Self::RevealRejected {
                bidder: PublicKey::read(reader)?,
                reason: InvalidReveal::read(reader)?,
                order: u64::read(reader)?,
            },
            4 => Self::RefundQueued {
                bidder: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            5 => Self::AuctionSettled {
                winner: Option::<PublicKey>::read(reader)?,
                winning_amount: u64::read(reader)?,
                second_highest_bid: u64::read(reader)?,
                retained: u64::read(reader)?,
            },
            6 => Self::Withdrawn {
                bidder: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::PhaseAdvanced { .. } => Phase::SIZE + Phase::SIZE,
                Self::BidPlaced { .. } => {
                    PublicKey::SIZE + Digest::SIZE + u64::SIZE + u64::SIZE
                }
                Self::BidRevealed { .. } => PublicKey::SIZE + u64::SIZE + u64::SIZE,
                Self::RevealRejected { .. } => {
                    PublicKey::SIZE + InvalidReveal::SIZE + u64::SIZE
                }
                Self::RefundQueued { .. } | Self::Withdrawn { .. } => PublicKey::SIZE + u64::SIZE,
                Self::AuctionSettled { winner, .. } => {
                    winner.encode_size() + u64::SIZE + u64::SIZE + u64::SIZE
                }
            }
    }
}
