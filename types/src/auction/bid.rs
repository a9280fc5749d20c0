use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::sha256::Digest;

use super::Amount;

/// A sealed bid: the binding digest plus the deposit bonding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    pub digest: Digest,
    pub deposit: Amount,
}

impl Write for Commitment {
    fn write(&self, writer: &mut impl BufMut) {
        self.digest.write(writer);
        self.deposit.write(writer);
    }
}

impl Read for Commitment {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            digest: Digest::read(reader)?,
            deposit: u64::read(reader)?,
        })
    }
}

impl FixedSize for Commitment {
    const SIZE: usize = Digest::SIZE + u64::SIZE;
}

/// Why a reveal was not honored.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvalidReveal {
    /// `commit(amount, secret)` did not reproduce the stored digest.
    DigestMismatch = 0,
    /// The revealed amount is larger than the deposit backing it.
    ExceedsDeposit = 1,
}

impl Write for InvalidReveal {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for InvalidReveal {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::DigestMismatch),
            1 => Ok(Self::ExceedsDeposit),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for InvalidReveal {
    const SIZE: usize = 1;
}

/// Reveal state of a commitment.
///
/// `order` is the position of the reveal among all reveals of the auction and
/// breaks ties between equal amounts (lower wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RevealStatus {
    #[default]
    Pending,
    Valid {
        amount: Amount,
        order: u64,
    },
    Invalid {
        reason: InvalidReveal,
        order: u64,
    },
}

impl RevealStatus {
    pub fn is_revealed(&self) -> bool {
        !matches!(self, RevealStatus::Pending)
    }
}

impl Write for RevealStatus {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Pending => 0u8.write(writer),
            Self::Valid { amount, order } => {
                1u8.write(writer);
                amount.write(writer);
                order.write(writer);
            }
            Self::Invalid { reason, order } => {
                2u8.write(writer);
                reason.write(writer);
                order.write(writer);
            }
        }
    }
}

impl Read for RevealStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let status = match u8::read(reader)? {
            0 => Self::Pending,
            1 => Self::Valid {
                amount: u64::read(reader)?,
                order: u64::read(reader)?,
            },
            2 => Self::Invalid {
                reason: InvalidReveal::read(reader)?,
                order: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(status)
    }
}

impl EncodeSize for RevealStatus {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Pending => 0,
                Self::Valid { .. } => u64::SIZE + u64::SIZE,
                Self::Invalid { .. } => InvalidReveal::SIZE + u64::SIZE,
            }
    }
}

/// Everything the ledger knows about one bidder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidRecord {
    pub commitment: Commitment,
    pub reveal: RevealStatus,
}

impl BidRecord {
    pub fn new(commitment: Commitment) -> Self {
        Self {
            commitment,
            reveal: RevealStatus::Pending,
        }
    }

    /// Amount of a valid reveal, if any.
    pub fn revealed_amount(&self) -> Option<Amount> {
        match self.reveal {
            RevealStatus::Valid { amount, .. } => Some(amount),
            _ => None,
        }
    }
}

impl Write for BidRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.commitment.write(writer);
        self.reveal.write(writer);
    }
}

impl Read for BidRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            commitment: Commitment::read(reader)?,
            reveal: RevealStatus::read(reader)?,
        })
    }
}

impl EncodeSize for BidRecord {
    fn encode_size(&self) -> usize {
        self.commitment.encode_size() + self.reveal.encode_size()
    }
}
