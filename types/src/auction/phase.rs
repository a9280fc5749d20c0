use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

/// Auction lifecycle phase.
///
/// The discriminant is the stable phase id (0-4) exposed to clients.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Phase {
    #[default]
    AuctionInit = 0,
    BiddingStarted = 1,
    RevealStarted = 2,
    AuctionDone = 3,
    AuctionEnded = 4,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 5] = [
        Phase::AuctionInit,
        Phase::BiddingStarted,
        Phase::RevealStarted,
        Phase::AuctionDone,
        Phase::AuctionEnded,
    ];

    /// Stable ordinal of the phase.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The phase that follows this one, or `None` for the terminal phase.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::AuctionInit => Some(Phase::BiddingStarted),
            Phase::BiddingStarted => Some(Phase::RevealStarted),
            Phase::RevealStarted => Some(Phase::AuctionDone),
            Phase::AuctionDone => Some(Phase::AuctionEnded),
            Phase::AuctionEnded => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::AuctionEnded)
    }
}

impl TryFrom<u8> for Phase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Phase::AuctionInit),
            1 => Ok(Phase::BiddingStarted),
            2 => Ok(Phase::RevealStarted),
            3 => Ok(Phase::AuctionDone),
            4 => Ok(Phase::AuctionEnded),
            _ => Err(()),
        }
    }
}

impl Write for Phase {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Phase {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Phase::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for Phase {
    const SIZE: usize = 1;
}
