//! Sealbid execution layer.
//!
//! This crate holds the sealed-bid auction engine: the commitment codec, the phase guards,
//! the staged [`Layer`] that executes instructions over a [`State`] store, and the
//! [`Auction`] composition root that applies each staged batch and moves funds through a
//! [`Treasury`].
//!
//! ## Invariants
//! - The phase never regresses and settlement runs at most once.
//! - Bid amounts and secrets never reach logs or state before they are revealed; only
//!   digests and deposits do.
//! - A refused or rolled-back operation leaves the store exactly as it found it.
//!
//! ```rust,ignore
//! use sealbid_execution::{commitment::commit, mocks::MockTreasury, Auction, AuctionConfig, Memory};
//!
//! let mut auction = Auction::new(Memory::default(), MockTreasury::default(), AuctionConfig::default())?;
//! auction.advance_phase()?;
//! auction.bid(&alice, commit(100, b"alice-secret"), 150)?;
//! ```

pub mod commitment;
pub mod config;
pub mod phase;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod engine;
mod error;
mod layer;
mod state;
mod treasury;

#[cfg(test)]
mod property_tests;

pub use commitment::{commit, verify, CommitmentError, SealedBid};
pub use config::{AuctionConfig, ConfigError};
pub use engine::{Auction, AuctionSnapshot, BidReceipt, RevealOutcome, SharedAuction};
pub use error::AuctionError;
pub use layer::{select_winner, Layer};
pub use phase::Operation;
pub use state::{Memory, State, Status};
pub use treasury::{TransferError, Treasury};
