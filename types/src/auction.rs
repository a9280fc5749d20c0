//! Auction domain types.
//!
//! Defines the phase enumeration, bidder commitments and reveal records, the auction summary and
//! the settlement result used by the execution layer and clients.

mod bid;
mod constants;
mod phase;
mod summary;

pub use bid::*;
pub use constants::*;
pub use phase::*;
pub use summary::*;

/// Value denomination used for deposits, bids and refunds.
pub type Amount = u64;

#[cfg(test)]
mod tests;
