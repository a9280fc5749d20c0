//! Common types used throughout sealbid.
//!
//! The [`auction`] module holds the per-auction state records (phase, commitments, reveal
//! status, summary) and [`execution`] holds the instruction/key/value/event vocabulary the
//! execution layer speaks. Every type has a `commonware-codec` encoding so state can be
//! persisted by, and events streamed to, an external ledger.

pub mod auction;
pub mod execution;

pub use auction::*;
pub use execution::{Event, Instruction, Key, Value};
