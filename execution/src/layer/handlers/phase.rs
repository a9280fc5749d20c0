use super::*;

use sealbid_types::Phase;
use tracing::info;

use crate::{
    phase::{ensure_allowed, next_phase, Operation},
    state::load_summary,
};

impl<'a, S: State> Layer<'a, S> {
    pub(crate) fn handle_advance_phase(&mut self) -> Result<Vec<Event>, AuctionError> {
        let mut summary = load_summary(self)?;
        let from = summary.phase;
        let to = next_phase(from)?;

        // Leaving `AuctionDone` always goes through settlement.
        if from == Phase::AuctionDone {
            return self.settle(summary);
        }

        summary.phase = to;
        self.insert(Key::Auction, Value::Auction(summary));
        info!(?from, ?to, "phase advanced");
        Ok(vec![Event::PhaseAdvanced { from, to }])
    }

    pub(crate) fn handle_auction_end(&mut self) -> Result<Vec<Event>, AuctionError> {
        let summary = load_summary(self)?;
        if summary.ended {
            return Err(AuctionError::AlreadySettled);
        }
        ensure_allowed(Operation::AuctionEnd, summary.phase)?;
        self.settle(summary)
    }
}
