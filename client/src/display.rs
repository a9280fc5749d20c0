//! Human-facing rendering of auction phases.

use sealbid_types::Phase;
use serde::Serialize;

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::AuctionInit => "Bidding Not Started",
        Phase::BiddingStarted => "Bidding Started",
        Phase::RevealStarted => "Reveal Started",
        Phase::AuctionDone => "Auction Done",
        Phase::AuctionEnded => "Auction Ended",
    }
}

/// Progress bar position for `phase`, in percent.
pub fn progress_percent(phase: Phase) -> u8 {
    match phase {
        Phase::AuctionInit => 0,
        Phase::BiddingStarted => 25,
        Phase::RevealStarted => 50,
        Phase::AuctionDone => 75,
        Phase::AuctionEnded => 100,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhaseView {
    pub id: u8,
    pub label: &'static str,
    pub progress: u8,
}

impl From<Phase> for PhaseView {
    fn from(phase: Phase) -> Self {
        Self {
            id: phase.id(),
            label: phase_label(phase),
            progress: progress_percent(phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_text_and_progress() {
        let expected = [
            ("Bidding Not Started", 0),
            ("Bidding Started", 25),
            ("Reveal Started", 50),
            ("Auction Done", 75),
            ("Auction Ended", 100),
        ];
        for (phase, (label, progress)) in Phase::ALL.into_iter().zip(expected) {
            let view = PhaseView::from(phase);
            assert_eq!(view.label, label);
            assert_eq!(view.progress, progress);
        }
    }

    #[test]
    fn test_view_serializes_ordinal() {
        let json = serde_json::to_string(&PhaseView::from(Phase::RevealStarted)).unwrap();
        assert_eq!(json, r#"{"id":2,"label":"Reveal Started","progress":50}"#);
    }
}
