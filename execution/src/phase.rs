//! Phase guards for auction operations.
//!
//! ```text
//! AuctionInit -> BiddingStarted -> RevealStarted -> AuctionDone -> AuctionEnded
//! ```
//!
//! | operation     | allowed in                      |
//! |---------------|---------------------------------|
//! | bid           | `BiddingStarted`                |
//! | reveal        | `RevealStarted`                 |
//! | advance phase | any phase but `AuctionEnded`    |
//! | auction end   | `AuctionDone`                   |
//! | withdraw      | any phase                       |

use sealbid_types::Phase;
use std::fmt;

use crate::AuctionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Bid,
    Reveal,
    AdvancePhase,
    AuctionEnd,
    Withdraw,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Bid => "bid",
            Operation::Reveal => "reveal",
            Operation::AdvancePhase => "advance_phase",
            Operation::AuctionEnd => "auction_end",
            Operation::Withdraw => "withdraw",
        };
        f.write_str(name)
    }
}

/// Returns `true` if `operation` may run while the auction is in `phase`.
pub fn is_allowed(operation: Operation, phase: Phase) -> bool {
    match operation {
        Operation::Bid => phase == Phase::BiddingStarted,
        Operation::Reveal => phase == Phase::RevealStarted,
        Operation::AdvancePhase => !phase.is_terminal(),
        Operation::AuctionEnd => phase == Phase::AuctionDone,
        Operation::Withdraw => true,
    }
}

pub fn ensure_allowed(operation: Operation, phase: Phase) -> Result<(), AuctionError> {
    if is_allowed(operation, phase) {
        Ok(())
    } else {
        Err(AuctionError::InvalidPhase { operation, phase })
    }
}

/// The phase following `phase`.
pub fn next_phase(phase: Phase) -> Result<Phase, AuctionError> {
    phase.next().ok_or(AuctionError::TerminalPhase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_table() {
        for phase in Phase::ALL {
            assert_eq!(
                is_allowed(Operation::Bid, phase),
                phase == Phase::BiddingStarted
            );
            assert_eq!(
                is_allowed(Operation::Reveal, phase),
                phase == Phase::RevealStarted
            );
            assert_eq!(
                is_allowed(Operation::AuctionEnd, phase),
                phase == Phase::AuctionDone
            );
            assert!(is_allowed(Operation::Withdraw, phase));
        }
        assert!(!is_allowed(Operation::AdvancePhase, Phase::AuctionEnded));
    }

    #[test]
    fn test_next_phase_stops_at_terminal() {
        assert_eq!(
            next_phase(Phase::AuctionDone).unwrap(),
            Phase::AuctionEnded
        );
        assert!(matches!(
            next_phase(Phase::AuctionEnded),
            Err(AuctionError::TerminalPhase)
        ));
    }

    #[test]
    fn test_invalid_phase_names_operation() {
        let err = ensure_allowed(Operation::Reveal, Phase::BiddingStarted).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reveal is not allowed in phase BiddingStarted"
        );
    }
}
