//! Scripted auctions.
//!
//! A scenario names its bidders, funds them, and lists the operations to run in order:
//! ```yaml
//! config:
//!   min_deposit: 10
//! bidders:
//!   - { name: alice, seed: 1, balance: 500 }
//! steps:
//!   - op: advance
//!   - { op: bid, bidder: alice, amount: 100, secret: alice-secret, deposit: 150 }
//! ```
//! Steps run against in-memory state and a mock treasury. A refused step is recorded in the
//! report (with its error code) and the script continues, unless the run is strict.

use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use commonware_utils::hex;
use sealbid_execution::{
    commitment::{parse_digest_hex, CommitmentError, SealedBid},
    mocks::{create_account_keypair, MockTreasury},
    Auction, AuctionConfig, AuctionError, Memory,
};
use sealbid_types::{
    execution::{Event, Instruction},
    Amount, InvalidReveal, Settlement,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::display::PhaseView;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("duplicate bidder name: {0}")]
    DuplicateBidder(String),
    #[error("step {index}: unknown bidder {name}")]
    UnknownBidder { index: usize, name: String },
    #[error("step {index}: bid needs a digest or both amount and secret")]
    IncompleteBid { index: usize },
    #[error("step {index}: {source}")]
    Digest {
        index: usize,
        #[source]
        source: CommitmentError,
    },
    #[error("step {index} failed: {source}")]
    Step {
        index: usize,
        #[source]
        source: AuctionError,
    },
    #[error("failed to open auction: {0}")]
    Open(#[source] AuctionError),
}

fn default_balance() -> Amount {
    1_000
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BidderSpec {
    pub name: String,
    /// Seed for the bidder's deterministic keypair.
    pub seed: u64,
    #[serde(default = "default_balance")]
    pub balance: Amount,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Advance,
    Bid {
        bidder: String,
        deposit: Amount,
        /// Pre-computed 64-character hex commitment.
        #[serde(default)]
        digest: Option<String>,
        #[serde(default)]
        amount: Option<Amount>,
        #[serde(default)]
        secret: Option<String>,
    },
    Reveal {
        bidder: String,
        amount: Amount,
        secret: String,
    },
    AuctionEnd,
    Withdraw {
        bidder: String,
    },
    FailNextEscrows {
        count: usize,
    },
    FailNextPayouts {
        count: usize,
    },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: AuctionConfig,
    /// Seed of the account that advances phases and ends the auction.
    #[serde(default)]
    pub operator_seed: u64,
    pub bidders: Vec<BidderSpec>,
    pub steps: Vec<Step>,
}

/// What one step did.
#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub phase: PhaseView,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StepError {
    pub code: u8,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventView {
    PhaseAdvanced {
        from: PhaseView,
        to: PhaseView,
    },
    BidPlaced {
        bidder: String,
        digest: String,
        deposit: Amount,
        total_deposit: Amount,
    },
    BidRevealed {
        bidder: String,
        amount: Amount,
        order: u64,
    },
    RevealRejected {
        bidder: String,
        reason: &'static str,
        order: u64,
    },
    RefundQueued {
        bidder: String,
        amount: Amount,
    },
    AuctionSettled {
        winner: Option<String>,
        winning_amount: Amount,
        second_highest_bid: Amount,
        retained: Amount,
    },
    Withdrawn {
        bidder: String,
        amount: Amount,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SettlementView {
    pub winner: Option<String>,
    pub winning_amount: Amount,
    pub second_highest_bid: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BidderReport {
    pub name: String,
    pub public_key: String,
    /// Funds held outside the auction.
    pub wallet: Amount,
    /// Refund waiting to be withdrawn.
    pub pending_return: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed: Option<Amount>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub phase: PhaseView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<SettlementView>,
    pub bidders: Vec<BidderReport>,
    pub retained: Amount,
    pub conserved: bool,
}

impl Report {
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|step| step.error.is_some()).count()
    }
}

fn reveal_reason(reason: InvalidReveal) -> &'static str {
    match reason {
        InvalidReveal::DigestMismatch => "digest_mismatch",
        InvalidReveal::ExceedsDeposit => "exceeds_deposit",
    }
}

struct Roster {
    keys: HashMap<String, PublicKey>,
    names: HashMap<PublicKey, String>,
}

impl Roster {
    fn key(&self, index: usize, name: &str) -> Result<PublicKey, ScenarioError> {
        self.keys
            .get(name)
            .cloned()
            .ok_or_else(|| ScenarioError::UnknownBidder {
                index,
                name: name.to_string(),
            })
    }

    fn name(&self, key: &PublicKey) -> String {
        self.names.get(key).cloned().unwrap_or_else(|| hex(key.as_ref()))
    }

    fn view(&self, event: &Event) -> EventView {
        match event {
            Event::PhaseAdvanced { from, to } => EventView::PhaseAdvanced {
                from: (*from).into(),
                to: (*to).into(),
            },
            Event::BidPlaced {
                bidder,
                digest,
                deposit,
                total_deposit,
            } => EventView::BidPlaced {
                bidder: self.name(bidder),
                digest: hex(digest.as_ref()),
                deposit: *deposit,
                total_deposit: *total_deposit,
            },
            Event::BidRevealed {
                bidder,
                amount,
                order,
            } => EventView::BidRevealed {
                bidder: self.name(bidder),
                amount: *amount,
                order: *order,
            },
            Event::RevealRejected {
                bidder,
                reason,
                order,
            } => EventView::RevealRejected {
                bidder: self.name(bidder),
                reason: reveal_reason(*reason),
                order: *order,
            },
            Event::RefundQueued { bidder, amount } => EventView::RefundQueued {
                bidder: self.name(bidder),
                amount: *amount,
            },
            Event::AuctionSettled {
                winner,
                winning_amount,
                second_highest_bid,
                retained,
            } => EventView::AuctionSettled {
                winner: winner.as_ref().map(|winner| self.name(winner)),
                winning_amount: *winning_amount,
                second_highest_bid: *second_highest_bid,
                retained: *retained,
            },
            Event::Withdrawn { bidder, amount } => EventView::Withdrawn {
                bidder: self.name(bidder),
                amount: *amount,
            },
        }
    }

    fn settlement(&self, settlement: &Settlement) -> SettlementView {
        SettlementView {
            winner: settlement.winner.as_ref().map(|winner| self.name(winner)),
            winning_amount: settlement.winning_amount,
            second_highest_bid: settlement.second_highest_bid,
        }
    }
}

impl Scenario {
    pub fn from_yaml(source: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(source)?)
    }

    fn roster(&self) -> Result<Roster, ScenarioError> {
        let mut keys = HashMap::new();
        let mut names = HashMap::new();
        for spec in &self.bidders {
            let (_, public) = create_account_keypair(spec.seed);
            if keys.insert(spec.name.clone(), public.clone()).is_some() {
                return Err(ScenarioError::DuplicateBidder(spec.name.clone()));
            }
            names.insert(public, spec.name.clone());
        }
        Ok(Roster { keys, names })
    }

    /// Run every step. With `strict`, the first refused step aborts the run.
    pub fn run(&self, strict: bool) -> Result<Report, ScenarioError> {
        let roster = self.roster()?;
        let mut treasury = MockTreasury::default();
        for spec in &self.bidders {
            treasury.fund(&roster.keys[&spec.name], spec.balance);
        }
        let mut auction = Auction::new(Memory::default(), treasury, self.config.clone())
            .map_err(ScenarioError::Open)?;

        let operator = create_account_keypair(self.operator_seed).1;
        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, ?step, "running step");
            let report = match self.apply(&mut auction, &roster, &operator, index, step)? {
                Ok(events) => StepReport {
                    index,
                    phase: auction.current_phase().into(),
                    events: events.iter().map(|event| roster.view(event)).collect(),
                    error: None,
                },
                Err(source) => {
                    warn!(index, error = %source, "step refused");
                    if strict {
                        return Err(ScenarioError::Step { index, source });
                    }
                    StepReport {
                        index,
                        phase: auction.current_phase().into(),
                        events: Vec::new(),
                        error: Some(StepError {
                            code: source.code(),
                            message: source.to_string(),
                        }),
                    }
                }
            };
            steps.push(report);
        }

        let snapshot = auction.snapshot().map_err(|source| ScenarioError::Step {
            index: self.steps.len(),
            source,
        })?;
        let mut bidders = Vec::with_capacity(self.bidders.len());
        for spec in &self.bidders {
            let key = &roster.keys[&spec.name];
            let pending_return = snapshot
                .pending_returns
                .iter()
                .find(|(bidder, _)| bidder == key)
                .map_or(0, |(_, amount)| *amount);
            let revealed = snapshot
                .bids
                .iter()
                .find(|(bidder, _)| bidder == key)
                .and_then(|(_, record)| record.revealed_amount());
            bidders.push(BidderReport {
                name: spec.name.clone(),
                public_key: hex(key.as_ref()),
                wallet: auction.treasury().balance(key),
                pending_return,
                revealed,
            });
        }

        let settlement = snapshot.summary.ended.then(|| Settlement {
            winner: snapshot.summary.highest_bidder.clone(),
            winning_amount: snapshot.summary.highest_bid,
            second_highest_bid: snapshot.summary.second_highest_bid,
        });

        let report = Report {
            steps,
            phase: snapshot.summary.phase.into(),
            settlement: settlement.as_ref().map(|settlement| roster.settlement(settlement)),
            bidders,
            retained: snapshot.summary.retained,
            conserved: snapshot.is_conserved(),
        };
        info!(
            steps = report.steps.len(),
            failed = report.failed_steps(),
            conserved = report.conserved,
            "scenario complete"
        );
        Ok(report)
    }

    /// Outer error: the script itself is malformed. Inner error: the auction refused the step.
    fn apply(
        &self,
        auction: &mut Auction<Memory, MockTreasury>,
        roster: &Roster,
        operator: &PublicKey,
        index: usize,
        step: &Step,
    ) -> Result<Result<Vec<Event>, AuctionError>, ScenarioError> {
        let (caller, instruction) = match step {
            Step::Advance => (operator.clone(), Instruction::AdvancePhase),
            Step::AuctionEnd => (operator.clone(), Instruction::AuctionEnd),
            Step::Bid {
                bidder,
                deposit,
                digest,
                amount,
                secret,
            } => (
                roster.key(index, bidder)?,
                Instruction::Bid {
                    digest: resolve_digest(
                        index,
                        digest,
                        amount,
                        secret,
                        self.config.max_secret_len,
                    )?,
                    deposit: *deposit,
                },
            ),
            Step::Reveal {
                bidder,
                amount,
                secret,
            } => (
                roster.key(index, bidder)?,
                Instruction::Reveal {
                    amount: *amount,
                    secret: secret.as_bytes().to_vec(),
                },
            ),
            Step::Withdraw { bidder } => (roster.key(index, bidder)?, Instruction::Withdraw),
            Step::FailNextEscrows { count } => {
                auction.treasury_mut().fail_next_escrows(*count);
                return Ok(Ok(Vec::new()));
            }
            Step::FailNextPayouts { count } => {
                auction.treasury_mut().fail_next_payouts(*count);
                return Ok(Ok(Vec::new()));
            }
        };
        Ok(auction.execute(&caller, &instruction))
    }
}

fn resolve_digest(
    index: usize,
    digest: &Option<String>,
    amount: &Option<Amount>,
    secret: &Option<String>,
    max_secret_len: usize,
) -> Result<Digest, ScenarioError> {
    let digest = match (digest, amount, secret) {
        (Some(digest), _, _) => parse_digest_hex(digest),
        (None, Some(amount), Some(secret)) => {
            SealedBid::new(*amount, secret.as_bytes(), max_secret_len)
                .map(|sealed| sealed.digest())
        }
        _ => return Err(ScenarioError::IncompleteBid { index }),
    };
    digest.map_err(|source| ScenarioError::Digest { index, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealbid_execution::commitment::commit;
    use sealbid_types::{ERROR_NOTHING_TO_WITHDRAW, ERROR_TRANSFER_FAILURE};

    const TWO_BIDDERS: &str = r#"
bidders:
  - { name: alice, seed: 1, balance: 500 }
  - { name: bob, seed: 2, balance: 500 }
steps:
  - op: advance
  - { op: bid, bidder: alice, amount: 100, secret: alice-secret, deposit: 150 }
  - { op: bid, bidder: bob, amount: 80, secret: bob-secret, deposit: 100 }
  - op: advance
  - { op: reveal, bidder: alice, amount: 100, secret: alice-secret }
  - { op: reveal, bidder: bob, amount: 80, secret: bob-secret }
  - op: advance
  - op: auction_end
  - { op: fail_next_payouts, count: 1 }
  - { op: withdraw, bidder: alice }
  - { op: withdraw, bidder: alice }
  - { op: withdraw, bidder: alice }
  - { op: withdraw, bidder: bob }
"#;

    #[test]
    fn test_two_bidder_script() {
        let scenario = Scenario::from_yaml(TWO_BIDDERS).unwrap();
        let report = scenario.run(false).unwrap();

        assert_eq!(report.phase.label, "Auction Ended");
        assert_eq!(report.phase.progress, 100);
        assert_eq!(
            report.settlement,
            Some(SettlementView {
                winner: Some("alice".to_string()),
                winning_amount: 100,
                second_highest_bid: 80,
            })
        );
        assert!(report.conserved);
        assert_eq!(report.retained, 100);

        // Injected payout failure, then success, then nothing left.
        let codes: Vec<_> = report.steps[9..12]
            .iter()
            .map(|step| step.error.as_ref().map(|err| err.code))
            .collect();
        assert_eq!(
            codes,
            vec![
                Some(ERROR_TRANSFER_FAILURE),
                None,
                Some(ERROR_NOTHING_TO_WITHDRAW)
            ]
        );
        assert_eq!(report.failed_steps(), 2);

        let alice = &report.bidders[0];
        assert_eq!(alice.wallet, 400);
        assert_eq!(alice.pending_return, 0);
        assert_eq!(alice.revealed, Some(100));
        let bob = &report.bidders[1];
        assert_eq!(bob.wallet, 500);
    }

    #[test]
    fn test_settlement_events_name_bidders() {
        let report = Scenario::from_yaml(TWO_BIDDERS).unwrap().run(false).unwrap();
        let settle = &report.steps[7];
        assert!(settle.events.contains(&EventView::RefundQueued {
            bidder: "alice".to_string(),
            amount: 50,
        }));
        assert!(settle.events.contains(&EventView::AuctionSettled {
            winner: Some("alice".to_string()),
            winning_amount: 100,
            second_highest_bid: 80,
            retained: 100,
        }));
    }

    #[test]
    fn test_strict_run_stops_at_first_refusal() {
        let source = r#"
bidders:
  - { name: carol, seed: 3 }
steps:
  - { op: bid, bidder: carol, amount: 1, secret: s, deposit: 1 }
"#;
        let scenario = Scenario::from_yaml(source).unwrap();
        assert!(matches!(
            scenario.run(true),
            Err(ScenarioError::Step {
                index: 0,
                source: AuctionError::InvalidPhase { .. }
            })
        ));
        let report = scenario.run(false).unwrap();
        assert_eq!(report.failed_steps(), 1);
        assert_eq!(report.phase.label, "Bidding Not Started");
    }

    #[test]
    fn test_bid_accepts_hex_digest() {
        let digest = hex(commit(60, b"c-secret").as_ref());
        let source = format!(
            r#"
bidders:
  - {{ name: carol, seed: 3 }}
steps:
  - op: advance
  - {{ op: bid, bidder: carol, digest: "{digest}", deposit: 50 }}
  - op: advance
  - {{ op: reveal, bidder: carol, amount: 60, secret: c-secret }}
  - op: advance
  - op: advance
"#
        );
        let report = Scenario::from_yaml(&source).unwrap().run(true).unwrap();
        assert!(report.steps[3].events.contains(&EventView::RevealRejected {
            bidder: "carol".to_string(),
            reason: "exceeds_deposit",
            order: 0,
        }));
        assert_eq!(report.settlement.as_ref().unwrap().winner, None);
        assert_eq!(report.bidders[0].pending_return, 50);
    }

    #[test]
    fn test_malformed_scripts_are_rejected() {
        let unknown = r#"
bidders: []
steps:
  - { op: withdraw, bidder: nobody }
"#;
        assert!(matches!(
            Scenario::from_yaml(unknown).unwrap().run(false),
            Err(ScenarioError::UnknownBidder { index: 0, .. })
        ));

        let incomplete = r#"
bidders:
  - { name: dave, seed: 4 }
steps:
  - op: advance
  - { op: bid, bidder: dave, amount: 5, deposit: 5 }
"#;
        assert!(matches!(
            Scenario::from_yaml(incomplete).unwrap().run(false),
            Err(ScenarioError::IncompleteBid { index: 1 })
        ));

        let duplicate = r#"
bidders:
  - { name: erin, seed: 5 }
  - { name: erin, seed: 6 }
steps: []
"#;
        assert!(matches!(
            Scenario::from_yaml(duplicate).unwrap().run(false),
            Err(ScenarioError::DuplicateBidder(_))
        ));

        assert!(Scenario::from_yaml("steps: [{ op: explode }]\nbidders: []").is_err());
    }

    #[test]
    fn test_empty_secret_never_reaches_the_ledger() {
        let source = r#"
config: { forfeit_unrevealed: true }
bidders:
  - { name: carol, seed: 3, balance: 100 }
steps:
  - op: advance
  - { op: bid, bidder: carol, amount: 10, secret: "", deposit: 20 }
"#;
        let scenario = Scenario::from_yaml(source).unwrap();
        assert!(matches!(
            scenario.run(false),
            Err(ScenarioError::Digest {
                index: 1,
                source: CommitmentError::EmptySecret
            })
        ));
    }
}
