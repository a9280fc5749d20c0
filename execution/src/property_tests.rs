//! Property tests for bid overwrite and value conservation.
//!
//! Each case scripts a handful of bidders, each of whom commits one or more times, then
//! reveals honestly, reveals with the wrong secret, or stays silent. Whatever the script,
//! settlement must pick the same winner as a brute-force scan, and every escrowed unit must
//! end up retained, pending or withdrawn.

use crate::{
    commitment::commit,
    mocks::{create_account_keypair, MockTreasury},
    Auction, AuctionConfig, Memory, RevealOutcome,
};
use proptest::prelude::*;
use sealbid_types::{Amount, Phase};

#[derive(Clone, Copy, Debug)]
enum Opening {
    Honest,
    WrongSecret,
    Silent,
}

#[derive(Clone, Debug)]
struct Plan {
    /// `(amount, deposit)` per commitment, in submission order.
    bids: Vec<(Amount, Amount)>,
    opening: Opening,
}

fn arb_opening() -> impl Strategy<Value = Opening> {
    prop_oneof![
        3 => Just(Opening::Honest),
        1 => Just(Opening::WrongSecret),
        1 => Just(Opening::Silent),
    ]
}

fn arb_plan() -> impl Strategy<Value = Plan> {
    (
        prop::collection::vec((0u64..200, 1u64..200), 1..4),
        arb_opening(),
    )
        .prop_map(|(bids, opening)| Plan { bids, opening })
}

fn secret_for(seed: u64, round: usize) -> Vec<u8> {
    format!("bidder-{seed}-round-{round}").into_bytes()
}

proptest! {
    #[test]
    fn prop_settlement_conserves_value(
        plans in prop::collection::vec(arb_plan(), 1..6),
        forfeit_unrevealed in any::<bool>(),
    ) {
        let config = AuctionConfig { forfeit_unrevealed, ..Default::default() };
        let mut auction = Auction::new(Memory::default(), MockTreasury::default(), config).unwrap();
        let bidders: Vec<_> = (0..plans.len() as u64)
            .map(|seed| {
                let (_, public) = create_account_keypair(seed);
                auction.treasury_mut().fund(&public, 1_000);
                public
            })
            .collect();

        auction.advance_phase().unwrap();
        for (seed, (bidder, plan)) in bidders.iter().zip(&plans).enumerate() {
            for (round, (amount, deposit)) in plan.bids.iter().enumerate() {
                let secret = secret_for(seed as u64, round);
                auction.bid(bidder, commit(*amount, &secret), *deposit).unwrap();
            }
            // Only the latest digest survives, backed by every deposit.
            let last = plan.bids.len() - 1;
            let record = auction.bid_of(bidder).unwrap().unwrap();
            prop_assert_eq!(
                record.commitment.digest,
                commit(plan.bids[last].0, &secret_for(seed as u64, last))
            );
            let bonded: Amount = plan.bids.iter().map(|(_, deposit)| deposit).sum();
            prop_assert_eq!(record.commitment.deposit, bonded);
        }

        auction.advance_phase().unwrap();
        let mut expected: Option<(usize, Amount)> = None;
        for (seed, (bidder, plan)) in bidders.iter().zip(&plans).enumerate() {
            let last = plan.bids.len() - 1;
            let amount = plan.bids[last].0;
            let bonded: Amount = plan.bids.iter().map(|(_, deposit)| deposit).sum();
            let leader_before = auction.summary().highest_bidder.clone();
            let outcome = match plan.opening {
                Opening::Silent => continue,
                Opening::Honest => auction
                    .reveal(bidder, amount, &secret_for(seed as u64, last))
                    .unwrap(),
                Opening::WrongSecret => auction.reveal(bidder, amount, b"guess").unwrap(),
            };
            match outcome {
                RevealOutcome::Valid { amount, .. } => {
                    prop_assert!(amount <= bonded);
                    if amount > expected.map_or(0, |(_, best)| best) {
                        expected = Some((seed, amount));
                    }
                }
                RevealOutcome::Invalid { .. } => {
                    prop_assert_eq!(&auction.summary().highest_bidder, &leader_before);
                }
            }
        }

        auction.advance_phase().unwrap();
        let settlement = auction.auction_end().unwrap();
        prop_assert_eq!(auction.current_phase(), Phase::AuctionEnded);
        prop_assert_eq!(
            settlement.winner.clone(),
            expected.map(|(seed, _)| bidders[seed].clone())
        );
        prop_assert_eq!(settlement.winning_amount, expected.map_or(0, |(_, amount)| amount));
        prop_assert!(settlement.second_highest_bid <= settlement.winning_amount);

        let snapshot = auction.snapshot().unwrap();
        let deposits = snapshot.summary.total_deposits as u128;
        prop_assert!(snapshot.is_conserved());
        prop_assert!(snapshot.total_pending() + settlement.winning_amount as u128 <= deposits);

        for bidder in &bidders {
            let owed = auction.pending_return(bidder).unwrap();
            if owed > 0 {
                prop_assert_eq!(auction.withdraw(bidder).unwrap(), owed);
            }
            prop_assert!(auction.withdraw(bidder).is_err());
        }
        let snapshot = auction.snapshot().unwrap();
        prop_assert!(snapshot.is_conserved());
        prop_assert_eq!(auction.treasury().custody(), snapshot.summary.retained);
    }
}
