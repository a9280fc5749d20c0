use super::*;
use crate::execution::{Event, Instruction, Key, Value};
use commonware_codec::{Encode, EncodeSize, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, sha256::Sha256, Hasher, Signer};

#[test]
fn test_phase_ids_are_stable_ordinals() {
    for (expected, phase) in Phase::ALL.iter().enumerate() {
        assert_eq!(phase.id() as usize, expected);
        assert_eq!(Phase::try_from(expected as u8), Ok(*phase));
    }
    assert!(Phase::try_from(5).is_err());
}

#[test]
fn test_phase_next_is_strictly_forward() {
    let mut phase = Phase::AuctionInit;
    let mut steps = 0;
    while let Some(next) = phase.next() {
        assert!(next > phase);
        phase = next;
        steps += 1;
    }
    assert_eq!(steps, 4);
    assert!(phase.is_terminal());
}

#[test]
fn test_phase_rejects_unknown_tag() {
    let encoded = [7u8];
    assert!(Phase::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_bid_record_roundtrip() {
    let record = BidRecord {
        commitment: Commitment {
            digest: Sha256::hash(b"sealed"),
            deposit: 150,
        },
        reveal: RevealStatus::Invalid {
            reason: InvalidReveal::ExceedsDeposit,
            order: 3,
        },
    };
    let encoded = record.encode();
    assert_eq!(encoded.len(), record.encode_size());
    let decoded = BidRecord::read(&mut &encoded[..]).unwrap();
    assert_eq!(record, decoded);
    assert_eq!(decoded.revealed_amount(), None);
    assert!(decoded.reveal.is_revealed());
}

#[test]
fn test_summary_roundtrip_with_winner() {
    let summary = AuctionSummary {
        phase: Phase::AuctionEnded,
        highest_bidder: Some(PrivateKey::from_seed(1).public_key()),
        highest_bid: 100,
        second_highest_bid: 80,
        ended: true,
        reveal_count: 2,
        total_deposits: 250,
        retained: 100,
        total_withdrawn: 0,
    };
    summary.validate_invariants().expect("valid invariants");
    let encoded = summary.encode();
    let decoded = AuctionSummary::read(&mut &encoded[..]).unwrap();
    assert_eq!(summary, decoded);
    assert_eq!(decoded.custody(), 250);
}

#[test]
fn test_summary_rejects_ended_before_terminal_phase() {
    let summary = AuctionSummary {
        phase: Phase::AuctionDone,
        ended: true,
        ..Default::default()
    };
    assert!(matches!(
        summary.validate_invariants(),
        Err(SummaryInvariantError::EndedPhaseMismatch { .. })
    ));
}

#[test]
fn test_summary_rejects_outflow_above_deposits() {
    let summary = AuctionSummary {
        phase: Phase::AuctionEnded,
        ended: true,
        highest_bidder: Some(PrivateKey::from_seed(1).public_key()),
        highest_bid: 60,
        total_deposits: 100,
        retained: 60,
        total_withdrawn: 50,
        ..Default::default()
    };
    assert!(matches!(
        summary.validate_invariants(),
        Err(SummaryInvariantError::OutflowExceedsDeposits { .. })
    ));
}

#[test]
fn test_summary_rejects_orphan_highest_bid() {
    let summary = AuctionSummary {
        phase: Phase::RevealStarted,
        highest_bid: 10,
        ..Default::default()
    };
    assert_eq!(
        summary.validate_invariants(),
        Err(SummaryInvariantError::OrphanHighestBid { highest_bid: 10 })
    );
}

#[test]
fn test_registry_stays_sorted_and_deduplicated() {
    let keys: Vec<_> = (1..=5u64)
        .map(|seed| PrivateKey::from_seed(seed).public_key())
        .collect();
    let mut registry = BidderRegistry::default();
    for key in keys.iter().rev() {
        assert!(registry.insert(key));
    }
    assert!(!registry.insert(&keys[2]));
    assert_eq!(registry.len(), 5);
    assert!(registry.bidders.windows(2).all(|pair| pair[0] < pair[1]));

    let encoded = registry.encode();
    let decoded = BidderRegistry::read(&mut &encoded[..]).unwrap();
    assert_eq!(registry, decoded);
}

#[test]
fn test_registry_rejects_unsorted_encoding() {
    let a = PrivateKey::from_seed(1).public_key();
    let b = PrivateKey::from_seed(2).public_key();
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let unsorted = vec![high, low];
    let encoded = unsorted.encode();
    assert!(BidderRegistry::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_reveal_instruction_rejects_oversized_secret() {
    let instruction = Instruction::Reveal {
        amount: 5,
        secret: vec![7u8; MAX_SECRET_LENGTH + 1],
    };
    let encoded = instruction.encode();
    assert!(Instruction::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_key_value_event_roundtrip() {
    let bidder = PrivateKey::from_seed(9).public_key();
    let key = Key::PendingReturn(bidder.clone());
    let encoded = key.encode();
    assert_eq!(Key::read(&mut &encoded[..]).unwrap(), key);

    let value = Value::PendingReturn(42);
    let encoded = value.encode();
    assert_eq!(Value::read(&mut &encoded[..]).unwrap(), value);

    let event = Event::AuctionSettled {
        winner: Some(bidder),
        winning_amount: 100,
        second_highest_bid: 80,
        retained: 100,
    };
    let encoded = event.encode();
    assert_eq!(encoded.len(), event.encode_size());
    assert_eq!(Event::read(&mut &encoded[..]).unwrap(), event);
}

