use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use sealbid_types::{
    execution::{Key, Value},
    Amount, AuctionSummary, BidRecord, BidderRegistry,
};
use std::collections::HashMap;

/// Key/value store backing one auction instance.
///
/// Implementations are expected to apply a batch from [`State::apply`] in order; the engine
/// relies on that to roll a failed interaction back to the exact previous values.
pub trait State {
    fn get(&self, key: &Key) -> Result<Option<Value>>;
    fn insert(&mut self, key: Key, value: Value) -> Result<()>;
    fn delete(&mut self, key: &Key) -> Result<()>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> Result<()> {
        for (key, status) in changes {
            match status {
                Status::Update(value) => self.insert(key, value)?,
                Status::Delete => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

/// In-memory [`State`].
#[derive(Default, Debug, Clone)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl State for Memory {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<()> {
        self.state.remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Update(Value),
    Delete,
}

/// Captures the current value of every key touched by `changes` so the batch can be undone.
pub(crate) fn undo_log<S: State>(state: &S, changes: &[(Key, Status)]) -> Result<Vec<(Key, Status)>> {
    changes
        .iter()
        .map(|(key, _)| {
            let previous = match state.get(key)? {
                Some(value) => Status::Update(value),
                None => Status::Delete,
            };
            Ok((key.clone(), previous))
        })
        .collect()
}

pub(crate) fn load_summary<S: State>(state: &S) -> Result<AuctionSummary> {
    Ok(match state.get(&Key::Auction)? {
        Some(Value::Auction(summary)) => summary,
        _ => AuctionSummary::default(),
    })
}

pub(crate) fn load_bid<S: State>(state: &S, bidder: &PublicKey) -> Result<Option<BidRecord>> {
    Ok(match state.get(&Key::Bid(bidder.clone()))? {
        Some(Value::Bid(record)) => Some(record),
        _ => None,
    })
}

pub(crate) fn load_pending_return<S: State>(state: &S, bidder: &PublicKey) -> Result<Amount> {
    Ok(match state.get(&Key::PendingReturn(bidder.clone()))? {
        Some(Value::PendingReturn(amount)) => amount,
        _ => 0,
    })
}

pub(crate) fn load_registry<S: State>(state: &S) -> Result<BidderRegistry> {
    Ok(match state.get(&Key::BidderRegistry)? {
        Some(Value::BidderRegistry(registry)) => registry,
        _ => BidderRegistry::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{ed25519::PrivateKey, Signer};

    #[test]
    fn test_apply_then_undo_restores_previous_values() {
        let bidder = PrivateKey::from_seed(1).public_key();
        let mut state = Memory::default();
        state
            .insert(Key::PendingReturn(bidder.clone()), Value::PendingReturn(50))
            .unwrap();

        let changes = vec![
            (Key::PendingReturn(bidder.clone()), Status::Delete),
            (Key::BidderRegistry, Status::Update(Value::BidderRegistry(BidderRegistry::default()))),
        ];
        let undo = undo_log(&state, &changes).unwrap();
        state.apply(changes).unwrap();
        assert_eq!(load_pending_return(&state, &bidder).unwrap(), 0);
        assert!(state.get(&Key::BidderRegistry).unwrap().is_some());

        state.apply(undo).unwrap();
        assert_eq!(load_pending_return(&state, &bidder).unwrap(), 50);
        assert!(state.get(&Key::BidderRegistry).unwrap().is_none());
    }

    #[test]
    fn test_missing_summary_defaults_to_init() {
        let state = Memory::default();
        let summary = load_summary(&state).unwrap();
        assert_eq!(summary, AuctionSummary::default());
        assert!(load_bid(&state, &PrivateKey::from_seed(2).public_key())
            .unwrap()
            .is_none());
    }
}
