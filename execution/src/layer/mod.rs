use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use sealbid_types::execution::{Event, Instruction, Key, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    config::AuctionConfig,
    state::{State, Status},
    AuctionError,
};

mod handlers;

pub use handlers::select_winner;

/// Stages the writes of one operation over a read-only [`State`].
///
/// Nothing reaches the underlying store until the caller applies [`Layer::commit`], so a
/// refused operation simply drops the layer.
pub struct Layer<'a, S: State> {
    state: &'a S,
    config: &'a AuctionConfig,
    pending: BTreeMap<Key, Status>,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, config: &'a AuctionConfig) -> Self {
        Self {
            state,
            config,
            pending: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn remove(&mut self, key: Key) {
        self.pending.insert(key, Status::Delete);
    }

    /// Run `instruction` on behalf of `caller`.
    pub fn execute(
        &mut self,
        caller: &PublicKey,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, AuctionError> {
        debug!(caller = ?caller, instruction = instruction_name(instruction), "executing");
        match instruction {
            Instruction::Bid { digest, deposit } => self.handle_bid(caller, digest, *deposit),
            Instruction::Reveal { amount, secret } => self.handle_reveal(caller, *amount, secret),
            Instruction::AdvancePhase => self.handle_advance_phase(),
            Instruction::AuctionEnd => self.handle_auction_end(),
            Instruction::Withdraw => self.handle_withdraw(caller),
        }
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

fn instruction_name(instruction: &Instruction) -> &'static str {
    match instruction {
        Instruction::Bid { .. } => "bid",
        Instruction::Reveal { .. } => "reveal",
        Instruction::AdvancePhase => "advance_phase",
        Instruction::AuctionEnd => "auction_end",
        Instruction::Withdraw => "withdraw",
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key)?,
        })
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.pending.insert(key, Status::Update(value));
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<()> {
        self.pending.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
