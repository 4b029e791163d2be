// Protocol - the ledger, oracle and arbiter wired together
//
// Every operation runs against a staged copy of the whole state and is
// committed only when it succeeds, so a failure anywhere in a chain of
// cross-component calls leaves nothing behind.

use crate::arbiter::Arbiter;
use crate::call::Call;
use crate::error::Error;
use crate::event::Event;
use crate::identity::{AccountId, QuestionId};
use crate::ledger::{Ledger, Role};
use crate::oracle::{DisputeCourt, Oracle, Outcome};
use crate::protocol::config::ProtocolConfig;
use crate::types::{Amount, SnapshotId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct ProtocolState {
    ledger: Ledger,
    oracle: Oracle,
    arbiter: Arbiter,
}

/// The complete dispute-resolution core
#[derive(Clone, Debug)]
pub struct Protocol {
    state: ProtocolState,
    /// Events of committed operations not yet polled
    events: Vec<Event>,
}

impl Protocol {
    /// Build the genesis state described by `config`
    pub fn new(config: ProtocolConfig) -> Result<Self, Error> {
        config.validate()?;

        let ledger = Ledger::new(config.owner, config.token);
        let oracle = Oracle::new(config.oracle_account, config.arbiter_account, config.oracle)?;
        let arbiter = Arbiter::new(
            config.arbiter_account,
            config.oracle_account,
            config.voting_period_seconds,
        );

        Ok(Self {
            state: ProtocolState {
                ledger,
                oracle,
                arbiter,
            },
            events: Vec::new(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn oracle(&self) -> &Oracle {
        &self.state.oracle
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.state.arbiter
    }

    /// Poll for events (clears the event queue)
    pub fn poll_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Events of committed operations not yet polled
    pub fn pending_events(&self) -> &[Event] {
        &self.events
    }

    /// Apply `op` to a staged copy of the state; commit only on success
    fn atomically<T, F>(&mut self, operation: &'static str, caller: AccountId, now: Timestamp, op: F) -> Result<T, Error>
    where
        F: FnOnce(&mut ProtocolState, &mut Call<'_>) -> Result<T, Error>,
    {
        let mut staged = self.state.clone();
        let mut emitted = Vec::new();

        let result = {
            let mut call = Call::new(caller, now, &mut emitted);
            op(&mut staged, &mut call)
        };

        match result {
            Ok(value) => {
                debug!(
                    operation,
                    caller = %caller,
                    now,
                    events = emitted.len(),
                    "operation committed"
                );
                self.state = staged;
                self.events.extend(emitted);
                Ok(value)
            }
            Err(err) => {
                warn!(operation, caller = %caller, now, error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    // ========================================================================
    // LEDGER OPERATIONS
    // ========================================================================

    pub fn add_member(&mut self, caller: &AccountId, now: Timestamp, role: Role, member: AccountId) -> Result<(), Error> {
        self.atomically("add_member", *caller, now, |state, call| {
            Ok(state.ledger.add_member(call, role, member)?)
        })
    }

    pub fn remove_member(&mut self, caller: &AccountId, now: Timestamp, role: Role, member: AccountId) -> Result<(), Error> {
        self.atomically("remove_member", *caller, now, |state, call| {
            Ok(state.ledger.remove_member(call, role, member)?)
        })
    }

    pub fn reset_member(&mut self, caller: &AccountId, now: Timestamp, role: Role, member: AccountId) -> Result<(), Error> {
        self.atomically("reset_member", *caller, now, |state, call| {
            Ok(state.ledger.reset_member(call, role, member)?)
        })
    }

    pub fn mint(&mut self, caller: &AccountId, now: Timestamp, to: AccountId, amount: Amount) -> Result<(), Error> {
        self.atomically("mint", *caller, now, |state, call| {
            Ok(state.ledger.mint(call, to, amount)?)
        })
    }

    pub fn burn(&mut self, caller: &AccountId, now: Timestamp, amount: Amount) -> Result<(), Error> {
        self.atomically("burn", *caller, now, |state, call| {
            Ok(state.ledger.burn(call, amount)?)
        })
    }

    pub fn transfer(&mut self, caller: &AccountId, now: Timestamp, to: AccountId, amount: Amount) -> Result<(), Error> {
        self.atomically("transfer", *caller, now, |state, call| {
            Ok(state.ledger.transfer(call, to, amount)?)
        })
    }

    pub fn approve(&mut self, caller: &AccountId, now: Timestamp, spender: AccountId, amount: Amount) -> Result<(), Error> {
        self.atomically("approve", *caller, now, |state, call| {
            Ok(state.ledger.approve(call, spender, amount)?)
        })
    }

    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        now: Timestamp,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), Error> {
        self.atomically("transfer_from", *caller, now, |state, call| {
            Ok(state.ledger.transfer_from(call, from, to, amount)?)
        })
    }

    pub fn snapshot(&mut self, caller: &AccountId, now: Timestamp) -> Result<SnapshotId, Error> {
        self.atomically("snapshot", *caller, now, |state, call| {
            Ok(state.ledger.snapshot(call))
        })
    }

    // ========================================================================
    // ORACLE OPERATIONS
    // ========================================================================

    pub fn propose_outcome(
        &mut self,
        caller: &AccountId,
        now: Timestamp,
        question_id: QuestionId,
        outcome: Outcome,
        bond: Amount,
    ) -> Result<(), Error> {
        self.atomically("propose_outcome", *caller, now, |state, call| {
            Ok(state
                .oracle
                .propose_outcome(call, &mut state.ledger, question_id, outcome, bond)?)
        })
    }

    /// Dispute a proposal; returns the deadline of the opened ballot
    pub fn dispute_outcome(
        &mut self,
        caller: &AccountId,
        now: Timestamp,
        question_id: QuestionId,
        bond: Amount,
    ) -> Result<Timestamp, Error> {
        self.atomically("dispute_outcome", *caller, now, |state, call| {
            let ProtocolState {
                ledger,
                oracle,
                arbiter,
            } = state;
            Ok(oracle.dispute_outcome(call, ledger, arbiter, question_id, bond)?)
        })
    }

    pub fn finalize_outcome(&mut self, caller: &AccountId, now: Timestamp, question_id: QuestionId) -> Result<Outcome, Error> {
        self.atomically("finalize_outcome", *caller, now, |state, call| {
            Ok(state
                .oracle
                .finalize_outcome(call, &mut state.ledger, question_id)?)
        })
    }

    /// Direct arbiter entry point; succeeds only for the oracle's current arbiter
    pub fn resolve(
        &mut self,
        caller: &AccountId,
        now: Timestamp,
        question_id: QuestionId,
        winning_outcome: Outcome,
    ) -> Result<(), Error> {
        self.atomically("resolve", *caller, now, |state, call| {
            Ok(state
                .oracle
                .resolve(call, &mut state.ledger, question_id, winning_outcome)?)
        })
    }

    pub fn set_arbiter(&mut self, caller: &AccountId, now: Timestamp, new_arbiter: AccountId) -> Result<(), Error> {
        self.atomically("set_arbiter", *caller, now, |state, call| {
            Ok(state.oracle.set_arbiter(call, new_arbiter)?)
        })
    }

    pub fn get_outcome(&self, question_id: &QuestionId) -> Result<Outcome, Error> {
        Ok(self.state.oracle.get_outcome(question_id)?)
    }

    // ========================================================================
    // ARBITER OPERATIONS
    // ========================================================================

    pub fn stake(&mut self, caller: &AccountId, now: Timestamp, amount: Amount) -> Result<(), Error> {
        self.atomically("stake", *caller, now, |state, call| {
            Ok(state.arbiter.stake(call, &mut state.ledger, amount)?)
        })
    }

    pub fn unstake(&mut self, caller: &AccountId, now: Timestamp, amount: Amount) -> Result<(), Error> {
        self.atomically("unstake", *caller, now, |state, call| {
            Ok(state.arbiter.unstake(call, &mut state.ledger, amount)?)
        })
    }

    /// Direct court entry point; succeeds only for the oracle's identity
    pub fn create_dispute(&mut self, caller: &AccountId, now: Timestamp, question_id: QuestionId) -> Result<Timestamp, Error> {
        self.atomically("create_dispute", *caller, now, |state, call| {
            Ok(state.arbiter.create_dispute(call, question_id)?)
        })
    }

    /// Vote with the caller's current stake; returns the weight cast
    pub fn vote(&mut self, caller: &AccountId, now: Timestamp, question_id: QuestionId, outcome: Outcome) -> Result<Amount, Error> {
        self.atomically("vote", *caller, now, |state, call| {
            Ok(state.arbiter.vote(call, question_id, outcome)?)
        })
    }

    pub fn tally_and_resolve(&mut self, caller: &AccountId, now: Timestamp, question_id: QuestionId) -> Result<Outcome, Error> {
        self.atomically("tally_and_resolve", *caller, now, |state, call| {
            let ProtocolState {
                ledger,
                oracle,
                arbiter,
            } = state;
            Ok(arbiter.tally_and_resolve(call, ledger, oracle, question_id)?)
        })
    }

    // ========================================================================
    // INVARIANTS
    // ========================================================================

    /// Total supply equals all balances, and the component accounts hold at
    /// least the staked total and the live bonds
    pub fn conservation_holds(&self) -> bool {
        let ledger = &self.state.ledger;
        let custody = ledger.balance_of(self.state.arbiter.custody_account());
        let escrow = ledger.balance_of(self.state.oracle.escrow_account());

        ledger.sum_of_balances() == Some(ledger.total_supply())
            && custody >= self.state.arbiter.total_staked()
            && escrow >= self.state.oracle.escrowed_total()
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Serialize the committed state (pending events are not included)
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        postcard::to_allocvec(&self.state).map_err(|e| Error::Codec(e.to_string()))
    }

    /// Restore a protocol from bytes produced by [`Protocol::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let state: ProtocolState = postcard::from_bytes(bytes).map_err(|e| Error::Codec(e.to_string()))?;
        Ok(Self {
            state,
            events: Vec::new(),
        })
    }

    /// True if both instances hold identical committed state
    pub fn same_state(&self, other: &Protocol) -> bool {
        self.state == other.state
    }
}
