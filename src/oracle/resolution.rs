// Resolution records - one per question, advancing monotonically

use crate::identity::AccountId;
use crate::types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer to an oracle question
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Outcome {
    No,
    Yes,
    Split,
    EarlyRequest,
}

impl Outcome {
    /// All outcomes in index order; tie-breaks favour the earliest
    pub const ALL: [Outcome; 4] = [Outcome::No, Outcome::Yes, Outcome::Split, Outcome::EarlyRequest];

    pub fn index(&self) -> usize {
        match self {
            Outcome::No => 0,
            Outcome::Yes => 1,
            Outcome::Split => 2,
            Outcome::EarlyRequest => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Outcome> {
        Outcome::ALL.get(index).copied()
    }

    /// The binary counter-claim a disputer implicitly makes
    pub fn opposite(&self) -> Option<Outcome> {
        match self {
            Outcome::No => Some(Outcome::Yes),
            Outcome::Yes => Some(Outcome::No),
            Outcome::Split | Outcome::EarlyRequest => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::No => "NO",
            Outcome::Yes => "YES",
            Outcome::Split => "SPLIT",
            Outcome::EarlyRequest => "EARLY_REQUEST",
        };
        f.write_str(name)
    }
}

/// Phase of a question. `None` is never stored; it is the absence of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionState {
    None,
    Proposed,
    Disputed,
    Resolved,
}

/// Everything the oracle knows about one question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    state: ResolutionState,
    proposer: AccountId,
    proposed_outcome: Outcome,
    proposal_bond: Amount,
    proposed_at: Timestamp,
    disputer: Option<AccountId>,
    dispute_bond: Amount,
    disputed_at: Option<Timestamp>,
    final_outcome: Option<Outcome>,
}

impl Resolution {
    pub(crate) fn proposed(proposer: AccountId, outcome: Outcome, bond: Amount, now: Timestamp) -> Self {
        Self {
            state: ResolutionState::Proposed,
            proposer,
            proposed_outcome: outcome,
            proposal_bond: bond,
            proposed_at: now,
            disputer: None,
            dispute_bond: 0,
            disputed_at: None,
            final_outcome: None,
        }
    }

    pub(crate) fn mark_disputed(&mut self, disputer: AccountId, bond: Amount, now: Timestamp) {
        self.state = ResolutionState::Disputed;
        self.disputer = Some(disputer);
        self.dispute_bond = bond;
        self.disputed_at = Some(now);
    }

    pub(crate) fn mark_resolved(&mut self, outcome: Outcome) {
        self.state = ResolutionState::Resolved;
        self.final_outcome = Some(outcome);
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn proposer(&self) -> &AccountId {
        &self.proposer
    }

    pub fn proposed_outcome(&self) -> Outcome {
        self.proposed_outcome
    }

    pub fn proposal_bond(&self) -> Amount {
        self.proposal_bond
    }

    pub fn proposed_at(&self) -> Timestamp {
        self.proposed_at
    }

    pub fn disputer(&self) -> Option<&AccountId> {
        self.disputer.as_ref()
    }

    pub fn dispute_bond(&self) -> Amount {
        self.dispute_bond
    }

    pub fn disputed_at(&self) -> Option<Timestamp> {
        self.disputed_at
    }

    pub fn final_outcome(&self) -> Option<Outcome> {
        self.final_outcome
    }

    /// Bonds still held in escrow for this question
    pub fn escrowed(&self) -> Amount {
        match self.state {
            ResolutionState::Resolved | ResolutionState::None => 0,
            ResolutionState::Proposed => self.proposal_bond,
            ResolutionState::Disputed => self.proposal_bond + self.dispute_bond,
        }
    }
}
