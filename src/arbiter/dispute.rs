// Dispute records - a stake-weighted ballot over the four outcomes

use crate::identity::AccountId;
use crate::oracle::Outcome;
use crate::types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stake-weighted vote totals, indexed by outcome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally([Amount; 4]);

impl Tally {
    pub fn weight(&self, outcome: Outcome) -> Amount {
        self.0[outcome.index()]
    }

    /// Add weight to an outcome; `None` on overflow
    pub(crate) fn checked_add(&mut self, outcome: Outcome, weight: Amount) -> Option<Amount> {
        let slot = &mut self.0[outcome.index()];
        *slot = slot.checked_add(weight)?;
        Some(*slot)
    }

    /// Outcome with the strictly greatest weight; ties go to the lowest index
    pub fn winner(&self) -> Outcome {
        let mut best = Outcome::No;
        for outcome in Outcome::ALL {
            if self.weight(outcome) > self.weight(best) {
                best = outcome;
            }
        }
        best
    }

    pub fn total(&self) -> Amount {
        self.0.iter().fold(0u128, |acc, w| acc.saturating_add(*w))
    }
}

/// Ballot for one disputed question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    created_at: Timestamp,
    deadline: Timestamp,
    tally: Tally,
    /// voter -> chosen outcome
    votes: BTreeMap<AccountId, Outcome>,
    resolved: bool,
    winning_outcome: Option<Outcome>,
}

impl Dispute {
    pub(crate) fn open(created_at: Timestamp, deadline: Timestamp) -> Self {
        Self {
            created_at,
            deadline,
            tally: Tally::default(),
            votes: BTreeMap::new(),
            resolved: false,
            winning_outcome: None,
        }
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last instant at which votes are accepted
    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn winning_outcome(&self) -> Option<Outcome> {
        self.winning_outcome
    }

    pub fn has_voted(&self, voter: &AccountId) -> bool {
        self.votes.contains_key(voter)
    }

    pub fn vote_of(&self, voter: &AccountId) -> Option<Outcome> {
        self.votes.get(voter).copied()
    }

    pub fn voter_count(&self) -> usize {
        self.votes.len()
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        !self.resolved && now <= self.deadline
    }

    /// Record a ballot; the caller has already checked eligibility
    pub(crate) fn record_vote(&mut self, voter: AccountId, outcome: Outcome, weight: Amount) -> Option<Amount> {
        let total = self.tally.checked_add(outcome, weight)?;
        self.votes.insert(voter, outcome);
        Some(total)
    }

    pub(crate) fn close(&mut self, winner: Outcome) {
        self.resolved = true;
        self.winning_outcome = Some(winner);
    }
}
