// Domain events - append-only record of every committed state change

use crate::identity::{AccountId, QuestionId};
use crate::ledger::Role;
use crate::oracle::Outcome;
use crate::types::{Amount, SnapshotId, Timestamp};
use serde::{Deserialize, Serialize};

/// Events emitted by committed operations, for external indexers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Balance moved; `from` is `None` for mints, `to` is `None` for burns
    Transfer {
        from: Option<AccountId>,
        to: Option<AccountId>,
        amount: Amount,
    },
    Approval {
        owner: AccountId,
        spender: AccountId,
        amount: Amount,
    },
    Snapshot {
        id: SnapshotId,
    },
    RoleMemberAdded {
        role: Role,
        member: AccountId,
    },
    RoleMemberRemoved {
        role: Role,
        member: AccountId,
    },
    RoleReset {
        role: Role,
        previous: AccountId,
        member: AccountId,
    },
    QuestionProposed {
        question_id: QuestionId,
        proposer: AccountId,
        outcome: Outcome,
    },
    QuestionDisputed {
        question_id: QuestionId,
        disputer: AccountId,
    },
    QuestionResolved {
        question_id: QuestionId,
        final_outcome: Outcome,
    },
    ArbiterChanged {
        previous: AccountId,
        arbiter: AccountId,
    },
    Staked {
        account: AccountId,
        amount: Amount,
    },
    Unstaked {
        account: AccountId,
        amount: Amount,
    },
    DisputeCreated {
        question_id: QuestionId,
        deadline: Timestamp,
    },
    Voted {
        voter: AccountId,
        question_id: QuestionId,
        outcome: Outcome,
        weight: Amount,
    },
    DisputeResolved {
        question_id: QuestionId,
        winning_outcome: Outcome,
    },
}

impl Event {
    /// Stable event name, as an indexer would key it
    pub fn name(&self) -> &'static str {
        match self {
            Event::Transfer { .. } => "Transfer",
            Event::Approval { .. } => "Approval",
            Event::Snapshot { .. } => "Snapshot",
            Event::RoleMemberAdded { .. } => "RoleMemberAdded",
            Event::RoleMemberRemoved { .. } => "RoleMemberRemoved",
            Event::RoleReset { .. } => "RoleReset",
            Event::QuestionProposed { .. } => "QuestionProposed",
            Event::QuestionDisputed { .. } => "QuestionDisputed",
            Event::QuestionResolved { .. } => "QuestionResolved",
            Event::ArbiterChanged { .. } => "ArbiterChanged",
            Event::Staked { .. } => "Staked",
            Event::Unstaked { .. } => "Unstaked",
            Event::DisputeCreated { .. } => "DisputeCreated",
            Event::Voted { .. } => "Voted",
            Event::DisputeResolved { .. } => "DisputeResolved",
        }
    }
}
