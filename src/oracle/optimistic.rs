// Optimistic Oracle - bonded proposals that stand unless challenged in time

use crate::arbiter::ArbiterError;
use crate::call::Call;
use crate::error::ErrorKind;
use crate::event::Event;
use crate::identity::{AccountId, QuestionId};
use crate::ledger::{Ledger, LedgerError};
use crate::oracle::config::OracleConfig;
use crate::oracle::resolution::{Outcome, Resolution, ResolutionState};
use crate::types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// DISPUTE COURT TRAIT
// ============================================================================

/// Where disputed questions are sent for adjudication.
///
/// The oracle invokes the court with its own identity as the caller; the
/// court must check that identity before opening anything.
pub trait DisputeCourt {
    /// Open a dispute for `question_id`, returning its voting deadline
    fn create_dispute(&mut self, call: &mut Call<'_>, question_id: QuestionId) -> Result<Timestamp, ArbiterError>;
}

// ============================================================================
// ORACLE ERROR
// ============================================================================

/// Errors that can occur during oracle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Caller {caller} is not authorized for this operation")]
    Unauthorized { caller: AccountId },

    #[error("Invalid bond: expected {expected}, provided {provided}")]
    InvalidBond { expected: Amount, provided: Amount },

    #[error("Question already has a proposal")]
    AlreadyProposed,

    #[error("Question has no proposal")]
    NotProposed,

    #[error("Question is already disputed")]
    AlreadyDisputed,

    #[error("Question is not disputed")]
    NotDisputed,

    #[error("Question is already resolved")]
    AlreadyResolved,

    #[error("Dispute window closed at {closes_at} (now {now})")]
    DisputeWindowClosed { closes_at: Timestamp, now: Timestamp },

    #[error("Dispute window is open until {closes_at} (now {now})")]
    DisputeWindowIsOpen { closes_at: Timestamp, now: Timestamp },

    #[error("Question is not resolved")]
    NotResolved,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Dispute court rejected the dispute: {0}")]
    Court(Box<ArbiterError>),
}

impl From<ArbiterError> for OracleError {
    fn from(err: ArbiterError) -> Self {
        OracleError::Court(Box::new(err))
    }
}

impl OracleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::Unauthorized { .. } => ErrorKind::Unauthorized,
            OracleError::InvalidBond { .. } => ErrorKind::InvalidBond,
            OracleError::AlreadyProposed
            | OracleError::NotProposed
            | OracleError::AlreadyDisputed
            | OracleError::NotDisputed
            | OracleError::AlreadyResolved
            | OracleError::DisputeWindowClosed { .. }
            | OracleError::DisputeWindowIsOpen { .. } => ErrorKind::InvalidState,
            OracleError::NotResolved => ErrorKind::NotResolved,
            OracleError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            OracleError::Ledger(e) => e.kind(),
            OracleError::Court(e) => e.kind(),
        }
    }

    /// Error for an operation that needed a different phase
    fn wrong_phase(state: ResolutionState) -> Self {
        match state {
            ResolutionState::None => OracleError::NotProposed,
            ResolutionState::Proposed => OracleError::NotDisputed,
            ResolutionState::Disputed => OracleError::AlreadyDisputed,
            ResolutionState::Resolved => OracleError::AlreadyResolved,
        }
    }
}

// ============================================================================
// ORACLE
// ============================================================================

/// Per-question proposal / dispute / finalize state machine.
///
/// Bonds are held as the ledger balance of the oracle's own `escrow`
/// identity, which is also the identity it presents to its court.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    escrow: AccountId,
    arbiter: AccountId,
    config: OracleConfig,
    dispute_bond: Amount,
    resolutions: BTreeMap<QuestionId, Resolution>,
}

impl Oracle {
    /// Create an oracle; fails if the config does not validate
    pub fn new(escrow: AccountId, arbiter: AccountId, config: OracleConfig) -> Result<Self, OracleError> {
        config.validate()?;
        let dispute_bond = config.dispute_bond()?;
        Ok(Self {
            escrow,
            arbiter,
            config,
            dispute_bond,
            resolutions: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn arbiter(&self) -> &AccountId {
        &self.arbiter
    }

    /// Identity holding escrowed bonds on the ledger
    pub fn escrow_account(&self) -> &AccountId {
        &self.escrow
    }

    pub fn proposal_bond(&self) -> Amount {
        self.config.proposal_bond
    }

    pub fn dispute_bond(&self) -> Amount {
        self.dispute_bond
    }

    pub fn resolution(&self, question_id: &QuestionId) -> Option<&Resolution> {
        self.resolutions.get(question_id)
    }

    pub fn state(&self, question_id: &QuestionId) -> ResolutionState {
        self.resolutions
            .get(question_id)
            .map(Resolution::state)
            .unwrap_or(ResolutionState::None)
    }

    pub fn resolutions(&self) -> impl Iterator<Item = (&QuestionId, &Resolution)> {
        self.resolutions.iter()
    }

    /// Sum of bonds the escrow identity should currently hold
    pub fn escrowed_total(&self) -> Amount {
        self.resolutions.values().map(Resolution::escrowed).sum()
    }

    /// Final outcome of a resolved question
    pub fn get_outcome(&self, question_id: &QuestionId) -> Result<Outcome, OracleError> {
        self.resolutions
            .get(question_id)
            .and_then(Resolution::final_outcome)
            .ok_or(OracleError::NotResolved)
    }

    /// The caller, unless it is the escrow identity itself
    fn participant(&self, call: &Call<'_>) -> Result<AccountId, OracleError> {
        let caller = call.caller();
        if caller == self.escrow {
            return Err(OracleError::Unauthorized { caller });
        }
        Ok(caller)
    }

    fn closes_at(&self, resolution: &Resolution) -> Timestamp {
        resolution
            .proposed_at()
            .saturating_add(self.config.dispute_window_seconds)
    }

    // ========================================================================
    // PROPOSE
    // ========================================================================

    /// Propose `outcome` for a fresh question, posting `bond` from the caller
    pub fn propose_outcome(
        &mut self,
        call: &mut Call<'_>,
        ledger: &mut Ledger,
        question_id: QuestionId,
        outcome: Outcome,
        bond: Amount,
    ) -> Result<(), OracleError> {
        if self.resolutions.contains_key(&question_id) {
            return Err(OracleError::AlreadyProposed);
        }
        if bond != self.config.proposal_bond {
            return Err(OracleError::InvalidBond {
                expected: self.config.proposal_bond,
                provided: bond,
            });
        }

        let proposer = self.participant(call)?;
        ledger.transfer(call, self.escrow, bond)?;

        self.resolutions
            .insert(question_id, Resolution::proposed(proposer, outcome, bond, call.now()));

        call.emit(Event::QuestionProposed {
            question_id,
            proposer,
            outcome,
        });
        Ok(())
    }

    // ========================================================================
    // DISPUTE
    // ========================================================================

    /// Challenge a proposal inside its window and hand it to `court`
    pub fn dispute_outcome(
        &mut self,
        call: &mut Call<'_>,
        ledger: &mut Ledger,
        court: &mut dyn DisputeCourt,
        question_id: QuestionId,
        bond: Amount,
    ) -> Result<Timestamp, OracleError> {
        let resolution = self
            .resolutions
            .get(&question_id)
            .ok_or(OracleError::NotProposed)?;
        if resolution.state() != ResolutionState::Proposed {
            return Err(OracleError::wrong_phase(resolution.state()));
        }

        let closes_at = self.closes_at(resolution);
        if call.now() > closes_at {
            return Err(OracleError::DisputeWindowClosed {
                closes_at,
                now: call.now(),
            });
        }
        if bond != self.dispute_bond {
            return Err(OracleError::InvalidBond {
                expected: self.dispute_bond,
                provided: bond,
            });
        }

        let disputer = self.participant(call)?;
        ledger.transfer(call, self.escrow, bond)?;
        let deadline = court.create_dispute(&mut call.as_caller(self.escrow), question_id)?;

        if let Some(resolution) = self.resolutions.get_mut(&question_id) {
            resolution.mark_disputed(disputer, bond, call.now());
        }

        call.emit(Event::QuestionDisputed {
            question_id,
            disputer,
        });
        Ok(deadline)
    }

    // ========================================================================
    // FINALIZE
    // ========================================================================

    /// Accept an unchallenged proposal once its window has passed
    pub fn finalize_outcome(
        &mut self,
        call: &mut Call<'_>,
        ledger: &mut Ledger,
        question_id: QuestionId,
    ) -> Result<Outcome, OracleError> {
        let resolution = self
            .resolutions
            .get(&question_id)
            .ok_or(OracleError::NotProposed)?;
        if resolution.state() != ResolutionState::Proposed {
            return Err(OracleError::wrong_phase(resolution.state()));
        }

        let closes_at = self.closes_at(resolution);
        if call.now() <= closes_at {
            return Err(OracleError::DisputeWindowIsOpen {
                closes_at,
                now: call.now(),
            });
        }

        let proposer = *resolution.proposer();
        let outcome = resolution.proposed_outcome();
        let bond = resolution.proposal_bond();

        ledger.transfer(&mut call.as_caller(self.escrow), proposer, bond)?;

        if let Some(resolution) = self.resolutions.get_mut(&question_id) {
            resolution.mark_resolved(outcome);
        }

        call.emit(Event::QuestionResolved {
            question_id,
            final_outcome: outcome,
        });
        Ok(outcome)
    }

    // ========================================================================
    // ARBITER ENTRY POINTS
    // ========================================================================

    /// Settle a disputed question with the arbiter's verdict
    pub fn resolve(
        &mut self,
        call: &mut Call<'_>,
        ledger: &mut Ledger,
        question_id: QuestionId,
        winning_outcome: Outcome,
    ) -> Result<(), OracleError> {
        if call.caller() != self.arbiter {
            return Err(OracleError::Unauthorized {
                caller: call.caller(),
            });
        }

        let resolution = self
            .resolutions
            .get(&question_id)
            .ok_or(OracleError::NotProposed)?;
        if resolution.state() != ResolutionState::Disputed {
            return Err(OracleError::wrong_phase(resolution.state()));
        }

        let proposer = *resolution.proposer();
        let disputer = *resolution
            .disputer()
            .ok_or(OracleError::NotDisputed)?;
        let proposal_bond = resolution.proposal_bond();
        let dispute_bond = resolution.dispute_bond();
        let pot = proposal_bond + dispute_bond;

        let payouts: Vec<(AccountId, Amount)> = if winning_outcome == resolution.proposed_outcome() {
            vec![(proposer, pot)]
        } else if resolution.proposed_outcome().opposite() == Some(winning_outcome) {
            vec![(disputer, pot)]
        } else {
            vec![(proposer, proposal_bond), (disputer, dispute_bond)]
        };

        {
            let mut escrow = call.as_caller(self.escrow);
            for (recipient, amount) in payouts {
                ledger.transfer(&mut escrow, recipient, amount)?;
            }
        }

        if let Some(resolution) = self.resolutions.get_mut(&question_id) {
            resolution.mark_resolved(winning_outcome);
        }

        call.emit(Event::QuestionResolved {
            question_id,
            final_outcome: winning_outcome,
        });
        Ok(())
    }

    /// Hand the arbiter capability to `new_arbiter` (current arbiter only)
    pub fn set_arbiter(&mut self, call: &mut Call<'_>, new_arbiter: AccountId) -> Result<(), OracleError> {
        if call.caller() != self.arbiter {
            return Err(OracleError::Unauthorized {
                caller: call.caller(),
            });
        }
        let previous = std::mem::replace(&mut self.arbiter, new_arbiter);
        call.emit(Event::ArbiterChanged {
            previous,
            arbiter: new_arbiter,
        });
        Ok(())
    }
}
