// Arbiter DAO - stakers adjudicate disputed questions by weighted vote

use crate::arbiter::dispute::Dispute;
use crate::call::Call;
use crate::error::ErrorKind;
use crate::event::Event;
use crate::identity::{AccountId, QuestionId};
use crate::ledger::{Ledger, LedgerError};
use crate::oracle::{DisputeCourt, Oracle, OracleError, Outcome};
use crate::types::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Default length of a dispute's voting period: 72 hours
pub const VOTING_PERIOD_SECONDS: u64 = 72 * 60 * 60;

/// Errors that can occur during arbiter operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    #[error("Caller {caller} is not authorized for this operation")]
    Unauthorized { caller: AccountId },

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Insufficient stake: staked {staked}, requested {requested}")]
    InsufficientStake { staked: Amount, requested: Amount },

    #[error("A dispute already exists for this question")]
    DisputeExists,

    #[error("No dispute exists for this question")]
    UnknownDispute,

    /// `deadline` is `None` when no dispute was ever opened
    #[error("Voting is closed (deadline {deadline:?}, now {now})")]
    VotingClosed { deadline: Option<Timestamp>, now: Timestamp },

    #[error("Voting is open until {deadline} (now {now})")]
    VotingStillOpen { deadline: Timestamp, now: Timestamp },

    #[error("Caller has already voted on this dispute")]
    AlreadyVoted,

    #[error("Dispute is already resolved")]
    AlreadyResolved,

    #[error("Stake or tally would overflow")]
    Overflow,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),
}

impl ArbiterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArbiterError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ArbiterError::InvalidAmount => ErrorKind::InvalidAmount,
            ArbiterError::InsufficientStake { .. } => ErrorKind::InsufficientStake,
            ArbiterError::DisputeExists
            | ArbiterError::UnknownDispute
            | ArbiterError::VotingClosed { .. }
            | ArbiterError::VotingStillOpen { .. }
            | ArbiterError::AlreadyVoted
            | ArbiterError::AlreadyResolved => ErrorKind::InvalidState,
            ArbiterError::Overflow => ErrorKind::Overflow,
            ArbiterError::Ledger(e) => e.kind(),
            ArbiterError::Oracle(e) => e.kind(),
        }
    }
}

/// The dispute-resolution DAO.
///
/// Staked tokens sit on the ledger under the arbiter's `custody` identity,
/// which is also the identity it presents to the oracle when resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arbiter {
    custody: AccountId,
    oracle: AccountId,
    voting_period: u64,
    staked_balances: BTreeMap<AccountId, Amount>,
    disputes: BTreeMap<QuestionId, Dispute>,
}

impl Arbiter {
    /// Create an arbiter that accepts disputes only from `oracle`
    pub fn new(custody: AccountId, oracle: AccountId, voting_period: u64) -> Self {
        Self {
            custody,
            oracle,
            voting_period,
            staked_balances: BTreeMap::new(),
            disputes: BTreeMap::new(),
        }
    }

    /// Identity holding staked tokens on the ledger
    pub fn custody_account(&self) -> &AccountId {
        &self.custody
    }

    /// The only identity allowed to open disputes
    pub fn oracle(&self) -> &AccountId {
        &self.oracle
    }

    pub fn voting_period(&self) -> u64 {
        self.voting_period
    }

    pub fn staked_balance(&self, account: &AccountId) -> Amount {
        self.staked_balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_staked(&self) -> Amount {
        self.staked_balances.values().sum()
    }

    pub fn stakers(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.staked_balances.iter()
    }

    pub fn dispute(&self, question_id: &QuestionId) -> Option<&Dispute> {
        self.disputes.get(question_id)
    }

    pub fn disputes(&self) -> impl Iterator<Item = (&QuestionId, &Dispute)> {
        self.disputes.iter()
    }

    pub fn has_voted(&self, question_id: &QuestionId, voter: &AccountId) -> bool {
        self.disputes
            .get(question_id)
            .map(|d| d.has_voted(voter))
            .unwrap_or(false)
    }

    // ========================================================================
    // STAKING
    // ========================================================================

    /// Pull `amount` from the caller (who must have approved custody) into stake
    pub fn stake(&mut self, call: &mut Call<'_>, ledger: &mut Ledger, amount: Amount) -> Result<(), ArbiterError> {
        if amount == 0 {
            return Err(ArbiterError::InvalidAmount);
        }
        let staker = call.caller();
        if staker == self.custody {
            return Err(ArbiterError::Unauthorized { caller: staker });
        }
        let new_stake = self
            .staked_balance(&staker)
            .checked_add(amount)
            .ok_or(ArbiterError::Overflow)?;

        ledger.transfer_from(&mut call.as_caller(self.custody), staker, self.custody, amount)?;
        self.staked_balances.insert(staker, new_stake);

        call.emit(Event::Staked {
            account: staker,
            amount,
        });
        Ok(())
    }

    /// Return `amount` of the caller's stake to their ledger balance
    pub fn unstake(&mut self, call: &mut Call<'_>, ledger: &mut Ledger, amount: Amount) -> Result<(), ArbiterError> {
        if amount == 0 {
            return Err(ArbiterError::InvalidAmount);
        }
        let staker = call.caller();
        let staked = self.staked_balance(&staker);
        if staked < amount {
            return Err(ArbiterError::InsufficientStake {
                staked,
                requested: amount,
            });
        }

        ledger.transfer(&mut call.as_caller(self.custody), staker, amount)?;
        match staked - amount {
            0 => self.staked_balances.remove(&staker),
            remaining => self.staked_balances.insert(staker, remaining),
        };

        call.emit(Event::Unstaked {
            account: staker,
            amount,
        });
        Ok(())
    }

    // ========================================================================
    // VOTING
    // ========================================================================

    /// Cast the caller's current stake for `outcome`
    pub fn vote(&mut self, call: &mut Call<'_>, question_id: QuestionId, outcome: Outcome) -> Result<Amount, ArbiterError> {
        let voter = call.caller();
        let now = call.now();
        let weight = self.staked_balance(&voter);

        let dispute = self
            .disputes
            .get_mut(&question_id)
            .ok_or(ArbiterError::VotingClosed { deadline: None, now })?;
        if !dispute.is_open(now) {
            return Err(ArbiterError::VotingClosed {
                deadline: Some(dispute.deadline()),
                now,
            });
        }
        if dispute.has_voted(&voter) {
            return Err(ArbiterError::AlreadyVoted);
        }
        dispute
            .record_vote(voter, outcome, weight)
            .ok_or(ArbiterError::Overflow)?;

        call.emit(Event::Voted {
            voter,
            question_id,
            outcome,
            weight,
        });
        Ok(weight)
    }

    /// Close an expired ballot and write the winner into the oracle
    pub fn tally_and_resolve(
        &mut self,
        call: &mut Call<'_>,
        ledger: &mut Ledger,
        oracle: &mut Oracle,
        question_id: QuestionId,
    ) -> Result<Outcome, ArbiterError> {
        let now = call.now();
        let dispute = self
            .disputes
            .get_mut(&question_id)
            .ok_or(ArbiterError::UnknownDispute)?;
        if dispute.is_resolved() {
            return Err(ArbiterError::AlreadyResolved);
        }
        if now <= dispute.deadline() {
            return Err(ArbiterError::VotingStillOpen {
                deadline: dispute.deadline(),
                now,
            });
        }

        let winner = dispute.tally().winner();
        // Closed before the callback so the oracle cannot re-enter this ballot
        dispute.close(winner);

        call.emit(Event::DisputeResolved {
            question_id,
            winning_outcome: winner,
        });
        oracle.resolve(&mut call.as_caller(self.custody), ledger, question_id, winner)?;
        Ok(winner)
    }
}

impl DisputeCourt for Arbiter {
    fn create_dispute(&mut self, call: &mut Call<'_>, question_id: QuestionId) -> Result<Timestamp, ArbiterError> {
        if call.caller() != self.oracle {
            return Err(ArbiterError::Unauthorized {
                caller: call.caller(),
            });
        }
        if self.disputes.contains_key(&question_id) {
            return Err(ArbiterError::DisputeExists);
        }

        let created_at = call.now();
        let deadline = created_at
            .checked_add(self.voting_period)
            .ok_or(ArbiterError::Overflow)?;
        self.disputes
            .insert(question_id, Dispute::open(created_at, deadline));

        call.emit(Event::DisputeCreated {
            question_id,
            deadline,
        });
        Ok(deadline)
    }
}
