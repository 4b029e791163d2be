// Arbiter module - THE DAO
// Staking, stake-weighted ballots, and write-back of verdicts to the oracle

mod dao;
mod dispute;

pub use dao::{Arbiter, ArbiterError, VOTING_PERIOD_SECONDS};
pub use dispute::{Dispute, Tally};
