// Crate-level error - aggregates the per-component errors

use crate::arbiter::ArbiterError;
use crate::ledger::LedgerError;
use crate::oracle::OracleError;
use crate::storage::StoreError;
use thiserror::Error;

/// Coarse classification of every failure the core can report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Role, arbiter or oracle-identity check failed
    Unauthorized,
    /// Exclusive/shared role used with the wrong operation
    InvalidRoleOperation,
    /// Payment did not match the required bond exactly
    InvalidBond,
    /// Operation attempted in the wrong phase
    InvalidState,
    InvalidAmount,
    InsufficientBalance,
    InsufficientAllowance,
    InsufficientStake,
    InvalidSnapshot,
    NotResolved,
    Overflow,
    InvalidConfig,
    Storage,
}

/// Any error produced by the protocol core
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Arbiter(#[from] ArbiterError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("State encoding failed: {0}")]
    Codec(String),
}

impl Error {
    /// Classification of the innermost failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Ledger(e) => e.kind(),
            Error::Oracle(e) => e.kind(),
            Error::Arbiter(e) => e.kind(),
            Error::Storage(_) | Error::Codec(_) => ErrorKind::Storage,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}
