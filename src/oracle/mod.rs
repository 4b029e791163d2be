// Oracle module - THE QUESTION BOOK
// Bonded proposals, disputes within a window, and finalization

mod config;
mod optimistic;
mod resolution;

pub use config::OracleConfig;
pub use optimistic::{DisputeCourt, Oracle, OracleError};
pub use resolution::{Outcome, Resolution, ResolutionState};
