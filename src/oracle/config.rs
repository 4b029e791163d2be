// Oracle configuration

use crate::oracle::OracleError;
use crate::types::{Amount, TOKEN_UNIT};
use serde::{Deserialize, Serialize};

/// Bond economics and liveness of the optimistic oracle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Exact bond a proposer must post
    pub proposal_bond: Amount,
    /// Dispute bond = proposal bond * multiplier
    pub dispute_bond_multiplier: u32,
    /// Seconds after a proposal during which it may be disputed
    pub dispute_window_seconds: u64,
}

impl OracleConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proposal_bond(mut self, bond: Amount) -> Self {
        self.proposal_bond = bond;
        self
    }

    pub fn with_dispute_bond_multiplier(mut self, multiplier: u32) -> Self {
        self.dispute_bond_multiplier = multiplier;
        self
    }

    pub fn with_dispute_window_seconds(mut self, seconds: u64) -> Self {
        self.dispute_window_seconds = seconds;
        self
    }

    /// Bond a disputer must post
    pub fn dispute_bond(&self) -> Result<Amount, OracleError> {
        self.proposal_bond
            .checked_mul(Amount::from(self.dispute_bond_multiplier))
            .ok_or_else(|| OracleError::InvalidConfig("dispute bond overflows".to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), OracleError> {
        if self.proposal_bond == 0 {
            return Err(OracleError::InvalidConfig(
                "proposal_bond must be > 0".to_string(),
            ));
        }
        if self.dispute_bond_multiplier == 0 {
            return Err(OracleError::InvalidConfig(
                "dispute_bond_multiplier must be > 0".to_string(),
            ));
        }
        if self.dispute_window_seconds == 0 {
            return Err(OracleError::InvalidConfig(
                "dispute_window_seconds must be > 0".to_string(),
            ));
        }
        self.dispute_bond()?;
        Ok(())
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            proposal_bond: 100 * TOKEN_UNIT,
            dispute_bond_multiplier: 2,
            dispute_window_seconds: 2 * 60 * 60,
        }
    }
}
