// Protocol configuration - genesis wiring of the three components

use crate::error::Error;
use crate::identity::AccountId;
use crate::ledger::TokenMetadata;
use crate::oracle::OracleConfig;
use crate::arbiter::VOTING_PERIOD_SECONDS;
use serde::{Deserialize, Serialize};

/// Everything needed to build a fresh protocol instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Initial holder of the ledger's Owner role
    pub owner: AccountId,
    /// Ledger identity of the oracle (bond escrow, caller of the court)
    pub oracle_account: AccountId,
    /// Ledger identity of the arbiter (stake custody, caller of resolve)
    pub arbiter_account: AccountId,
    pub token: TokenMetadata,
    pub oracle: OracleConfig,
    pub voting_period_seconds: u64,
}

impl ProtocolConfig {
    /// Default configuration with `owner` as the ledger owner
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    pub fn with_oracle_account(mut self, account: AccountId) -> Self {
        self.oracle_account = account;
        self
    }

    pub fn with_arbiter_account(mut self, account: AccountId) -> Self {
        self.arbiter_account = account;
        self
    }

    pub fn with_token(mut self, token: TokenMetadata) -> Self {
        self.token = token;
        self
    }

    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_voting_period_seconds(mut self, seconds: u64) -> Self {
        self.voting_period_seconds = seconds;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.oracle_account == self.arbiter_account {
            return Err(Error::InvalidConfig(
                "oracle and arbiter must use distinct accounts".to_string(),
            ));
        }
        if self.owner == self.oracle_account || self.owner == self.arbiter_account {
            return Err(Error::InvalidConfig(
                "owner must not be a component account".to_string(),
            ));
        }
        if self.voting_period_seconds == 0 {
            return Err(Error::InvalidConfig(
                "voting_period_seconds must be > 0".to_string(),
            ));
        }
        self.oracle.validate()?;
        Ok(())
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            owner: AccountId::from_label("delphi:owner"),
            oracle_account: AccountId::from_label("delphi:oracle"),
            arbiter_account: AccountId::from_label("delphi:arbiter"),
            token: TokenMetadata::default(),
            oracle: OracleConfig::default(),
            voting_period_seconds: VOTING_PERIOD_SECONDS,
        }
    }
}
