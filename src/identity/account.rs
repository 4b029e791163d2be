use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ACCOUNT_PREFIX: &str = "acct:";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid account format: {0}")]
    InvalidFormat(String),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid account length: expected 32, got {0}")]
    InvalidLength(usize),
}

/// Opaque identity of a ledger participant, in the format: acct:<base58_bytes>
///
/// Authentication happens outside the core; an `AccountId` is simply the
/// identity an operation was authenticated as.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Generate a random account ID
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Derive a stable account ID from a human-readable label
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"account:");
        hasher.update(label.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse an account ID from its `acct:` string form
    pub fn parse(s: &str) -> Result<Self, AccountIdError> {
        let encoded = s
            .strip_prefix(ACCOUNT_PREFIX)
            .ok_or_else(|| AccountIdError::InvalidFormat(format!("missing '{}' prefix", ACCOUNT_PREFIX)))?;

        if encoded.is_empty() {
            return Err(AccountIdError::InvalidFormat("key part cannot be empty".into()));
        }

        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| AccountIdError::InvalidBase58(e.to_string()))?;

        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AccountIdError::InvalidLength(bytes.len()))?;

        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ACCOUNT_PREFIX, bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", hex::encode(&self.0[..6]))
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
