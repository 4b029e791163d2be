use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuestionIdError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    #[error("Invalid question ID length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-width identifier of an oracle question
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId([u8; 32]);

impl QuestionId {
    /// Derive the ID of a question from its text (Keccak-256)
    pub fn from_text(text: &str) -> Self {
        let digest = Keccak256::digest(text.as_bytes());
        Self(digest.into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a hex string, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, QuestionIdError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| QuestionIdError::InvalidHex(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| QuestionIdError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Hex form with a `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId(0x{})", hex::encode(&self.0[..8]))
    }
}

impl FromStr for QuestionId {
    type Err = QuestionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
