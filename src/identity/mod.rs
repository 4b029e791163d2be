// Identity module - who is calling and what is being asked
// Accounts are opaque 32-byte identities; questions are Keccak-256 digests

mod account;
mod question;

pub use account::{AccountId, AccountIdError};
pub use question::{QuestionId, QuestionIdError};
