//! Delphi: a checkpointed token ledger, an optimistic oracle, and a staking
//! DAO that arbitrates disputed oracle questions.
//!
//! The core is deterministic: callers supply the authenticated identity and
//! the current time with every operation, and identical inputs always yield
//! identical state.

pub mod arbiter;
pub mod call;
pub mod error;
pub mod event;
pub mod identity;
pub mod ledger;
pub mod oracle;
pub mod protocol;
pub mod storage;
pub mod types;

pub use error::{Error, ErrorKind};
pub use event::Event;
pub use protocol::{Protocol, ProtocolConfig};
pub use types::{Amount, SnapshotId, Timestamp, TOKEN_UNIT};
