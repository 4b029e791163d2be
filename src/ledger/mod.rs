// Ledger module - THE TOKEN
// Role-gated balances, allowances and checkpointed snapshots

mod checkpoint;
mod roles;
mod state;

pub use checkpoint::{Checkpoint, Checkpoints};
pub use roles::{Role, RoleError, RoleKind, RoleSet};
pub use state::{Ledger, LedgerError, LedgerStatistics, TokenMetadata};
