// Protocol module - THE COMPOSITION ROOT
// Wires ledger, oracle and arbiter together and applies operations atomically

mod config;
mod engine;

pub use config::ProtocolConfig;
pub use engine::Protocol;
