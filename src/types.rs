// Scalar types shared by every component

/// Token amount in base units (18 decimals)
pub type Amount = u128;

/// Seconds, supplied by the caller; the core never reads a clock
pub type Timestamp = u64;

/// Ledger snapshot identifier; 0 means "no snapshot taken yet"
pub type SnapshotId = u64;

/// Number of token decimals
pub const DECIMALS: u8 = 18;

/// One whole token in base units
pub const TOKEN_UNIT: Amount = 1_000_000_000_000_000_000;
