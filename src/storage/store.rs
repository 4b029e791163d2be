// ProtocolStore - Persistent key-value storage using sled
//
// Provides typed access for storing:
// - Committed protocol state (ledger, oracle, arbiter)
// - The append-only event journal

use crate::event::Event;
use crate::protocol::Protocol;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Key prefixes for organizing data
mod keys {
    pub const PROTOCOL_STATE: &[u8] = b"protocol:state";
    pub const EVENT_PREFIX: &[u8] = b"events:";
    pub const EVENT_SEQUENCE: &[u8] = b"meta:event_sequence";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of keys in the database
    pub key_count: usize,
    /// Number of journaled events
    pub event_count: u64,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent store for protocol state and its event journal
///
/// Uses sled for crash-safe, embedded storage.
/// All writes are atomic and durable after flush.
pub struct ProtocolStore {
    db: sled::Db,
}

impl ProtocolStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref()).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        info!(path = %path.as_ref().display(), keys = db.len(), "protocol store opened");
        Ok(Self { db })
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let bytes = self
            .db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        info!(bytes, "protocol store flushed");
        Ok(())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        Ok(StorageStats {
            key_count: self.db.len(),
            event_count: self.event_count()?,
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    // ========================================================================
    // PROTOCOL STATE
    // ========================================================================

    /// Save the committed protocol state, replacing any previous one
    pub fn save_protocol(&self, protocol: &Protocol) -> Result<(), StoreError> {
        let bytes = protocol
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.db.insert(keys::PROTOCOL_STATE, bytes)?;
        Ok(())
    }

    /// Load the protocol state, if one was saved
    pub fn load_protocol(&self) -> Result<Option<Protocol>, StoreError> {
        match self.db.get(keys::PROTOCOL_STATE)? {
            Some(bytes) => {
                let protocol = Protocol::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(protocol))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // EVENT JOURNAL
    // ========================================================================

    /// Number of events journaled so far
    pub fn event_count(&self) -> Result<u64, StoreError> {
        match self.db.get(keys::EVENT_SEQUENCE)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.to_vec().try_into().map_err(|_| {
                    StoreError::DeserializationFailed("Invalid event sequence length".to_string())
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    fn event_key(sequence: u64) -> Vec<u8> {
        [keys::EVENT_PREFIX, &sequence.to_be_bytes()].concat()
    }

    /// Stage `events` after the current journal tail; returns the new count
    fn stage_events(&self, batch: &mut sled::Batch, events: &[Event]) -> Result<u64, StoreError> {
        let mut next = self.event_count()?;
        for event in events {
            let bytes = postcard::to_allocvec(event)
                .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
            batch.insert(Self::event_key(next), bytes);
            next += 1;
        }
        batch.insert(keys::EVENT_SEQUENCE, next.to_be_bytes().to_vec());
        Ok(next)
    }

    /// Append events to the journal in one batch; returns the new event count
    pub fn append_events(&self, events: &[Event]) -> Result<u64, StoreError> {
        let mut batch = sled::Batch::default();
        let count = self.stage_events(&mut batch, events)?;
        self.db.apply_batch(batch)?;
        Ok(count)
    }

    /// Load every journaled event, oldest first
    pub fn load_events(&self) -> Result<Vec<Event>, StoreError> {
        let mut events = Vec::new();
        for result in self.db.scan_prefix(keys::EVENT_PREFIX) {
            let (_, value) = result?;
            let event: Event = postcard::from_bytes(&value)
                .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
            events.push(event);
        }
        Ok(events)
    }

    /// Write the protocol state and journal its pending events in one batch.
    ///
    /// The pending events are drained from `protocol` only once the batch
    /// has been applied.
    pub fn commit(&self, protocol: &mut Protocol) -> Result<u64, StoreError> {
        let state = protocol
            .to_bytes()
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        let mut batch = sled::Batch::default();
        let count = self.stage_events(&mut batch, protocol.pending_events())?;
        batch.insert(keys::PROTOCOL_STATE, state);
        self.db.apply_batch(batch)?;

        protocol.poll_events();
        Ok(count)
    }
}
