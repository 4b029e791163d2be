// Checkpoints - sparse per-account history, reconstructed lazily by snapshot id

use crate::types::{Amount, SnapshotId};
use serde::{Deserialize, Serialize};

/// Value of a quantity as observed from `snapshot_id` onwards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub snapshot_id: SnapshotId,
    pub value: Amount,
}

/// Append-only history of one quantity, strictly increasing in snapshot id.
///
/// A write tagged with the id of the next snapshot to be taken overwrites the
/// last entry when it carries the same id, so changes between two snapshots
/// collapse into a single entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    entries: Vec<Checkpoint>,
}

impl Checkpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` as visible from `snapshot_id` onwards
    pub fn record(&mut self, snapshot_id: SnapshotId, value: Amount) {
        match self.entries.last_mut() {
            Some(last) if last.snapshot_id == snapshot_id => last.value = value,
            last => {
                debug_assert!(last.map_or(true, |c| c.snapshot_id < snapshot_id));
                self.entries.push(Checkpoint { snapshot_id, value });
            }
        }
    }

    /// Value in the latest entry with `entry.snapshot_id <= snapshot_id`, or 0
    pub fn value_at(&self, snapshot_id: SnapshotId) -> Amount {
        let idx = self
            .entries
            .partition_point(|c| c.snapshot_id <= snapshot_id);
        match idx {
            0 => 0,
            n => self.entries[n - 1].value,
        }
    }

    pub fn latest(&self) -> Option<&Checkpoint> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.entries.iter()
    }
}
