use std::collections::BTreeMap;

use crate::error::{EditorError, Result};
use crate::record::{Record, RecordId, TabId};

/// Snapshot and edit buffer for a single tab.
///
/// The snapshot is the last collection known to be committed; the edit
/// buffer starts as a copy of it and diverges as the user edits.
#[derive(Debug, Default)]
pub(crate) struct TabBuffer {
    /// Last committed records, keyed by id
    pub(crate) snapshot: BTreeMap<RecordId, Record>,
    /// Working copy, a superset of the snapshot's ids
    pub(crate) edits: BTreeMap<RecordId, Record>,
    /// Unsaved divergence since the last load or successful commit
    pub(crate) dirty: bool,
    /// Bumped on every mutation; lets a commit detect edits made while it was in flight
    pub(crate) revision: u64,
    /// Set once records have been loaded
    pub(crate) loaded: bool,
    /// Sequence number of the outstanding commit, if any
    pub(crate) in_flight: Option<u64>,
}

impl TabBuffer {
    /// Replaces both snapshot and edit buffer with a freshly loaded collection.
    ///
    /// Loaded records are committed by definition, so `is_new` is cleared.
    /// Purged records cannot be committed and are dropped. Later duplicates
    /// of an id win.
    pub(crate) fn replace(&mut self, tab: &TabId, records: Vec<Record>) {
        let mut snapshot = BTreeMap::new();
        for mut record in records {
            if record.is_purged() {
                tracing::warn!(
                    "Dropping uncommitted deleted record {} from load of tab '{}'",
                    record.id,
                    tab
                );
                continue;
            }
            record.is_new = false;
            if let Some(previous) = snapshot.insert(record.id, record) {
                tracing::warn!(
                    "Duplicate record id {} in load of tab '{}', keeping last",
                    previous.id,
                    tab
                );
            }
        }

        self.edits = snapshot.clone();
        self.snapshot = snapshot;
        self.dirty = false;
        self.revision += 1;
        self.loaded = true;
        if let Some(sequence) = self.in_flight.take() {
            tracing::warn!(
                "Reload of tab '{}' supersedes in-flight commit #{}",
                tab,
                sequence
            );
        }
    }

    /// Records that the edit buffer changed.
    pub(crate) fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    pub(crate) fn record_mut(&mut self, tab: &TabId, id: RecordId) -> Result<&mut Record> {
        self.edits
            .get_mut(&id)
            .ok_or_else(|| EditorError::RecordNotFound {
                tab: tab.clone(),
                id,
            })
    }
}
