use std::collections::{BTreeMap, HashMap};

use crate::commit::PendingCommit;
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::record::{Record, RecordField, RecordId, TabId};

use super::id_allocator::IdAllocator;
use super::tab_buffer::TabBuffer;
use super::visible::VisibleRecords;

/// Owner of every tab's snapshot, edit buffer, and dirty flag.
///
/// The set of tabs is fixed at construction. All mutations go through
/// explicit calls keyed by tab id; no other component touches the buffers.
#[derive(Debug)]
pub struct EditBufferStore {
    /// Per-tab state, one entry per configured tab
    tabs: HashMap<TabId, TabBuffer>,
    /// Id source for records added through this store
    ids: IdAllocator,
    /// Sequence number for the next commit ticket
    next_sequence: u64,
}

impl EditBufferStore {
    /// Creates a store for the given tabs, none of them loaded yet.
    ///
    /// # Arguments
    /// * `tabs` - Ids of the configured tabs
    /// * `min_bootstrap_id` - Lowest id handed out for new records
    pub fn new<I>(tabs: I, min_bootstrap_id: RecordId) -> Self
    where
        I: IntoIterator<Item = TabId>,
    {
        Self {
            tabs: tabs
                .into_iter()
                .map(|tab| (tab, TabBuffer::default()))
                .collect(),
            ids: IdAllocator::new(min_bootstrap_id),
            next_sequence: 1,
        }
    }

    /// Creates a store for the tabs listed in the configuration.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            config.tabs.iter().map(|tab| tab.id.clone()),
            config.min_bootstrap_id,
        )
    }

    /// Returns `true` if the tab is part of this store.
    pub fn contains_tab(&self, tab: &str) -> bool {
        self.tabs.contains_key(tab)
    }

    /// Loads a tab's committed records, discarding any unsaved edits.
    ///
    /// Resets the dirty flag and seeds the id allocator above every loaded id.
    pub fn load(&mut self, tab: &TabId, records: Vec<Record>) -> Result<()> {
        let buffer = self.buffer_mut(tab)?;
        buffer.replace(tab, records);
        let ids: Vec<RecordId> = buffer.snapshot.keys().copied().collect();
        let count = ids.len();
        self.ids.seed(tab, ids);
        tracing::debug!(
            "Loaded {} records into tab '{}', next id {:?}",
            count,
            tab,
            self.ids.peek(tab)
        );
        Ok(())
    }

    /// Replaces one field of a buffered record from raw input.
    ///
    /// Input is coerced, never rejected. Marks the tab dirty.
    pub fn mutate(
        &mut self,
        tab: &TabId,
        id: RecordId,
        field: RecordField,
        raw: &str,
    ) -> Result<()> {
        let buffer = self.loaded_buffer_mut(tab)?;
        buffer.record_mut(tab, id)?.apply(field, raw);
        buffer.touch();
        tracing::debug!("Tab '{}' record {}: {} <- {:?}", tab, id, field, raw);
        Ok(())
    }

    /// Adds a placeholder record with a freshly allocated id.
    ///
    /// # Returns
    /// `Result<RecordId, EditorError>` containing the new record's id, or
    /// `IdSpaceExhausted` when no unused id is left. Buffered records are
    /// never replaced.
    pub fn add_record(&mut self, tab: &TabId) -> Result<RecordId> {
        self.loaded_buffer_mut(tab)?;
        let exhausted = || EditorError::IdSpaceExhausted { tab: tab.clone() };
        let id = self.ids.next(tab).ok_or_else(exhausted)?;
        let buffer = self.loaded_buffer_mut(tab)?;
        if buffer.edits.contains_key(&id) {
            tracing::warn!("Tab '{}': allocated id {} is already buffered", tab, id);
            return Err(exhausted());
        }
        buffer.edits.insert(id, Record::placeholder(id));
        buffer.touch();
        tracing::debug!("Tab '{}': added record {}", tab, id);
        Ok(id)
    }

    /// Soft-deletes a buffered record. Marks the tab dirty.
    pub fn mark_deleted(&mut self, tab: &TabId, id: RecordId) -> Result<()> {
        self.set_deleted(tab, id, true)
    }

    /// Clears the soft-delete mark on a buffered record. Marks the tab dirty.
    pub fn restore(&mut self, tab: &TabId, id: RecordId) -> Result<()> {
        self.set_deleted(tab, id, false)
    }

    /// Flips the soft-delete mark on a buffered record.
    ///
    /// # Returns
    /// `Result<bool, EditorError>` containing the new `is_deleted` value.
    pub fn toggle_deleted(&mut self, tab: &TabId, id: RecordId) -> Result<bool> {
        let deleted = !self.record(tab, id)?.is_deleted;
        self.set_deleted(tab, id, deleted)?;
        Ok(deleted)
    }

    fn set_deleted(&mut self, tab: &TabId, id: RecordId, deleted: bool) -> Result<()> {
        let buffer = self.loaded_buffer_mut(tab)?;
        buffer.record_mut(tab, id)?.is_deleted = deleted;
        buffer.touch();
        tracing::debug!("Tab '{}' record {}: deleted = {}", tab, id, deleted);
        Ok(())
    }

    /// Returns the tab's displayable records in ascending id order.
    ///
    /// Records created and deleted before any commit are never included.
    /// A tab that has not been loaded yields nothing.
    pub fn visible_records(&self, tab: &TabId) -> Result<VisibleRecords<'_>> {
        let buffer = self.buffer(tab)?;
        if buffer.loaded {
            Ok(VisibleRecords::new(&buffer.edits))
        } else {
            Ok(VisibleRecords::empty())
        }
    }

    /// Returns a buffered record, including purged ones.
    pub fn record(&self, tab: &TabId, id: RecordId) -> Result<&Record> {
        self.buffer(tab)?
            .edits
            .get(&id)
            .ok_or_else(|| EditorError::RecordNotFound {
                tab: tab.clone(),
                id,
            })
    }

    /// Returns the tab's last committed records in ascending id order.
    pub fn snapshot(&self, tab: &TabId) -> Result<impl Iterator<Item = &Record> + '_> {
        Ok(self.buffer(tab)?.snapshot.values())
    }

    /// Returns whether the tab has unsaved edits.
    pub fn is_dirty(&self, tab: &TabId) -> Result<bool> {
        Ok(self.buffer(tab)?.dirty)
    }

    /// Returns whether a commit for the tab is outstanding.
    pub fn is_saving(&self, tab: &TabId) -> Result<bool> {
        Ok(self.buffer(tab)?.in_flight.is_some())
    }

    /// Returns whether the tab's records have been loaded.
    pub fn is_loaded(&self, tab: &TabId) -> Result<bool> {
        Ok(self.buffer(tab)?.loaded)
    }

    /// Returns the ids of all tabs with unsaved edits, sorted.
    pub fn dirty_tabs(&self) -> Vec<TabId> {
        let mut dirty: Vec<TabId> = self
            .tabs
            .iter()
            .filter(|(_, buffer)| buffer.dirty)
            .map(|(tab, _)| tab.clone())
            .collect();
        dirty.sort();
        dirty
    }

    /// Returns the id the next added record in this tab would receive, or
    /// `None` once the tab's id space is exhausted.
    pub fn next_id(&self, tab: &TabId) -> Result<Option<RecordId>> {
        self.buffer(tab)?;
        Ok(self.ids.peek(tab))
    }

    /// Freezes the tab's commit set and marks the tab as saving.
    pub(crate) fn begin_commit(&mut self, tab: &TabId) -> Result<PendingCommit> {
        let sequence = self.next_sequence;
        let buffer = self.loaded_buffer_mut(tab)?;
        if buffer.in_flight.is_some() {
            return Err(EditorError::CommitInFlight { tab: tab.clone() });
        }

        let captured = buffer.edits.clone();
        let records: Vec<Record> = captured
            .values()
            .filter(|record| !record.is_purged())
            .cloned()
            .collect();

        buffer.in_flight = Some(sequence);
        let revision = buffer.revision;
        self.next_sequence += 1;

        Ok(PendingCommit {
            tab: tab.clone(),
            sequence,
            revision,
            captured,
            records,
        })
    }

    /// Promotes a persisted commit set to the tab's snapshot.
    ///
    /// Records untouched since capture take their persisted form. Records
    /// edited while the commit was in flight keep their edits and leave the
    /// tab dirty. Records purged by the commit leave the buffer; records
    /// added after capture stay.
    ///
    /// # Returns
    /// `Result<Vec<Record>, EditorError>` containing the new snapshot.
    pub(crate) fn reconcile(
        &mut self,
        pending: PendingCommit,
        persisted: Vec<Record>,
    ) -> Result<Vec<Record>> {
        let tab = pending.tab.clone();
        let buffer = self.in_flight_buffer_mut(&pending)?;

        let mut snapshot = BTreeMap::new();
        for mut record in persisted {
            if record.is_purged() {
                tracing::warn!(
                    "Store returned uncommitted deleted record {} for tab '{}', dropping",
                    record.id,
                    tab
                );
                continue;
            }
            record.is_new = false;
            snapshot.insert(record.id, record);
        }

        let previous = std::mem::take(&mut buffer.edits);
        let mut edits = BTreeMap::new();
        for (id, current) in previous {
            let untouched = pending.captured.get(&id) == Some(&current);
            match snapshot.get(&id) {
                Some(committed) if untouched => {
                    edits.insert(id, committed.clone());
                }
                Some(_) => {
                    let mut current = current;
                    current.is_new = false;
                    edits.insert(id, current);
                }
                None if untouched => {}
                None => {
                    edits.insert(id, current);
                }
            }
        }
        for (id, committed) in &snapshot {
            edits
                .entry(*id)
                .or_insert_with(|| committed.clone());
        }

        buffer.edits = edits;
        buffer.snapshot = snapshot;
        buffer.in_flight = None;
        buffer.dirty = buffer.revision != pending.revision;
        let dirty = buffer.dirty;
        let committed: Vec<Record> = buffer.snapshot.values().cloned().collect();

        self.ids.seed(&tab, committed.iter().map(|record| record.id));
        tracing::info!(
            "Committed {} records for tab '{}' (#{}, dirty after commit: {})",
            committed.len(),
            tab,
            pending.sequence,
            dirty
        );
        Ok(committed)
    }

    /// Releases the saving flag after a failed commit, leaving state untouched.
    pub(crate) fn abandon_commit(&mut self, pending: &PendingCommit) -> Result<()> {
        let buffer = self.in_flight_buffer_mut(pending)?;
        buffer.in_flight = None;
        Ok(())
    }

    fn in_flight_buffer_mut(&mut self, pending: &PendingCommit) -> Result<&mut TabBuffer> {
        let buffer = self.buffer_mut(&pending.tab)?;
        if buffer.in_flight != Some(pending.sequence) {
            return Err(EditorError::StaleCommit {
                tab: pending.tab.clone(),
                sequence: pending.sequence,
            });
        }
        Ok(buffer)
    }

    fn buffer(&self, tab: &TabId) -> Result<&TabBuffer> {
        self.tabs
            .get(tab)
            .ok_or_else(|| EditorError::UnknownTab { tab: tab.clone() })
    }

    fn buffer_mut(&mut self, tab: &TabId) -> Result<&mut TabBuffer> {
        self.tabs
            .get_mut(tab)
            .ok_or_else(|| EditorError::UnknownTab { tab: tab.clone() })
    }

    fn loaded_buffer_mut(&mut self, tab: &TabId) -> Result<&mut TabBuffer> {
        let buffer = self.buffer_mut(tab)?;
        if !buffer.loaded {
            return Err(EditorError::TabNotLoaded { tab: tab.clone() });
        }
        Ok(buffer)
    }
}
