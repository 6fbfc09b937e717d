use std::collections::BTreeMap;

use crate::record::{Record, RecordId, TabId};

/// Ticket for a commit that has been issued but not yet resolved.
///
/// Holds the commit set frozen at issue time. Edits made to the tab after
/// the ticket was taken are not part of it. A ticket must be handed back to
/// [`CommitCoordinator::finish`](super::CommitCoordinator::finish) exactly
/// once; until then the tab reports `saving`.
#[derive(Debug)]
pub struct PendingCommit {
    pub(crate) tab: TabId,
    pub(crate) sequence: u64,
    /// Buffer revision at capture time
    pub(crate) revision: u64,
    /// Whole edit buffer at capture time, purged records included
    pub(crate) captured: BTreeMap<RecordId, Record>,
    /// Commit set: captured records minus purged ones, ascending by id
    pub(crate) records: Vec<Record>,
}

impl PendingCommit {
    pub fn tab(&self) -> &TabId {
        &self.tab
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Records to hand to the persistence collaborator.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Ids dropped from the commit set because they were created and deleted
    /// before being committed.
    pub fn purged_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.captured
            .values()
            .filter(|record| record.is_purged())
            .map(|record| record.id)
    }
}
