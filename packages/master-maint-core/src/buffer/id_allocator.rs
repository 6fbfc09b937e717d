use std::collections::HashMap;

use crate::record::{RecordId, TabId};

/// Per-tab monotonic id generator for new records.
///
/// Ids handed out for a tab are strictly increasing and never fall at or
/// below an id that was seeded for that tab. The counter only moves forward:
/// re-seeding with lower ids has no effect. Once `RecordId::MAX` has been
/// seeded or handed out the tab's id space is exhausted and stays so.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    /// Lowest id ever handed out for any tab
    floor: RecordId,
    /// Next id to hand out per tab; `None` once the id space is used up
    next: HashMap<TabId, Option<RecordId>>,
}

impl IdAllocator {
    /// Creates an allocator whose counters start no lower than `floor`.
    pub fn new(floor: RecordId) -> Self {
        Self {
            floor,
            next: HashMap::new(),
        }
    }

    /// Raises the tab's counter above every id in `ids`.
    pub fn seed<I>(&mut self, tab: &TabId, ids: I)
    where
        I: IntoIterator<Item = RecordId>,
    {
        let floor = self.floor;
        let above_existing = match ids.into_iter().max() {
            Some(max) => max.checked_add(1),
            None => Some(floor),
        };
        let next = self.next.entry(tab.clone()).or_insert(Some(floor));
        *next = match (*next, above_existing) {
            (Some(current), Some(above)) => Some(current.max(above).max(floor)),
            _ => None,
        };
        if next.is_none() {
            tracing::warn!("Id space exhausted for tab '{}'", tab);
        }
    }

    /// Returns a fresh id for the tab and advances its counter.
    ///
    /// # Returns
    /// `None` if every id above the tab's highest known id is taken.
    pub fn next(&mut self, tab: &TabId) -> Option<RecordId> {
        let floor = self.floor;
        let next = self.next.entry(tab.clone()).or_insert(Some(floor));
        let id = (*next)?;
        *next = id.checked_add(1);
        Some(id)
    }

    /// Returns the id the next call to [`IdAllocator::next`] would hand out.
    pub fn peek(&self, tab: &TabId) -> Option<RecordId> {
        self.next.get(tab).copied().unwrap_or(Some(self.floor))
    }

    /// Returns the configured bootstrap floor.
    pub fn floor(&self) -> RecordId {
        self.floor
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}
