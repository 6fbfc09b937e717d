use std::collections::btree_map;
use std::iter::FusedIterator;

use crate::record::{Record, RecordId};

/// Lazy view over a tab's displayable records.
///
/// Yields buffered records in ascending id order, skipping records that were
/// created and deleted before any commit. Cloning the view restarts it from
/// the current position; the view never mutates the buffer.
#[derive(Debug, Clone)]
pub struct VisibleRecords<'a> {
    inner: Option<btree_map::Values<'a, RecordId, Record>>,
}

impl<'a> VisibleRecords<'a> {
    pub(crate) fn new(edits: &'a btree_map::BTreeMap<RecordId, Record>) -> Self {
        Self {
            inner: Some(edits.values()),
        }
    }

    /// A view with nothing in it, used for tabs that have not been loaded.
    pub(crate) fn empty() -> Self {
        Self { inner: None }
    }
}

impl<'a> Iterator for VisibleRecords<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.inner.as_mut()?;
        values.find(|record| !record.is_purged())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(values) => (0, values.size_hint().1),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for VisibleRecords<'_> {}
