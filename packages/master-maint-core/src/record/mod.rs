//! Record, field, and tab definitions.

mod field;
mod tab;

pub use field::{coerce_age, Gender, RecordField};
pub use tab::{Tab, TabId};

use serde::{Deserialize, Serialize};

/// Identity of a record within a tab's collection.
pub type RecordId = u64;

/// Age assigned to freshly added records.
pub const DEFAULT_AGE: i64 = 20;

/// A flat, editable master-data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique id within the owning tab
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Age in years
    pub age: i64,
    /// Gender classification
    pub gender: Gender,
    /// Postal address
    pub address: String,
    /// Created in the edit buffer and not yet committed
    #[serde(default)]
    pub is_new: bool,
    /// Soft-deleted, pending commit
    #[serde(default)]
    pub is_deleted: bool,
}

impl Record {
    /// Creates a committed, live record.
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        age: i64,
        gender: Gender,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            gender,
            address: address.into(),
            is_new: false,
            is_deleted: false,
        }
    }

    /// Creates the placeholder row inserted by "add record".
    pub fn placeholder(id: RecordId) -> Self {
        Self {
            id,
            name: format!("新規ユーザー_{}", id),
            age: DEFAULT_AGE,
            gender: Gender::Unset,
            address: String::new(),
            is_new: true,
            is_deleted: false,
        }
    }

    /// Returns `true` if the record was created and deleted before any commit.
    ///
    /// Such records are never shown and never persisted.
    pub fn is_purged(&self) -> bool {
        self.is_new && self.is_deleted
    }

    /// Replaces one field from raw user input.
    ///
    /// Input is coerced rather than rejected: a non-numeric age becomes 0
    /// and an unrecognized gender becomes [`Gender::Unset`].
    pub fn apply(&mut self, field: RecordField, raw: &str) {
        match field {
            RecordField::Name => self.name = raw.to_string(),
            RecordField::Age => self.age = coerce_age(raw),
            RecordField::Gender => self.gender = Gender::coerce(raw),
            RecordField::Address => self.address = raw.to_string(),
        }
    }
}
