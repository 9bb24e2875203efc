//! Core data types for the storage layer.

use serde::{Deserialize, Serialize};

/// Name of the record written into a freshly created store.
pub const SEED_RECORD_NAME: &str = "Title";

/// Payload of the record written into a freshly created store.
pub const SEED_RECORD_PAYLOAD: &str = "Copied Text";

/// A named snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// User-facing label, unique within a store (case-sensitive)
    pub name: String,

    /// Text handed back to the caller (e.g. for the clipboard)
    pub payload: String,
}

impl Record {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

/// Ordered list of records. Insertion order is preserved on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Exact, case-sensitive lookup.
    pub fn find(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.name.as_str()).collect()
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Remove the record with `name`, returning it if it was present.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Record> {
        let index = self.records.iter().position(|record| record.name == name)?;
        Some(self.records.remove(index))
    }
}

impl From<Vec<Record>> for RecordCollection {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The collection a new store starts with.
pub fn seed_collection() -> RecordCollection {
    RecordCollection::from(vec![Record::new(SEED_RECORD_NAME, SEED_RECORD_PAYLOAD)])
}
