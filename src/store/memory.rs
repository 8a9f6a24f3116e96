use std::collections::BTreeMap;

use super::{ContentRecord, ContentStore, StoreError};

/// In-memory [`ContentStore`] keyed by record identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, ContentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records, rejecting duplicate identifiers.
    pub fn from_records(
        records: impl IntoIterator<Item = ContentRecord>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, record: ContentRecord) -> Result<(), StoreError> {
        if self.records.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ContentStore for MemoryStore {
    fn get_record(&self, id: &str) -> Result<ContentRecord, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn records(&self) -> Vec<&ContentRecord> {
        self.records.values().collect()
    }
}
