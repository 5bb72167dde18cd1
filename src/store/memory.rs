//! In-memory store backends.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{ChatStore, KeyValueStore, StoreError, StoreResult};
use crate::archive::ChatRecord;

#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl FromIterator<(String, String)> for MemoryKeyValueStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct MemoryChatState {
    // Insertion order is kept so `get_all` is deterministic.
    records: Vec<ChatRecord>,
    failing_deletes: HashSet<String>,
    failing_upserts: HashSet<String>,
}

/// Chat store kept entirely in memory.
///
/// Individual ids can be rigged to fail on delete or upsert so partial
/// failure handling can be exercised.
#[derive(Default)]
pub struct MemoryChatStore {
    state: Mutex<MemoryChatState>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ChatRecord>) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.lock() {
            state.records = records;
        }
        store
    }

    pub fn fail_delete_for(&self, id: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_deletes.insert(id.to_string());
        }
    }

    pub fn fail_upsert_for(&self, id: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_upserts.insert(id.to_string());
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.records.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, MemoryChatState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory chat store poisoned".to_string()))
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn get_all(&self) -> StoreResult<Vec<ChatRecord>> {
        Ok(self.lock()?.records.clone())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.failing_deletes.contains(id) {
            return Err(StoreError::Backend(format!("delete rejected for {id}")));
        }
        state.records.retain(|record| record.id != id);
        Ok(())
    }

    async fn upsert(
        &self,
        id: &str,
        messages: &[Value],
        url_id: Option<&str>,
        description: &str,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.failing_upserts.contains(id) {
            return Err(StoreError::Backend(format!("upsert rejected for {id}")));
        }
        let record = ChatRecord {
            id: id.to_string(),
            messages: messages.to_vec(),
            description: description.to_string(),
            url_id: url_id.map(str::to_string),
            timestamp: Some(Utc::now()),
        };
        match state.records.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => *existing = record,
            None => state.records.push(record),
        }
        Ok(())
    }
}
