//! In-memory [`Store`] implementation for tests.
//!
//! A `BTreeMap` behind `std::sync::RwLock`; partition lookups scan a key
//! range the way a partition query would.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::entries::{KEYWORD_PREFIX, ORG_PREFIX};
use crate::error::IndexError;
use crate::models::IndexEntry;

use super::{BatchOutcome, Store};

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<(String, String), IndexEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put_batch(&self, batch: &[IndexEntry]) -> Result<BatchOutcome, IndexError> {
        let mut entries = self.entries.write().unwrap();
        let mut outcome = BatchOutcome::default();
        for entry in batch {
            let key = (entry.key.partition.clone(), entry.key.sort.clone());
            if entries.contains_key(&key) {
                outcome.duplicates.push(entry.key.clone());
            } else {
                entries.insert(key, entry.clone());
                outcome.written += 1;
            }
        }
        Ok(outcome)
    }

    async fn get_entry(
        &self,
        partition: &str,
        sort: &str,
    ) -> Result<Option<IndexEntry>, IndexError> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .get(&(partition.to_string(), sort.to_string()))
            .cloned())
    }

    async fn keyword_lookup(
        &self,
        token: &str,
        limit: i64,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let partition = format!("{}{}", KEYWORD_PREFIX, token);
        let entries = self.entries.read().unwrap();
        Ok(entries
            .range((partition.clone(), String::new())..)
            .take_while(|((p, _), _)| *p == partition)
            .take(limit.max(0) as usize)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn keywords_for(&self, org_id: &str) -> Result<Vec<String>, IndexError> {
        let org_ref = format!("{}{}", ORG_PREFIX, org_id);
        let entries = self.entries.read().unwrap();
        Ok(entries
            .keys()
            .filter(|(partition, sort)| {
                *sort == org_ref && partition.starts_with(KEYWORD_PREFIX)
            })
            .map(|(partition, _)| partition[KEYWORD_PREFIX.len()..].to_string())
            .collect())
    }
}
