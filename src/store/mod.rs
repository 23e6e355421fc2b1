//! Storage abstraction for the sponsor index.
//!
//! The [`Store`] trait covers the batch-write and point-read operations the
//! pipeline and CLI need, enabling pluggable backends. Any key-value store
//! or document database with batch writes and conditional inserts satisfies
//! it; the crate ships a SQLite backend and an in-memory one for tests.
//!
//! Implementations must be `Send + Sync` to work with the async runtime.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::IndexError;
use crate::models::{EntryKey, IndexEntry};

/// Hard cap on the number of writes one batch request may carry, matching
/// the maximum atomic batch size of the backing stores.
pub const MAX_BATCH_SIZE: usize = 25;

/// Result of one batch put.
#[derive(Debug, Default, Clone)]
pub struct BatchOutcome {
    /// Entries newly persisted by this call.
    pub written: usize,
    /// Keys that collided with existing entries and were skipped.
    pub duplicates: Vec<EntryKey>,
    /// Entries the backend accepted the request for but did not persist.
    /// The caller resubmits these as a new batch.
    pub unprocessed: Vec<IndexEntry>,
}

/// Abstract storage backend for index entries.
#[async_trait]
pub trait Store: Send + Sync {
    /// Write a batch of entries with insert-only semantics.
    ///
    /// A key collision never overwrites the existing entry and never fails
    /// the rest of the batch; collided keys are reported in
    /// [`BatchOutcome::duplicates`].
    async fn put_batch(&self, entries: &[IndexEntry]) -> Result<BatchOutcome, IndexError>;

    /// Point-read one entry by its compound key.
    async fn get_entry(
        &self,
        partition: &str,
        sort: &str,
    ) -> Result<Option<IndexEntry>, IndexError>;

    /// All entries in one keyword partition, up to `limit`.
    ///
    /// `token` is a keyword as produced by the tokenizer (uppercased,
    /// alphanumeric).
    async fn keyword_lookup(&self, token: &str, limit: i64)
        -> Result<Vec<IndexEntry>, IndexError>;

    /// The tokens under which one organisation is indexed.
    async fn keywords_for(&self, org_id: &str) -> Result<Vec<String>, IndexError>;
}
