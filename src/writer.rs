//! Batched, concurrency-limited writes to the store.
//!
//! Entries are partitioned into fixed-size batches, each written with
//! insert-only semantics and a bounded retry loop: items the backend
//! reports as unprocessed are resubmitted with exponential backoff until
//! the batch drains or the attempt ceiling is hit. A semaphore caps the
//! number of batches in flight, so a fast producer blocks in
//! [`BatchWriter::push`] while the store drains.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::IndexError;
use crate::models::{EntryKey, FailedBatch, IndexEntry};
use crate::store::Store;

/// Batching and retry policy for one seed run.
#[derive(Debug, Clone, Copy)]
pub struct WritePolicy {
    /// Entries per batch request. Bounded by the store's atomic batch cap.
    pub batch_size: usize,
    /// Maximum batches in flight at once.
    pub concurrency: usize,
    /// Maximum submissions per batch, counting the first.
    pub max_attempts: u32,
}

/// Outcome of writing one batch to completion (or exhaustion).
#[derive(Debug)]
pub struct BatchResult {
    pub written: u64,
    pub duplicates: Vec<EntryKey>,
    /// Present when the batch still had unwritten items after every attempt.
    pub failed: Option<FailedBatch>,
}

/// Counters accumulated across all batches of one run.
#[derive(Debug, Default)]
pub struct WriteStats {
    pub written: u64,
    pub duplicates: u64,
    pub failed_batches: Vec<FailedBatch>,
}

/// Write one batch, resubmitting unprocessed items until the batch drains
/// or `max_attempts` submissions have been made.
///
/// Duplicate-key collisions are skips, not failures; each skipped key is
/// logged and counted. Backoff between resubmissions is exponential
/// (1s, 2s, 4s, ...) capped at 32s.
pub async fn write_batch(
    store: &dyn Store,
    mut batch: Vec<IndexEntry>,
    max_attempts: u32,
) -> Result<BatchResult, IndexError> {
    let mut written = 0u64;
    let mut duplicates: Vec<EntryKey> = Vec::new();

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let delay = Duration::from_secs(1 << (attempt - 2).min(5));
            tokio::time::sleep(delay).await;
        }

        let outcome = store.put_batch(&batch).await?;
        written += outcome.written as u64;
        for key in outcome.duplicates {
            let skipped = IndexError::DuplicateKey {
                partition: key.partition.clone(),
                sort: key.sort.clone(),
            };
            eprintln!("skipped: {}", skipped);
            duplicates.push(key);
        }

        if outcome.unprocessed.is_empty() {
            return Ok(BatchResult {
                written,
                duplicates,
                failed: None,
            });
        }
        batch = outcome.unprocessed;
    }

    let sample: Vec<EntryKey> = batch.iter().take(3).map(|e| e.key.clone()).collect();
    Ok(BatchResult {
        written,
        duplicates,
        failed: Some(FailedBatch {
            attempts: max_attempts,
            remaining: batch.len(),
            sample,
        }),
    })
}

/// Accepts entries one at a time, flushing a write task whenever a full
/// batch is buffered.
pub struct BatchWriter {
    store: Arc<dyn Store>,
    policy: WritePolicy,
    limiter: Arc<Semaphore>,
    pending: Vec<IndexEntry>,
    tasks: JoinSet<Result<BatchResult, IndexError>>,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn Store>, policy: WritePolicy) -> Self {
        Self {
            store,
            limiter: Arc::new(Semaphore::new(policy.concurrency)),
            policy,
            pending: Vec::with_capacity(policy.batch_size),
            tasks: JoinSet::new(),
        }
    }

    /// Buffer one entry, spawning a write task once a batch is full.
    ///
    /// This is the pipeline's backpressure point: when every concurrency
    /// permit is taken, the producer blocks here until a batch completes.
    pub async fn push(&mut self, entry: IndexEntry) -> Result<(), IndexError> {
        self.pending.push(entry);
        if self.pending.len() >= self.policy.batch_size {
            let batch = std::mem::take(&mut self.pending);
            self.pending = Vec::with_capacity(self.policy.batch_size);
            self.submit(batch).await;
        }
        Ok(())
    }

    async fn submit(&mut self, batch: Vec<IndexEntry>) {
        let permit = self
            .limiter
            .clone()
            .acquire_owned()
            .await
            .expect("write limiter closed");
        let store = self.store.clone();
        let max_attempts = self.policy.max_attempts;
        self.tasks.spawn(async move {
            let result = write_batch(store.as_ref(), batch, max_attempts).await;
            drop(permit);
            result
        });
    }

    /// Flush the remainder and await every outstanding task.
    ///
    /// All tasks are drained even when one fails, so a transport error
    /// cannot leave writes running in the background; the first error is
    /// reported after the drain.
    pub async fn finish(mut self) -> Result<WriteStats, IndexError> {
        if !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            self.submit(batch).await;
        }

        let mut stats = WriteStats::default();
        let mut first_error: Option<IndexError> = None;
        while let Some(joined) = self.tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(err) => {
                    first_error.get_or_insert(IndexError::Transport(anyhow::anyhow!(
                        "write task panicked: {}",
                        err
                    )));
                    continue;
                }
            };
            match result {
                Ok(batch_result) => {
                    stats.written += batch_result.written;
                    stats.duplicates += batch_result.duplicates.len() as u64;
                    if let Some(failed) = batch_result.failed {
                        stats.failed_batches.push(failed);
                    }
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(stats),
        }
    }
}
