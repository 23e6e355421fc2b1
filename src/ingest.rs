//! The seed pipeline: CSV rows → aggregation → entry building → batched
//! writes.
//!
//! Rows stream through the aggregator one at a time, so only the distinct
//! organisations are held in memory. Once the input ends, entries are built
//! per organisation and flushed to the writer as each batch fills, so
//! writing starts before every entry exists in memory and the writer's
//! concurrency limit pushes back on the producer. A failing input stream
//! stops intake, but everything already read is still written before the
//! error propagates.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::aggregate::Aggregator;
use crate::config::Config;
use crate::entries::build_entries;
use crate::error::IndexError;
use crate::keywords::tokenize;
use crate::models::SponsorRow;
use crate::progress::{SeedProgressEvent, SeedProgressReporter};
use crate::store::Store;
use crate::writer::{BatchWriter, WritePolicy};

pub async fn run_seed(
    config: &Config,
    store: Arc<dyn Store>,
    input: &Path,
    limit: Option<u64>,
    dry_run: bool,
    progress: &dyn SeedProgressReporter,
) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(input)
        .with_context(|| format!("Failed to open CSV input: {}", input.display()))?;

    let mut aggregator = Aggregator::new();
    let mut read_error: Option<csv::Error> = None;

    for result in reader.deserialize::<SponsorRow>() {
        match result {
            Ok(row) => aggregator.push(&row),
            Err(err) => {
                // Keep what was read; the error propagates after the flush.
                read_error = Some(err);
                break;
            }
        }
        if aggregator.rows_read() % 1000 == 0 {
            progress.report(SeedProgressEvent::Aggregating {
                rows: aggregator.rows_read(),
            });
        }
        if let Some(lim) = limit {
            if aggregator.rows_read() >= lim {
                break;
            }
        }
    }

    let rows_read = aggregator.rows_read();
    let rows_skipped = aggregator.rows_skipped();
    let organisations = aggregator.len() as u64;

    if dry_run {
        let estimated: u64 = aggregator
            .finish()
            .iter()
            .map(|org| tokenize(&org.name).len() as u64 + 1)
            .sum();
        println!("seed {} (dry-run)", input.display());
        println!("  rows read: {}", rows_read);
        println!("  rows skipped: {}", rows_skipped);
        println!("  organisations: {}", organisations);
        println!("  entries estimated: {}", estimated);
        return match read_error {
            Some(err) => Err(anyhow::Error::from(err).context("CSV input ended early")),
            None => Ok(()),
        };
    }

    let policy = WritePolicy {
        batch_size: config.ingest.batch_size,
        concurrency: config.ingest.concurrency,
        max_attempts: config.ingest.max_retries,
    };
    let mut writer = BatchWriter::new(store, policy);

    let mut entries_built = 0u64;
    let mut invalid_skipped = 0u64;
    let orgs = aggregator.finish();
    let total = orgs.len() as u64;
    for (i, org) in orgs.iter().enumerate() {
        let built = match build_entries(org) {
            Ok(built) => built,
            Err(IndexError::InvalidInput(reason)) => {
                eprintln!("skipping organisation: {}", reason);
                invalid_skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        entries_built += built.entries.len() as u64;
        for entry in built.entries {
            writer.push(entry).await?;
        }
        if (i as u64 + 1) % 100 == 0 {
            progress.report(SeedProgressEvent::Writing {
                organisations: i as u64 + 1,
                total,
            });
        }
    }

    let stats = match writer.finish().await {
        Ok(stats) => stats,
        Err(err) => {
            // Counts gathered before the abort still get reported.
            println!("seed {} (aborted)", input.display());
            println!("  rows read: {}", rows_read);
            println!("  rows skipped: {}", rows_skipped);
            println!("  organisations: {}", organisations);
            println!("  entries built: {}", entries_built);
            return Err(anyhow::Error::from(err).context("seed aborted before all writes finished"));
        }
    };

    println!("seed {}", input.display());
    println!("  rows read: {}", rows_read);
    println!("  rows skipped: {}", rows_skipped);
    println!("  organisations: {}", organisations);
    if invalid_skipped > 0 {
        println!("  organisations skipped: {}", invalid_skipped);
    }
    println!("  entries built: {}", entries_built);
    println!("  entries written: {}", stats.written);
    println!("  duplicates skipped: {}", stats.duplicates);

    if !stats.failed_batches.is_empty() {
        println!("  failed batches: {}", stats.failed_batches.len());
        let mut remaining = 0usize;
        for failed in &stats.failed_batches {
            remaining += failed.remaining;
            let keys: Vec<String> = failed.sample.iter().map(|k| k.to_string()).collect();
            println!(
                "    {} entries unwritten after {} attempts (e.g. {})",
                failed.remaining,
                failed.attempts,
                keys.join(", ")
            );
        }
        return Err(IndexError::PartialBatchFailure {
            batches: stats.failed_batches.len(),
            remaining,
        }
        .into());
    }

    if let Some(err) = read_error {
        return Err(anyhow::Error::from(err)
            .context("CSV input ended early; rows read so far were written"));
    }

    println!("ok");
    Ok(())
}
