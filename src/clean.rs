//! CSV cleaning pass: one output row per organisation.
//!
//! Aggregates the raw sponsorship CSV without touching the store and
//! writes the merged rows back out, with each organisation's deduplicated
//! routes joined by `" | "`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::aggregate::Aggregator;
use crate::models::SponsorRow;

pub fn run_clean(input: &Path, output: &Path) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(input)
        .with_context(|| format!("Failed to open CSV input: {}", input.display()))?;

    let mut aggregator = Aggregator::new();
    for result in reader.deserialize::<SponsorRow>() {
        let row =
            result.with_context(|| format!("Failed to parse CSV row in {}", input.display()))?;
        aggregator.push(&row);
    }

    let rows_read = aggregator.rows_read();
    let rows_skipped = aggregator.rows_skipped();
    let orgs = aggregator.finish();

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("Failed to create CSV output: {}", output.display()))?;
    writer.write_record(["Organisation Name", "Town/City", "County", "Type & Rating", "Route"])?;
    for org in &orgs {
        let routes = org.routes.join(" | ");
        writer.write_record([
            org.name.as_str(),
            org.town.as_str(),
            org.county.as_str(),
            org.type_rating.as_str(),
            routes.as_str(),
        ])?;
    }
    writer.flush()?;

    println!("clean {}", input.display());
    println!("  rows read: {}", rows_read);
    println!("  rows skipped: {}", rows_skipped);
    println!("  organisations written: {}", orgs.len());
    println!("  output: {}", output.display());
    Ok(())
}
