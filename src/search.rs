//! Keyword search over the entry table.
//!
//! The query runs through the same tokenizer as ingestion; each token's
//! partition is fetched and organisations are ranked by how many query
//! tokens matched. Every hit already carries the full denormalized
//! payload, so no second lookup is needed.

use std::collections::HashMap;

use anyhow::Result;

use crate::config::Config;
use crate::entries::ORG_PREFIX;
use crate::keywords::tokenize;
use crate::models::IndexEntry;
use crate::store::Store;

struct Hit {
    entry: IndexEntry,
    matches: usize,
}

pub async fn run_search(
    config: &Config,
    store: &dyn Store,
    query: &str,
    limit: Option<i64>,
) -> Result<()> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let final_limit = limit.unwrap_or(config.search.limit);

    // Merge partitions, keyed by the organisation reference in the sort key.
    let mut hits: HashMap<String, Hit> = HashMap::new();
    for token in &tokens {
        for entry in store
            .keyword_lookup(token, config.search.candidates)
            .await?
        {
            hits.entry(entry.key.sort.clone())
                .and_modify(|hit| hit.matches += 1)
                .or_insert(Hit { entry, matches: 1 });
        }
    }

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let mut ranked: Vec<Hit> = hits.into_values().collect();
    ranked.sort_by(|a, b| {
        b.matches.cmp(&a.matches).then_with(|| {
            a.entry
                .payload
                .organisation_name
                .cmp(&b.entry.payload.organisation_name)
        })
    });
    ranked.truncate(final_limit.max(0) as usize);

    for (i, hit) in ranked.iter().enumerate() {
        let payload = &hit.entry.payload;
        let org_id = hit
            .entry
            .key
            .sort
            .strip_prefix(ORG_PREFIX)
            .unwrap_or(&hit.entry.key.sort);

        println!(
            "{}. {} ({}/{} keywords)",
            i + 1,
            payload.organisation_name,
            hit.matches,
            tokens.len()
        );
        println!("   id: {}", org_id);
        if !payload.town.is_empty() {
            if payload.county.is_empty() {
                println!("   town: {}", payload.town);
            } else {
                println!("   town: {}, {}", payload.town, payload.county);
            }
        }
        if !payload.type_rating.is_empty() {
            println!("   rating: {}", payload.type_rating);
        }
        if !payload.routes.is_empty() {
            println!("   routes: {}", payload.routes.join(" | "));
        }
        println!();
    }

    Ok(())
}
