//! Streaming aggregation of raw CSV rows into organisations.
//!
//! Rows arrive one at a time from an unbounded stream; only the set of
//! distinct organisations is held in memory. Rows sharing a name (compared
//! case-insensitively) merge into one record: scalar fields are
//! first-seen-wins and routes accumulate with deduplication.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::models::{Organisation, SponsorRow};

/// Folds a row stream into one [`Organisation`] per distinct name.
///
/// The aggregation map is instance state, created per run and consumed by
/// [`finish`](Aggregator::finish).
#[derive(Default)]
pub struct Aggregator {
    orgs: HashMap<String, Organisation>,
    order: Vec<String>,
    rows_read: u64,
    rows_skipped: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row into the aggregate.
    ///
    /// Rows without an organisation name are counted and skipped, not
    /// treated as errors. Empty routes are ignored.
    pub fn push(&mut self, row: &SponsorRow) {
        self.rows_read += 1;

        let name = row.organisation_name.trim();
        if name.is_empty() {
            self.rows_skipped += 1;
            return;
        }

        let merge_key = name.to_lowercase();
        let org = match self.orgs.entry(merge_key.clone()) {
            Entry::Vacant(slot) => {
                self.order.push(merge_key);
                slot.insert(Organisation {
                    name: name.to_string(),
                    town: row.town.trim().to_string(),
                    county: row.county.trim().to_string(),
                    type_rating: row.type_rating.trim().to_string(),
                    routes: Vec::new(),
                })
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let route = row.route.trim();
        if !route.is_empty() && !org.routes.iter().any(|r| r == route) {
            org.routes.push(route.to_string());
        }
    }

    /// Total rows folded so far, including skipped ones.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows skipped for having no organisation name.
    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }

    /// Number of distinct organisations aggregated so far.
    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }

    /// Consume the aggregator, yielding organisations in first-seen order.
    pub fn finish(mut self) -> Vec<Organisation> {
        self.order
            .iter()
            .filter_map(|key| self.orgs.remove(key))
            .collect()
    }
}
