//! Core data models for the sponsor index.
//!
//! These types represent the CSV rows, aggregated organisations, and
//! partition/sort-keyed entries that flow through the ingestion pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One raw row of the worker-sponsorship CSV, before aggregation.
///
/// A single organisation may repeat across rows differing only by `Route`.
#[derive(Debug, Clone, Deserialize)]
pub struct SponsorRow {
    #[serde(rename = "Organisation Name")]
    pub organisation_name: String,
    #[serde(rename = "Town/City", default)]
    pub town: String,
    #[serde(rename = "County", default)]
    pub county: String,
    #[serde(rename = "Type & Rating", default)]
    pub type_rating: String,
    #[serde(rename = "Route", default)]
    pub route: String,
}

/// One organisation after merging every row that shares its name.
///
/// Scalar fields keep the first-seen value; `routes` is deduplicated in
/// first-seen order. Immutable once aggregation finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Organisation {
    pub name: String,
    pub town: String,
    pub county: String,
    pub type_rating: String,
    pub routes: Vec<String>,
}

/// Compound key of a persisted entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub partition: String,
    pub sort: String,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.sort)
    }
}

/// Denormalized payload carried by every entry of one organisation.
///
/// Keyword entries hold a full copy of the canonical payload at write time,
/// so a keyword hit resolves without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub organisation_name: String,
    pub town: String,
    pub county: String,
    pub type_rating: String,
    pub routes: Vec<String>,
    pub entity_type: String,
    pub created_at: String,
}

/// A single partition/sort-keyed entry as persisted in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: EntryKey,
    pub payload: EntryPayload,
}

/// A batch that exhausted its retry attempts, kept for the seed report.
#[derive(Debug, Clone)]
pub struct FailedBatch {
    pub attempts: u32,
    pub remaining: usize,
    /// A few of the keys that could not be written, for diagnosis.
    pub sample: Vec<EntryKey>,
}
