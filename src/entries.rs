//! Builds the persisted entries for one aggregated organisation.
//!
//! Each organisation becomes one canonical entry plus one keyword entry per
//! distinct searchable token in its name. All of an organisation's entries
//! share a freshly generated id and an identical payload, differing only in
//! their keys.

use chrono::Utc;
use uuid::Uuid;

use crate::error::IndexError;
use crate::keywords::tokenize;
use crate::models::{EntryKey, EntryPayload, IndexEntry, Organisation};

/// Partition prefix of canonical entries and sort prefix of keyword entries.
pub const ORG_PREFIX: &str = "ORG#";
/// Partition prefix of keyword entries.
pub const KEYWORD_PREFIX: &str = "KEYWORD#";
/// Sort key of the one canonical entry per organisation.
pub const META_SORT: &str = "META";
/// Entity-type tag stamped on every entry payload.
pub const ENTITY_TYPE: &str = "ORGANISATION";

/// Entries produced for one organisation, correlated by its generated id.
#[derive(Debug, Clone)]
pub struct BuiltEntries {
    pub org_id: String,
    pub entries: Vec<IndexEntry>,
}

/// Build the canonical entry and every keyword entry for `org`.
///
/// Generates a fresh organisation id, so entries from distinct ingestion
/// runs never share keys. The aggregator never emits a nameless
/// organisation; one arriving here anyway is rejected rather than indexed.
pub fn build_entries(org: &Organisation) -> Result<BuiltEntries, IndexError> {
    if org.name.trim().is_empty() {
        return Err(IndexError::InvalidInput(
            "organisation name is empty".to_string(),
        ));
    }

    let org_id = Uuid::new_v4().to_string();
    let payload = EntryPayload {
        organisation_name: org.name.clone(),
        town: org.town.clone(),
        county: org.county.clone(),
        type_rating: org.type_rating.clone(),
        routes: org.routes.clone(),
        entity_type: ENTITY_TYPE.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };

    let keywords = tokenize(&org.name);
    let mut entries = Vec::with_capacity(keywords.len() + 1);
    entries.push(IndexEntry {
        key: EntryKey {
            partition: format!("{}{}", ORG_PREFIX, org_id),
            sort: META_SORT.to_string(),
        },
        payload: payload.clone(),
    });
    for token in keywords {
        entries.push(IndexEntry {
            key: EntryKey {
                partition: format!("{}{}", KEYWORD_PREFIX, token),
                sort: format!("{}{}", ORG_PREFIX, org_id),
            },
            payload: payload.clone(),
        });
    }

    Ok(BuiltEntries { org_id, entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(name: &str) -> Organisation {
        Organisation {
            name: name.to_string(),
            town: "London".to_string(),
            county: "Greater London".to_string(),
            type_rating: "Worker (A rating)".to_string(),
            routes: vec!["Skilled Worker".to_string()],
        }
    }

    #[test]
    fn one_canonical_plus_one_entry_per_keyword() {
        let built = build_entries(&org("K Line Energy Shipping (UK) Limited")).unwrap();

        // 4 keywords -> 5 entries, all correlated by the same id.
        assert_eq!(built.entries.len(), 5);
        let org_ref = format!("{}{}", ORG_PREFIX, built.org_id);
        assert_eq!(built.entries[0].key.partition, org_ref);
        assert_eq!(built.entries[0].key.sort, META_SORT);
        for entry in &built.entries[1..] {
            assert!(entry.key.partition.starts_with(KEYWORD_PREFIX));
            assert_eq!(entry.key.sort, org_ref);
        }
    }

    #[test]
    fn all_entries_share_the_canonical_payload() {
        let built = build_entries(&org("Acme Widgets Ltd")).unwrap();
        let canonical = &built.entries[0].payload;
        assert_eq!(canonical.entity_type, ENTITY_TYPE);
        for entry in &built.entries {
            assert_eq!(&entry.payload, canonical);
        }
    }

    #[test]
    fn stop_word_only_name_gets_canonical_entry_only() {
        let built = build_entries(&org("The A Company Ltd")).unwrap();
        assert_eq!(built.entries.len(), 1);
        assert_eq!(built.entries[0].key.sort, META_SORT);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = build_entries(&org("  ")).unwrap_err();
        assert!(matches!(err, IndexError::InvalidInput(_)));
    }

    #[test]
    fn distinct_builds_mint_distinct_ids() {
        let organisation = org("Acme Widgets Ltd");
        let first = build_entries(&organisation).unwrap();
        let second = build_entries(&organisation).unwrap();
        assert_ne!(first.org_id, second.org_id);
    }
}
