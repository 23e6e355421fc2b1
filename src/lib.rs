//! # Sponsor Index
//!
//! A keyword-indexed ingestion pipeline for the UK register of licensed
//! sponsors.
//!
//! The raw worker-sponsorship CSV lists one row per sponsorship record, so
//! a single organisation repeats across rows. Sponsor Index aggregates
//! those rows, then denormalizes each organisation into a canonical entry
//! plus one copy per searchable keyword, keyed so that partial name
//! matches resolve with plain key-value lookups and no query engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────────┐   ┌─────────────┐
//! │ CSV rows │──▶│ Aggregator │──▶│ Record builder│──▶│ Batch writer │
//! │ (stream) │   │ merge rows │   │ META + KEYWORD│   │ 25/batch,    │
//! └──────────┘   └────────────┘   └───────────────┘   │ bounded retry│
//!                                                     └──────┬──────┘
//!                                                            ▼
//!                                                      ┌──────────┐
//!                                                      │  SQLite  │
//!                                                      └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! spx init                         # create the entry table
//! spx clean sponsors.csv --out cleaned.csv
//! spx seed sponsors.csv            # ingest into the keyword index
//! spx search "energy shipping"
//! spx stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`keywords`] | Name normalization and keyword extraction |
//! | [`aggregate`] | Streaming row aggregation |
//! | [`entries`] | Canonical and keyword entry building |
//! | [`writer`] | Batched, concurrency-limited writes |
//! | [`ingest`] | Seed pipeline orchestration |
//! | [`store`] | Storage abstraction (SQLite, in-memory) |
//! | [`search`] | Keyword search |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod db;
pub mod entries;
pub mod error;
pub mod get;
pub mod ingest;
pub mod keywords;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod search;
pub mod stats;
pub mod store;
pub mod writer;
