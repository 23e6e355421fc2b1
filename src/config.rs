use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::IndexError;
use crate::store::MAX_BATCH_SIZE;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub table: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_candidates")]
    pub candidates: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            candidates: default_candidates(),
        }
    }
}

fn default_limit() -> i64 {
    10
}
fn default_candidates() -> i64 {
    100
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate store. The table name lands in SQL text, so it must be a
    // plain identifier.
    let table = &config.store.table;
    let valid_table = !table.is_empty()
        && table
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_table {
        return Err(IndexError::Configuration(format!(
            "store.table must be a plain identifier, got '{}'",
            table
        ))
        .into());
    }

    // Validate ingest
    if config.ingest.batch_size == 0 || config.ingest.batch_size > MAX_BATCH_SIZE {
        return Err(IndexError::Configuration(format!(
            "ingest.batch_size must be in 1..={}",
            MAX_BATCH_SIZE
        ))
        .into());
    }
    if config.ingest.concurrency == 0 {
        return Err(IndexError::Configuration(
            "ingest.concurrency must be >= 1".to_string(),
        )
        .into());
    }
    if config.ingest.max_retries == 0 {
        return Err(IndexError::Configuration(
            "ingest.max_retries must be >= 1".to_string(),
        )
        .into());
    }

    // Validate search
    if config.search.limit < 1 {
        return Err(IndexError::Configuration("search.limit must be >= 1".to_string()).into());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("spx.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    const VALID: &str = r#"
[store]
path = "./data/spx.sqlite"
table = "sponsor_entries"

[ingest]
batch_size = 25
concurrency = 5
"#;

    #[test]
    fn valid_config_loads_with_defaults() {
        let (_tmp, path) = write_config(VALID);
        let config = load_config(&path).unwrap();
        assert_eq!(config.store.table, "sponsor_entries");
        assert_eq!(config.ingest.max_retries, 5);
        assert_eq!(config.search.limit, 10);
    }

    #[test]
    fn missing_required_value_fails_fast() {
        let (_tmp, path) = write_config(
            r#"
[store]
path = "./data/spx.sqlite"
table = "sponsor_entries"

[ingest]
concurrency = 5
"#,
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn batch_size_above_store_cap_is_rejected() {
        let (_tmp, path) = write_config(&VALID.replace("batch_size = 25", "batch_size = 26"));
        let err = load_config(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::Configuration(_))
        ));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let (_tmp, path) = write_config(&VALID.replace("concurrency = 5", "concurrency = 0"));
        let err = load_config(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::Configuration(_))
        ));
    }

    #[test]
    fn sql_unsafe_table_name_is_rejected() {
        let (_tmp, path) = write_config(
            &VALID.replace("table = \"sponsor_entries\"", "table = \"entries; drop\""),
        );
        assert!(load_config(&path).is_err());
    }
}
