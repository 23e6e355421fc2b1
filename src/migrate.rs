use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Create the entry table and its supporting index. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let table = &config.store.table;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            partition_key TEXT NOT NULL,
            sort_key TEXT NOT NULL,
            organisation_name TEXT NOT NULL,
            town TEXT NOT NULL DEFAULT '',
            county TEXT NOT NULL DEFAULT '',
            type_rating TEXT NOT NULL DEFAULT '',
            routes_json TEXT NOT NULL DEFAULT '[]',
            entity_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (partition_key, sort_key)
        )
        "#,
        table
    ))
    .execute(&pool)
    .await?;

    // Reverse lookups (keywords for one organisation) scan by sort key.
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{t}_sort_key ON {t}(sort_key)",
        t = table
    ))
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}
