//! Index statistics and health overview.
//!
//! Provides a quick summary of what's indexed: entry counts, organisation
//! counts, and keyword coverage. Used by `spx stats` to give confidence
//! that a seed run produced the expected index.

use anyhow::Result;

use crate::config::Config;
use crate::db;

/// Run the stats command: query the entry table and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let table = &config.store.table;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&pool)
        .await?;

    let organisations: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE sort_key = 'META'",
        table
    ))
    .fetch_one(&pool)
    .await?;

    let keyword_entries: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE partition_key LIKE 'KEYWORD#%'",
        table
    ))
    .fetch_one(&pool)
    .await?;

    let distinct_keywords: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(DISTINCT partition_key) FROM {} WHERE partition_key LIKE 'KEYWORD#%'",
        table
    ))
    .fetch_one(&pool)
    .await?;

    let db_size = std::fs::metadata(&config.store.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Sponsor Index — Stats");
    println!("=====================");
    println!();
    println!("  Database:          {}", config.store.path.display());
    println!("  Table:             {}", table);
    println!("  Size:              {}", format_bytes(db_size));
    println!();
    println!("  Entries:           {}", total);
    println!("  Organisations:     {}", organisations);
    println!("  Keyword entries:   {}", keyword_entries);
    println!("  Distinct keywords: {}", distinct_keywords);
    if organisations > 0 {
        println!(
            "  Keywords per org:  {:.1}",
            keyword_entries as f64 / organisations as f64
        );
    }

    pool.close().await;
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
