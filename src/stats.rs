//! Database statistics.
//!
//! A quick summary of what is stored: scheme counts per category, cached
//! translations and logged questions.

use anyhow::Result;

use crate::config::Config;
use crate::store::SchemeStore;

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SchemeStore::open(config).await?;
    let stats = store.get_stats().await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("SARAL Database Stats");
    println!("======================");
    println!();
    println!("  Database:      {}", config.db.path.display());
    println!("  Size:          {}", format_bytes(db_size));
    println!();
    println!("  Schemes:       {}", stats.total_schemes);
    println!("  Translations:  {}", stats.total_translations);
    println!("  Queries:       {}", stats.total_queries);

    if !stats.by_category.is_empty() {
        println!();
        println!("  By category:");
        println!("  {:<28} {:>8}", "CATEGORY", "SCHEMES");
        println!("  {}", "-".repeat(37));
        for (category, count) in &stats.by_category {
            println!("  {:<28} {:>8}", category, count);
        }
    }

    println!();

    store.close().await;
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
