//! Browse and search commands.

use anyhow::Result;

use crate::config::Config;
use crate::models::Scheme;
use crate::store::SchemeStore;

/// `saral list [--category C]`
pub async fn run_list(config: &Config, category: Option<String>) -> Result<()> {
    let store = SchemeStore::open(config).await?;

    let schemes = match category.as_deref() {
        Some(c) if !c.eq_ignore_ascii_case("all") => store.filter_by_category(c).await?,
        _ => store.get_all().await?,
    };

    if schemes.is_empty() {
        println!("No schemes loaded. Run `saral load` first.");
    } else {
        println!("Showing {} schemes", schemes.len());
        println!();
        print_table(&schemes);
    }

    store.close().await;
    Ok(())
}

/// `saral search <term>`
pub async fn run_search(config: &Config, term: &str) -> Result<()> {
    if term.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let store = SchemeStore::open(config).await?;
    let results = store.search(term).await?;

    if results.is_empty() {
        println!("No schemes found matching '{}'. Try different keywords.", term);
    } else {
        println!("Found {} schemes matching '{}'", results.len(), term);
        println!();
        for (i, s) in results.iter().enumerate() {
            println!("{}. [{}] {}", i + 1, s.id, s.title);
            println!("    category: {}", s.category);
            println!("    {}", s.description);
            println!("    benefits: {}", s.benefits);
            println!();
        }
    }

    store.close().await;
    Ok(())
}

fn print_table(schemes: &[Scheme]) {
    println!("{:>4}  {:<20}  TITLE", "ID", "CATEGORY");
    println!("{}", "-".repeat(72));
    for s in schemes {
        println!("{:>4}  {:<20}  {}", s.id, s.category, s.title);
    }
}
