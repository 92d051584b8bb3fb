//! Scheme snapshots as JSON.
//!
//! A snapshot is a pretty-printed JSON array of seed records (title,
//! description, category, url, eligibility, benefits) so it diffs cleanly in
//! version control. `saral export` writes one from the store, `saral import`
//! re-seeds the store from one, and `saral load --snapshot` saves what the
//! collector gathered.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::models::NewScheme;
use crate::store::SchemeStore;

/// Write `records` to `output`, or to stdout when `None`.
pub fn write_records(records: &[NewScheme], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<NewScheme>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    let records: Vec<NewScheme> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
    Ok(records)
}

/// Export every stored scheme in `(category, title)` order.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let store = SchemeStore::open(config).await?;
    let records: Vec<NewScheme> = store
        .get_all()
        .await?
        .iter()
        .map(|s| s.to_record())
        .collect();

    write_records(&records, output)?;
    if let Some(path) = output {
        eprintln!("Exported {} schemes to {}", records.len(), path.display());
    }

    store.close().await;
    Ok(())
}

/// Replace the store contents with the records in `path`.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    let records = read_records(path)?;
    let store = SchemeStore::open(config).await?;
    let inserted = store.insert_all(&records).await?;
    println!("Imported {} schemes from {}", inserted, path.display());
    store.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_snapshot_file_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out/schemes.json");
        let records = seed::load_seed(None).unwrap().into_records();

        write_records(&records, Some(&path)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  {\n"), "snapshot should be pretty-printed");

        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn test_read_records_rejects_garbage() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse snapshot"));
    }
}
