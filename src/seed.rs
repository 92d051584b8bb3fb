//! Versioned seed data.
//!
//! The curated scheme list the scraper falls back to lives in
//! `data/seed_schemes.json`. It is compiled into the binary and can be
//! replaced at runtime with `[scraper] seed_path`, so changing the fallback
//! dataset never needs a code change.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::NewScheme;

/// Seed format version this build understands.
pub const SEED_VERSION: u32 = 1;

const EMBEDDED_SEED: &str = include_str!("../data/seed_schemes.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFile {
    pub version: u32,
    /// State-level schemes, used when the regional scrape yields nothing.
    pub regional: Vec<NewScheme>,
    /// Central schemes, used when the national scrape yields nothing.
    pub national: Vec<NewScheme>,
}

impl SeedFile {
    /// Regional records followed by national ones.
    pub fn into_records(self) -> Vec<NewScheme> {
        let mut records = self.regional;
        records.extend(self.national);
        records
    }
}

/// Load seed data from `path`, or the embedded asset when `None`.
pub fn load_seed(path: Option<&Path>) -> Result<SeedFile> {
    let seed = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read seed file: {}", p.display()))?;
            parse_seed(&content)
                .with_context(|| format!("Failed to parse seed file: {}", p.display()))?
        }
        None => parse_seed(EMBEDDED_SEED).context("Embedded seed data is invalid")?,
    };
    Ok(seed)
}

fn parse_seed(content: &str) -> Result<SeedFile> {
    let seed: SeedFile = serde_json::from_str(content)?;
    if seed.version != SEED_VERSION {
        bail!(
            "unsupported seed version {} (expected {})",
            seed.version,
            SEED_VERSION
        );
    }
    Ok(seed)
}
