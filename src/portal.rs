//! Application service tying the store, the collector and the assistant
//! together.
//!
//! A [`Portal`] is built once per process from the [`Config`] and shared by
//! the CLI commands and the HTTP handlers. It holds no per-user state: the
//! chat language and history travel with each request in a
//! [`Session`](crate::chat::Session).

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::assistant::{is_source_language, Assistant, SOURCE_LANGUAGE};
use crate::config::Config;
use crate::export;
use crate::llm::{self, TextGenerator};
use crate::models::{Scheme, SchemeFields};
use crate::scrape::{Origin, Scraper, SourceOutcome};
use crate::seed;
use crate::store::SchemeStore;

pub struct Portal {
    config: Config,
    store: SchemeStore,
    assistant: Assistant,
    limited_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub inserted: usize,
    pub regional: SourceOutcome,
    pub national: SourceOutcome,
}

/// A scheme's text fields in the requested language.
#[derive(Debug, Clone, Serialize)]
pub struct LocalizedScheme {
    pub scheme: Scheme,
    pub language: String,
    pub fields: SchemeFields,
    /// Served from the translation cache.
    pub cached: bool,
    /// False when the original text was returned instead.
    pub translated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimplifiedScheme {
    pub scheme: Scheme,
    pub fields: SchemeFields,
    pub simplified: bool,
}

impl Portal {
    /// Open the store and pick the text generator. A missing API key puts
    /// the portal in limited mode instead of failing.
    pub async fn open(config: &Config) -> Result<Self> {
        let store = SchemeStore::open(config).await?;
        let setup = llm::create_generator(&config.llm)?;
        Ok(Self::from_parts(
            config.clone(),
            store,
            setup.generator,
            setup.limited_mode,
        ))
    }

    pub fn from_parts(
        config: Config,
        store: SchemeStore,
        generator: Arc<dyn TextGenerator>,
        limited_mode: bool,
    ) -> Self {
        let assistant = Assistant::new(
            generator,
            Duration::from_millis(config.llm.min_interval_ms),
        );
        Self {
            config,
            store,
            assistant,
            limited_mode,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SchemeStore {
        &self.store
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn limited_mode(&self) -> bool {
        self.limited_mode
    }

    pub async fn close(self) {
        self.store.close().await;
    }

    /// Collect schemes (live or seed) and replace the store contents.
    ///
    /// With `offline`, the network is skipped and only seed data is used.
    /// With `snapshot`, the collected records are also written there.
    pub async fn load(&self, offline: bool, snapshot: Option<&Path>) -> Result<LoadReport> {
        let seed = seed::load_seed(self.config.scraper.seed_path.as_deref())?;

        let mut scraper_config = self.config.scraper.clone();
        if offline {
            scraper_config.enabled = false;
        }

        let report = Scraper::new(&scraper_config, seed)?.collect().await;

        if let Some(path) = snapshot {
            export::write_records(&report.records, Some(path))?;
        }

        let inserted = self.store.insert_all(&report.records).await?;
        if report.regional.origin == Origin::Seed || report.national.origin == Origin::Seed {
            tracing::info!(
                regional = ?report.regional.origin,
                national = ?report.national.origin,
                "loaded schemes with seed fallback"
            );
        }

        Ok(LoadReport {
            inserted,
            regional: report.regional,
            national: report.national,
        })
    }

    /// The scheme in `language`, using and filling the translation cache.
    ///
    /// Only complete translations are cached; in limited mode or on failure
    /// the original fields come back with `translated = false`.
    pub async fn localized_scheme(
        &self,
        id: i64,
        language: &str,
    ) -> Result<Option<LocalizedScheme>> {
        let Some(scheme) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };

        // Blank means the source language.
        let language = match language.trim() {
            "" => SOURCE_LANGUAGE,
            l => l,
        }
        .to_string();
        if is_source_language(&language) {
            let fields = scheme.fields();
            return Ok(Some(LocalizedScheme {
                scheme,
                language,
                fields,
                cached: false,
                translated: true,
            }));
        }

        if let Some(hit) = self.store.get_translation(id, &language).await? {
            return Ok(Some(LocalizedScheme {
                scheme,
                language,
                fields: hit.fields,
                cached: true,
                translated: true,
            }));
        }

        if self.limited_mode {
            let fields = scheme.fields();
            return Ok(Some(LocalizedScheme {
                scheme,
                language,
                fields,
                cached: false,
                translated: false,
            }));
        }

        let attempt = self.assistant.try_translate_scheme(&scheme, &language).await;
        let (fields, translated) = match attempt {
            Ok(fields) => {
                self.store.save_translation(id, &language, &fields).await?;
                (fields, true)
            }
            Err(e) => {
                tracing::warn!(
                    scheme_id = id,
                    language = %language,
                    error = %e,
                    "translation failed, serving original"
                );
                (scheme.fields(), false)
            }
        };

        Ok(Some(LocalizedScheme {
            scheme,
            language,
            fields,
            cached: false,
            translated,
        }))
    }

    /// Plain-language rewrite of description, eligibility and benefits.
    pub async fn simplified_scheme(&self, id: i64) -> Result<Option<SimplifiedScheme>> {
        let Some(scheme) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };

        if self.limited_mode {
            let fields = scheme.fields();
            return Ok(Some(SimplifiedScheme {
                scheme,
                fields,
                simplified: false,
            }));
        }

        let fields = SchemeFields {
            title: scheme.title.clone(),
            description: self.assistant.simplify_field(&scheme.description).await,
            eligibility: self.assistant.simplify_field(&scheme.eligibility).await,
            benefits: self.assistant.simplify_field(&scheme.benefits).await,
        };
        let simplified = fields != scheme.fields();

        Ok(Some(SimplifiedScheme {
            scheme,
            fields,
            simplified,
        }))
    }

    /// A short child-level explanation, or the benefits-based fallback.
    pub async fn explain_scheme(&self, id: i64) -> Result<Option<String>> {
        let Some(scheme) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.assistant.generate_simple_explanation(&scheme).await))
    }
}
