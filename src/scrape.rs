//! Best-effort scheme collection.
//!
//! Each source (one regional portal, one national portal) is fetched once.
//! If the request fails, the response is not a success, or parsing yields no
//! records, the curated seed records for that source are used instead. The
//! caller never sees a network error; it only sees where the records came
//! from in the returned [`CollectReport`].

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::models::{NewScheme, CENTRAL_GOVERNMENT, NOT_AVAILABLE, TELANGANA_STATE};
use crate::seed::SeedFile;

/// Filler for fields the listing pages do not carry.
pub const DETAILS_ON_WEBSITE: &str = "Details available on official website";

/// Cards read from the regional listing page.
const REGIONAL_CARD_LIMIT: usize = 10;
/// Links inspected on the national landing page.
const NATIONAL_LINK_WINDOW: usize = 5;

/// Where a source's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Live,
    Seed,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Live => "live",
            Origin::Seed => "seed data",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub count: usize,
    pub origin: Origin,
}

/// Result of [`Scraper::collect`]: regional records first, then national.
#[derive(Debug, Clone)]
pub struct CollectReport {
    pub records: Vec<NewScheme>,
    pub regional: SourceOutcome,
    pub national: SourceOutcome,
}

pub struct Scraper {
    client: reqwest::Client,
    config: ScraperConfig,
    seed: SeedFile,
}

impl Scraper {
    pub fn new(config: &ScraperConfig, seed: SeedFile) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            seed,
        })
    }

    /// Collect both sources, substituting seed data where a fetch fails.
    pub async fn collect(&self) -> CollectReport {
        let (regional, regional_origin) = self
            .fetch_or_seed("regional", &self.config.regional_url, parse_regional, &self.seed.regional)
            .await;

        if self.config.enabled && self.config.pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.pause_ms)).await;
        }

        let (national, national_origin) = self
            .fetch_or_seed("national", &self.config.national_url, parse_national, &self.seed.national)
            .await;

        let regional_outcome = SourceOutcome {
            count: regional.len(),
            origin: regional_origin,
        };
        let national_outcome = SourceOutcome {
            count: national.len(),
            origin: national_origin,
        };

        let mut records = regional;
        records.extend(national);

        CollectReport {
            records,
            regional: regional_outcome,
            national: national_outcome,
        }
    }

    async fn fetch_or_seed(
        &self,
        name: &str,
        url: &str,
        parse: fn(&str) -> Vec<NewScheme>,
        fallback: &[NewScheme],
    ) -> (Vec<NewScheme>, Origin) {
        if !self.config.enabled {
            return (fallback.to_vec(), Origin::Seed);
        }

        match self.fetch_html(url).await {
            Ok(html) => {
                let parsed = parse(&html);
                if parsed.is_empty() {
                    tracing::info!(source = name, url, "no schemes found in page, using seed data");
                    (fallback.to_vec(), Origin::Seed)
                } else {
                    tracing::info!(source = name, count = parsed.len(), "scraped live schemes");
                    (parsed, Origin::Live)
                }
            }
            Err(e) => {
                tracing::warn!(source = name, url, error = %e, "scrape failed, using seed data");
                (fallback.to_vec(), Origin::Seed)
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Parse `div.scheme-item` cards from the regional listing page.
pub fn parse_regional(html: &str) -> Vec<NewScheme> {
    let doc = Html::parse_document(html);
    let (Ok(card_sel), Ok(h3_sel), Ok(p_sel), Ok(a_sel)) = (
        Selector::parse("div.scheme-item"),
        Selector::parse("h3"),
        Selector::parse("p"),
        Selector::parse("a[href]"),
    ) else {
        return Vec::new();
    };

    doc.select(&card_sel)
        .take(REGIONAL_CARD_LIMIT)
        .map(|card| NewScheme {
            title: first_text(&card, &h3_sel),
            description: first_text(&card, &p_sel),
            category: TELANGANA_STATE.to_string(),
            url: card
                .select(&a_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|h| h.trim().to_string()),
            eligibility: DETAILS_ON_WEBSITE.to_string(),
            benefits: DETAILS_ON_WEBSITE.to_string(),
        })
        .collect()
}

/// Pick scheme links out of the first few anchors on the national portal.
pub fn parse_national(html: &str) -> Vec<NewScheme> {
    let doc = Html::parse_document(html);
    let Ok(a_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    doc.select(&a_sel)
        .take(NATIONAL_LINK_WINDOW)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if !href.to_lowercase().contains("scheme") {
                return None;
            }
            Some(NewScheme {
                title: element_text(&a),
                description: "Central Government Scheme".to_string(),
                category: CENTRAL_GOVERNMENT.to_string(),
                url: Some(href.to_string()),
                eligibility: DETAILS_ON_WEBSITE.to_string(),
                benefits: DETAILS_ON_WEBSITE.to_string(),
            })
        })
        .collect()
}

fn first_text(parent: &ElementRef<'_>, selector: &Selector) -> String {
    parent
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
