//! Core data models used throughout SARAL.
//!
//! These types represent the scheme records, cached translations and
//! aggregate counts that flow between the store, the seed loader, the
//! generation client and the presentation layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category label for state-level schemes.
pub const TELANGANA_STATE: &str = "Telangana State";
/// Category label for national schemes.
pub const CENTRAL_GOVERNMENT: &str = "Central Government";
/// Placeholder stored for fields a source did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// A scheme record before the store assigns it an id.
///
/// This is also the on-disk seed and snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheme {
    #[serde(default = "not_available")]
    pub title: String,
    #[serde(default = "not_available")]
    pub description: String,
    #[serde(default = "not_available")]
    pub category: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "not_available")]
    pub eligibility: String,
    #[serde(default = "not_available")]
    pub benefits: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// A scheme stored in SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scheme {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: Option<String>,
    pub eligibility: String,
    pub benefits: String,
    pub created_at: i64,
}

impl Scheme {
    pub fn to_record(&self) -> NewScheme {
        NewScheme {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            url: self.url.clone(),
            eligibility: self.eligibility.clone(),
            benefits: self.benefits.clone(),
        }
    }

    /// The four user-facing text fields, untranslated.
    pub fn fields(&self) -> SchemeFields {
        SchemeFields {
            title: self.title.clone(),
            description: self.description.clone(),
            eligibility: self.eligibility.clone(),
            benefits: self.benefits.clone(),
        }
    }
}

/// The translatable text fields of a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeFields {
    pub title: String,
    pub description: String,
    pub eligibility: String,
    pub benefits: String,
}

/// A cached translation row, keyed by `(scheme_id, language)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub id: i64,
    pub scheme_id: i64,
    pub language: String,
    pub fields: SchemeFields,
    pub created_at: i64,
}

/// Aggregate counts over the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub total_schemes: i64,
    pub by_category: BTreeMap<String, i64>,
    pub total_translations: i64,
    pub total_queries: i64,
}

/// Truncate to at most `max_chars` characters (not bytes).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// True for text the generation client passes through untouched.
pub fn is_blank_or_placeholder(text: &str) -> bool {
    text.trim().is_empty() || text == NOT_AVAILABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_ascii() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let s = "సరళ సరళ";
        let t = truncate_chars(s, 3);
        assert_eq!(t.chars().count(), 3);
        assert!(s.starts_with(t));
    }

    #[test]
    fn test_seed_record_defaults_missing_fields() {
        let rec: NewScheme = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert_eq!(rec.title, "Only a title");
        assert_eq!(rec.description, NOT_AVAILABLE);
        assert_eq!(rec.benefits, NOT_AVAILABLE);
        assert_eq!(rec.url, None);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_blank_or_placeholder(""));
        assert!(is_blank_or_placeholder("   "));
        assert!(is_blank_or_placeholder("N/A"));
        assert!(!is_blank_or_placeholder("Free LPG connection"));
    }
}
