//! Keyword-relevance context for the chatbot.
//!
//! Scoring is a pure function of the scheme list and the query:
//!
//! 1. The query is lower-cased and split on whitespace. Repeated tokens are
//!    kept, so `"farmer farmer"` counts farmer hits twice.
//! 2. Each scheme's haystack is `title description category eligibility
//!    benefits`, lower-cased and space-joined.
//! 3. The score is the sum, over tokens, of non-overlapping substring
//!    occurrences of the token in the haystack. Zero scores are dropped.
//! 4. Survivors are stably sorted by score, highest first, so equal scores
//!    keep their input order.
//! 5. The first `top_k` are returned.
//!
//! When nothing scores, [`build_context`] falls back to a fixed-length
//! prefix of the whole corpus instead.

use serde::Serialize;

use crate::models::Scheme;

/// Schemes handed to the model per question.
pub const DEFAULT_TOP_K: usize = 3;
/// Characters of the full corpus used when no scheme matches.
pub const DEFAULT_FALLBACK_CHARS: usize = 2000;

/// A scheme together with its relevance score.
#[derive(Debug, Clone, Copy)]
pub struct RankedScheme<'a> {
    pub scheme: &'a Scheme,
    pub score: usize,
}

/// Context text for one question and the schemes it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext {
    pub text: String,
    /// Ids of the ranked schemes; empty when the fallback was used.
    pub source_ids: Vec<i64>,
    pub used_fallback: bool,
}

pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn haystack(scheme: &Scheme) -> String {
    [
        scheme.title.as_str(),
        scheme.description.as_str(),
        scheme.category.as_str(),
        scheme.eligibility.as_str(),
        scheme.benefits.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// Sum of token occurrence counts in the scheme's haystack.
pub fn relevance_score(scheme: &Scheme, tokens: &[String]) -> usize {
    let hay = haystack(scheme);
    tokens.iter().map(|t| hay.matches(t.as_str()).count()).sum()
}

/// Rank `schemes` against `query` and keep the best `top_k`.
pub fn rank_schemes<'a>(schemes: &'a [Scheme], query: &str, top_k: usize) -> Vec<RankedScheme<'a>> {
    let tokens = query_tokens(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<RankedScheme<'a>> = schemes
        .iter()
        .map(|scheme| RankedScheme {
            scheme,
            score: relevance_score(scheme, &tokens),
        })
        .filter(|r| r.score > 0)
        .collect();

    // sort_by is stable: ties stay in input order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(top_k);
    ranked
}

/// The whole scheme list as one prompt-ready string.
pub fn corpus_text(schemes: &[Scheme]) -> String {
    let mut out = String::new();
    for s in schemes {
        out.push_str(&format!(
            "\nScheme: {}\nCategory: {}\nDescription: {}\nEligibility: {}\nBenefits: {}\n---\n",
            s.title, s.category, s.description, s.eligibility, s.benefits
        ));
    }
    out
}

/// First `max_chars` characters of [`corpus_text`].
pub fn fallback_context(schemes: &[Scheme], max_chars: usize) -> String {
    corpus_text(schemes).chars().take(max_chars).collect()
}

fn ranked_text(ranked: &[RankedScheme<'_>]) -> String {
    let mut out = String::from("Relevant schemes:\n");
    for r in ranked {
        out.push_str(&format!(
            "\n{}: {}\nBenefits: {}\n",
            r.scheme.title, r.scheme.description, r.scheme.benefits
        ));
    }
    out
}

/// Ranked context for `query`, or the corpus prefix when nothing matches.
pub fn build_context(
    schemes: &[Scheme],
    query: &str,
    top_k: usize,
    fallback_chars: usize,
) -> ChatContext {
    let ranked = rank_schemes(schemes, query, top_k);
    if ranked.is_empty() {
        return ChatContext {
            text: fallback_context(schemes, fallback_chars),
            source_ids: Vec::new(),
            used_fallback: true,
        };
    }

    ChatContext {
        text: ranked_text(&ranked),
        source_ids: ranked.iter().map(|r| r.scheme.id).collect(),
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(id: i64, title: &str, description: &str) -> Scheme {
        Scheme {
            id,
            title: title.to_string(),
            description: description.to_string(),
            category: "Central Government".to_string(),
            url: None,
            eligibility: String::new(),
            benefits: String::new(),
            created_at: 0,
        }
    }

    fn corpus() -> Vec<Scheme> {
        vec![
            scheme(1, "Housing", "pucca houses for rural families"),
            scheme(2, "Rythu Bandhu", "support for farmers; farmer accounts"),
            scheme(3, "PM-KISAN", "income support to farmer families"),
            scheme(4, "Pension", "old age income"),
            scheme(5, "Ujjwala", "LPG for women"),
        ]
    }

    fn ids(ranked: &[RankedScheme<'_>]) -> Vec<i64> {
        ranked.iter().map(|r| r.scheme.id).collect()
    }

    #[test]
    fn test_ranks_by_occurrence_count() {
        let schemes = corpus();
        let ranked = rank_schemes(&schemes, "Farmer", DEFAULT_TOP_K);
        assert_eq!(ids(&ranked), vec![2, 3]);
        assert_eq!(ranked[0].score, 2);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn test_repeated_tokens_count_twice() {
        let schemes = corpus();
        let tokens = query_tokens("farmer farmer");
        assert_eq!(relevance_score(&schemes[2], &tokens), 2);
    }

    #[test]
    fn test_at_most_top_k_and_descending() {
        let schemes = corpus();
        let ranked = rank_schemes(&schemes, "income families for", DEFAULT_TOP_K);
        assert!(!ranked.is_empty());
        assert!(ranked.len() <= DEFAULT_TOP_K);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let schemes = vec![
            scheme(10, "b", "water"),
            scheme(11, "a", "nothing"),
            scheme(12, "c", "water"),
            scheme(13, "d", "water"),
        ];
        let ranked = rank_schemes(&schemes, "water", 10);
        assert_eq!(ids(&ranked), vec![10, 12, 13]);
    }

    #[test]
    fn test_haystack_includes_category() {
        let schemes = corpus();
        let ranked = rank_schemes(&schemes, "central", 10);
        assert_eq!(ranked.len(), schemes.len());
    }

    #[test]
    fn test_empty_and_unmatched_queries() {
        let schemes = corpus();
        assert!(rank_schemes(&schemes, "", DEFAULT_TOP_K).is_empty());
        assert!(rank_schemes(&schemes, "   \t ", DEFAULT_TOP_K).is_empty());
        assert!(rank_schemes(&schemes, "zzzqqq", DEFAULT_TOP_K).is_empty());
    }

    #[test]
    fn test_build_context_uses_ranked_schemes() {
        let schemes = corpus();
        let ctx = build_context(&schemes, "farmer", DEFAULT_TOP_K, DEFAULT_FALLBACK_CHARS);
        assert!(!ctx.used_fallback);
        assert_eq!(ctx.source_ids, vec![2, 3]);
        assert!(ctx.text.starts_with("Relevant schemes:\n"));
        assert!(ctx.text.contains("Rythu Bandhu: support for farmers"));
    }

    #[test]
    fn test_build_context_falls_back_to_corpus_prefix() {
        let schemes: Vec<Scheme> = (0..100)
            .map(|i| scheme(i, &format!("Scheme {}", i), "long description text"))
            .collect();
        let ctx = build_context(&schemes, "", DEFAULT_TOP_K, DEFAULT_FALLBACK_CHARS);

        assert!(ctx.used_fallback);
        assert!(ctx.source_ids.is_empty());
        assert_eq!(ctx.text.chars().count(), DEFAULT_FALLBACK_CHARS);
        assert!(corpus_text(&schemes).starts_with(&ctx.text));
    }

    #[test]
    fn test_fallback_shorter_than_limit() {
        let schemes = corpus();
        let ctx = build_context(&schemes, "nomatch", DEFAULT_TOP_K, DEFAULT_FALLBACK_CHARS);
        assert_eq!(ctx.text, corpus_text(&schemes));
        assert!(ctx.text.chars().count() <= DEFAULT_FALLBACK_CHARS);
    }
}
