//! Translation, simplification and question answering over a
//! [`TextGenerator`].
//!
//! Every public operation follows the same shape: skip the call when there
//! is nothing to do, wait on the shared [`MinIntervalLimiter`], issue exactly
//! one generation request, and on failure log and return a fixed fallback.
//! None of them return an error.

use std::sync::Arc;
use std::time::Duration;

use crate::llm::{LlmError, TextGenerator};
use crate::models::{is_blank_or_placeholder, Scheme, SchemeFields};
use crate::rate_limit::MinIntervalLimiter;

/// Language that needs no translation.
pub const SOURCE_LANGUAGE: &str = "English";

pub struct Assistant {
    generator: Arc<dyn TextGenerator>,
    limiter: MinIntervalLimiter,
}

impl Assistant {
    pub fn new(generator: Arc<dyn TextGenerator>, min_interval: Duration) -> Self {
        Self {
            generator,
            limiter: MinIntervalLimiter::new(min_interval),
        }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Translate `text`, or return it unchanged if it is blank, the `N/A`
    /// placeholder, or the request fails.
    pub async fn translate_field(&self, text: &str, target_language: &str) -> String {
        match self.try_translate(text, target_language).await {
            Ok(translated) => translated,
            Err(e) => {
                log_fallback("translate", &e);
                text.to_string()
            }
        }
    }

    /// Translate the four text fields of a scheme.
    ///
    /// All-or-nothing: if any field fails, the original fields are returned
    /// and the fields already translated are discarded.
    pub async fn translate_scheme(&self, scheme: &Scheme, language: &str) -> SchemeFields {
        match self.try_translate_scheme(scheme, language).await {
            Ok(fields) => fields,
            Err(e) => {
                log_fallback("translate_scheme", &e);
                scheme.fields()
            }
        }
    }

    /// Like [`translate_scheme`](Self::translate_scheme) but reports failure,
    /// so callers can avoid caching an untranslated result.
    pub async fn try_translate_scheme(
        &self,
        scheme: &Scheme,
        language: &str,
    ) -> Result<SchemeFields, LlmError> {
        if is_source_language(language) {
            return Ok(scheme.fields());
        }

        Ok(SchemeFields {
            title: self.try_translate(&scheme.title, language).await?,
            description: self.try_translate(&scheme.description, language).await?,
            eligibility: self.try_translate(&scheme.eligibility, language).await?,
            benefits: self.try_translate(&scheme.benefits, language).await?,
        })
    }

    /// Rewrite government language in plain words.
    pub async fn simplify_field(&self, text: &str) -> String {
        if is_blank_or_placeholder(text) {
            return text.to_string();
        }
        match self.call(&simplify_prompt(text)).await {
            Ok(simplified) => simplified,
            Err(e) => {
                log_fallback("simplify", &e);
                text.to_string()
            }
        }
    }

    /// Two or three child-level sentences describing the scheme.
    pub async fn generate_simple_explanation(&self, scheme: &Scheme) -> String {
        match self.call(&explanation_prompt(scheme)).await {
            Ok(explanation) => explanation,
            Err(e) => {
                log_fallback("explain", &e);
                format!("This scheme helps people by providing {}", scheme.benefits)
            }
        }
    }

    /// Answer `question` grounded in `context`.
    pub async fn answer_question(&self, question: &str, context: &str) -> String {
        match self.call(&answer_prompt(question, context)).await {
            Ok(answer) => answer,
            Err(e) => {
                log_fallback("answer", &e);
                format!("Sorry, I encountered an error: {}", e)
            }
        }
    }

    async fn try_translate(&self, text: &str, target_language: &str) -> Result<String, LlmError> {
        if is_blank_or_placeholder(text) {
            return Ok(text.to_string());
        }
        self.call(&translate_prompt(text, target_language)).await
    }

    async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        self.limiter.acquire().await;
        let output = self.generator.generate(prompt).await?;
        Ok(output.trim().to_string())
    }
}

pub fn is_source_language(language: &str) -> bool {
    let language = language.trim();
    language.is_empty() || language.eq_ignore_ascii_case(SOURCE_LANGUAGE)
}

fn log_fallback(operation: &str, err: &LlmError) {
    if matches!(err, LlmError::Disabled) {
        tracing::debug!(operation, "generation disabled, returning fallback");
    } else {
        tracing::warn!(
            operation,
            error = %err,
            transient = err.is_transient(),
            "generation failed, returning fallback"
        );
    }
}

fn translate_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text to {target_language}. \n\
         Only provide the translation, no additional text or explanations.\n\n\
         Text: {text}\n\n\
         Translation:"
    )
}

fn simplify_prompt(text: &str) -> String {
    format!(
        "Simplify the following government scheme text for rural and less educated people. \n\
         Use very simple words, short sentences, and easy to understand language.\n\
         Make it sound friendly and helpful.\n\
         Keep it under 100 words.\n\n\
         Text: {text}\n\n\
         Simplified version:"
    )
}

fn explanation_prompt(scheme: &Scheme) -> String {
    format!(
        "Explain this government scheme in very simple language that a 10-year-old can understand.\n\
         Use everyday words. Make it 2-3 short sentences only.\n\n\
         Scheme: {}\n\
         What it does: {}\n\
         Who can get it: {}\n\
         What you get: {}\n\n\
         Simple explanation:",
        scheme.title, scheme.description, scheme.eligibility, scheme.benefits
    )
}

fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helpful government schemes assistant for India.\n\
         Answer the user's question based on the context provided.\n\
         Use simple language that anyone can understand.\n\
         If you don't know, say \"I don't have that information.\"\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}
