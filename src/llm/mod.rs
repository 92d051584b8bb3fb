//! Text-generation provider abstraction.
//!
//! Defines the [`TextGenerator`] trait and its implementations:
//! - **[`DisabledGenerator`]**: always fails; used in limited mode.
//! - **[`GeminiGenerator`]**: calls the Gemini `generateContent` REST endpoint.
//!
//! # Provider Selection
//!
//! [`create_generator`] reads `[llm]` from the config and the API key from
//! the environment variable named by `llm.api_key_env`. A missing key is not
//! an error: the portal runs in limited mode and the returned
//! [`GeneratorSetup::limited_mode`] flag says so.
//!
//! Each call is a single request. Callers own the fallback behaviour and the
//! pacing (see [`crate::rate_limit`]).

mod error;

pub use error::LlmError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs and `/health`.
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`. The returned text is untrimmed.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// The generator chosen at startup plus whether features are degraded.
pub struct GeneratorSetup {
    pub generator: Arc<dyn TextGenerator>,
    pub limited_mode: bool,
}

/// Build the configured generator, downgrading to [`DisabledGenerator`] when
/// the provider is disabled or the API key is absent.
pub fn create_generator(config: &LlmConfig) -> Result<GeneratorSetup, LlmError> {
    if !config.is_enabled() {
        return Ok(GeneratorSetup {
            generator: Arc::new(DisabledGenerator),
            limited_mode: true,
        });
    }

    let api_key = match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!(
                env = %config.api_key_env,
                "API key not set; translation and chat run in limited mode"
            );
            return Ok(GeneratorSetup {
                generator: Arc::new(DisabledGenerator),
                limited_mode: true,
            });
        }
    };

    let generator = GeminiGenerator::new(config, api_key)?;
    Ok(GeneratorSetup {
        generator: Arc::new(generator),
        limited_mode: false,
    })
}

// ============ Disabled ============

pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

// ============ Gemini ============

/// Client for `POST {base_url}/v1beta/models/{model}:generateContent`.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiGenerator {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                code: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::JsonParse {
                context: "generateContent response".to_string(),
                source: e,
            })?;

        let output: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if output.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Namaste" }, { "text": " ji" }] }
                }]
            })))
            .mount(&server)
            .await;

        let gen = GeminiGenerator::new(&test_config(&server.uri()), "test-key".to_string())
            .unwrap();
        assert_eq!(gen.generate("hello").await.unwrap(), "Namaste ji");
    }

    #[tokio::test]
    async fn test_generate_maps_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let gen = GeminiGenerator::new(&test_config(&server.uri()), "k".to_string()).unwrap();
        match gen.generate("hello").await {
            Err(LlmError::HttpStatus { code, body }) => {
                assert_eq!(code, 429);
                assert_eq!(body, "quota");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let gen = GeminiGenerator::new(&test_config(&server.uri()), "k".to_string()).unwrap();
        assert!(matches!(
            gen.generate("hello").await,
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_missing_key_means_limited_mode() {
        let config = LlmConfig {
            api_key_env: "SARAL_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        let setup = create_generator(&config).unwrap();
        assert!(setup.limited_mode);
        assert_eq!(setup.generator.model_name(), "disabled");
    }

    #[test]
    fn test_disabled_provider_means_limited_mode() {
        let config = LlmConfig {
            provider: "disabled".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_generator(&config).unwrap().limited_mode);
    }
}
