//! External service boundaries: layout analysis and model invocation.
//!
//! Both services sit behind object-safe async traits so the pipeline can be
//! driven by mock implementations in tests and the HTTP clients can be
//! swapped without touching orchestration. The HTTP implementations are
//! deliberately thin: serialize, POST, map failure to a service error,
//! deserialize. Neither client retries — retry policy belongs to the
//! caller, which knows whether a second attempt is worth the latency.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::event::{Prompt, TextRegion};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Environment variable consulted when no model API key is configured.
pub const MODEL_API_KEY_VAR: &str = "DOC2EVENTS_MODEL_API_KEY";
/// Environment variable consulted when no layout API key is configured.
pub const LAYOUT_API_KEY_VAR: &str = "DOC2EVENTS_LAYOUT_API_KEY";

/// A hosted text-generation model.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send the prompt and return the model's raw text output.
    ///
    /// The returned string is opaque: it is *expected* to be a JSON array of
    /// events but may be truncated mid-token by the output-length limit or
    /// malformed in arbitrary ways. Interpreting it is the recoverer's job.
    async fn invoke(&self, prompt: &Prompt) -> Result<String, ExtractError>;
}

/// A document-analysis service that detects text regions in an image.
#[async_trait]
pub trait LayoutAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> Result<Vec<TextRegion>, ExtractError>;
}

// ── Model invocation over HTTP ───────────────────────────────────────────

#[derive(Serialize)]
struct ModelRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f32,
    system: &'a str,
    messages: Vec<ModelMessage<'a>>,
}

#[derive(Serialize)]
struct ModelMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ModelResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// HTTP client for a messages-style model API.
///
/// Request shape: `{model, max_tokens, temperature, system, messages}`;
/// response shape: `{content: [{text}]}`.
#[derive(Clone, Debug)]
pub struct HttpModelProvider {
    client: ReqwestClient,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

impl HttpModelProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        max_tokens: usize,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            max_tokens,
            temperature,
        })
    }

    /// Build a client from config, falling back to `DOC2EVENTS_MODEL_API_KEY`
    /// for the key.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        let api_key = config
            .model_api_key
            .clone()
            .or_else(|| std::env::var(MODEL_API_KEY_VAR).ok());
        Self::new(
            config.model_endpoint.clone(),
            api_key,
            config.model.clone(),
            config.max_tokens,
            config.temperature,
            config.api_timeout_secs,
        )
    }
}

#[async_trait]
impl ModelProvider for HttpModelProvider {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, ExtractError> {
        let request_body = ModelRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: &prompt.system_instruction,
            messages: vec![ModelMessage {
                role: "user",
                content: &prompt.user_content,
            }],
        };

        let mut request = self.client.post(&self.endpoint).json(&request_body);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| ExtractError::ModelService {
            detail: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::ModelService {
                detail: format!("HTTP {status}: {error_text}"),
            });
        }

        let model_response: ModelResponse =
            response.json().await.map_err(|e| ExtractError::ModelService {
                detail: format!("response decode: {e}"),
            })?;

        let raw = model_response
            .content
            .first()
            .map(|block| block.text.clone())
            .unwrap_or_default();
        debug!("Model returned {} bytes of raw output", raw.len());
        Ok(raw)
    }
}

// ── Layout analysis over HTTP ────────────────────────────────────────────

#[derive(Serialize)]
struct LayoutRequest {
    document: String,
    features: Vec<&'static str>,
}

#[derive(Deserialize)]
struct LayoutResponse {
    #[serde(default)]
    blocks: Vec<TextRegion>,
}

/// HTTP client for the document-analysis service.
///
/// Posts the image as base64 with a `LAYOUT` feature request and returns
/// the detected regions. Missing geometry/confidence fields deserialize to
/// zero; an empty block list is a valid (empty-document) result, not an
/// error.
#[derive(Clone, Debug)]
pub struct HttpLayoutAnalyzer {
    client: ReqwestClient,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpLayoutAnalyzer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Build a client from config. The layout endpoint has no default;
    /// extracting from images without one is a configuration error.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        let endpoint = config.layout_endpoint.clone().ok_or_else(|| {
            ExtractError::InvalidConfig(
                "No layout-analysis endpoint configured; set layout_endpoint or inject a LayoutAnalyzer".into(),
            )
        })?;
        let api_key = config
            .layout_api_key
            .clone()
            .or_else(|| std::env::var(LAYOUT_API_KEY_VAR).ok());
        Self::new(endpoint, api_key, config.api_timeout_secs)
    }
}

#[async_trait]
impl LayoutAnalyzer for HttpLayoutAnalyzer {
    async fn analyze(&self, image: &[u8]) -> Result<Vec<TextRegion>, ExtractError> {
        let request_body = LayoutRequest {
            document: STANDARD.encode(image),
            features: vec!["LAYOUT"],
        };

        let mut request = self.client.post(&self.endpoint).json(&request_body);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| ExtractError::LayoutService {
            detail: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExtractError::LayoutService {
                detail: format!("HTTP {status}: {error_text}"),
            });
        }

        let layout: LayoutResponse =
            response.json().await.map_err(|e| ExtractError::LayoutService {
                detail: format!("response decode: {e}"),
            })?;

        debug!("Layout analysis returned {} blocks", layout.blocks.len());
        Ok(layout.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_request_serializes_invocation_parameters() {
        let request = ModelRequest {
            model: "claude-3-haiku-20240307",
            max_tokens: 2500,
            temperature: 0.5,
            system: "sys",
            messages: vec![ModelMessage {
                role: "user",
                content: "Type,Text",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 2500);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn model_response_takes_first_content_block() {
        let response: ModelResponse =
            serde_json::from_str(r#"{"content": [{"text": "[]"}, {"text": "ignored"}]}"#).unwrap();
        assert_eq!(response.content.first().unwrap().text, "[]");
    }

    #[test]
    fn layout_response_tolerates_missing_blocks() {
        let response: LayoutResponse = serde_json::from_str("{}").unwrap();
        assert!(response.blocks.is_empty());
    }

    #[test]
    fn layout_analyzer_requires_endpoint() {
        let config = ExtractionConfig::default();
        let err = HttpLayoutAnalyzer::from_config(&config).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }
}
