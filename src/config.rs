//! Configuration for the document-to-events pipeline.
//!
//! All pipeline behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Configuration is an explicit value
//! passed into the pipeline, never ambient process state: every invocation
//! reads the same frozen config, and tests swap in mock service clients
//! through the `model_provider` / `layout_analyzer` slots without touching
//! the environment.

use crate::error::ExtractError;
use crate::pipeline::model::{LayoutAnalyzer, ModelProvider};
use std::fmt;
use std::sync::Arc;

/// Byte budget for images sent to the layout-analysis service.
///
/// The transport ceiling is 6 MiB; 4.5 MiB leaves margin for base64
/// expansion and the JSON envelope around the payload.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 4_718_592; // 4.5 MiB

/// Configuration for event extraction.
///
/// Built via [`ExtractionConfig::builder()`] or [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2events::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .model("claude-3-haiku-20240307")
///     .temperature(0.5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Model identifier sent to the model-invocation service.
    pub model: String,

    /// Sampling temperature. Default: 0.5.
    ///
    /// Moderate temperature biases toward deterministic-but-not-degenerate
    /// extraction: low enough to stay faithful to the document, high enough
    /// that the model does not loop on repetitive layouts.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2500.
    ///
    /// Long documents with many events can exceed this; the response
    /// recoverer salvages the complete prefix of a truncated reply rather
    /// than discarding it, so raising this limit is a cost knob, not a
    /// correctness one.
    pub max_tokens: usize,

    /// Byte budget enforced by the size normalizer on image payloads.
    /// Default: [`DEFAULT_MAX_IMAGE_BYTES`]. PDFs are never normalized.
    pub max_image_bytes: usize,

    /// Model-invocation endpoint URL. Used only when no `model_provider`
    /// is injected.
    pub model_endpoint: String,

    /// API key for the model-invocation endpoint. If `None`, read from
    /// `DOC2EVENTS_MODEL_API_KEY` at client construction.
    pub model_api_key: Option<String>,

    /// Layout-analysis endpoint URL. Used only when no `layout_analyzer`
    /// is injected.
    pub layout_endpoint: Option<String>,

    /// API key for the layout-analysis endpoint. If `None`, read from
    /// `DOC2EVENTS_LAYOUT_API_KEY` at client construction.
    pub layout_api_key: Option<String>,

    /// Pre-constructed model client. Takes precedence over `model_endpoint`.
    pub model_provider: Option<Arc<dyn ModelProvider>>,

    /// Pre-constructed layout-analysis client. Takes precedence over
    /// `layout_endpoint`.
    pub layout_analyzer: Option<Arc<dyn LayoutAnalyzer>>,

    /// Per-service-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-haiku-20240307".to_string(),
            temperature: 0.5,
            max_tokens: 2500,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            model_endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model_api_key: None,
            layout_endpoint: None,
            layout_api_key: None,
            model_provider: None,
            layout_analyzer: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("model_endpoint", &self.model_endpoint)
            .field("model_api_key", &self.model_api_key.as_ref().map(|_| "<redacted>"))
            .field("layout_endpoint", &self.layout_endpoint)
            .field("layout_api_key", &self.layout_api_key.as_ref().map(|_| "<redacted>"))
            .field("model_provider", &self.model_provider.as_ref().map(|_| "<dyn ModelProvider>"))
            .field("layout_analyzer", &self.layout_analyzer.as_ref().map(|_| "<dyn LayoutAnalyzer>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_image_bytes(mut self, n: usize) -> Self {
        self.config.max_image_bytes = n;
        self
    }

    pub fn model_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.model_endpoint = url.into();
        self
    }

    pub fn model_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.model_api_key = Some(key.into());
        self
    }

    pub fn layout_endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.layout_endpoint = Some(url.into());
        self
    }

    pub fn layout_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.layout_api_key = Some(key.into());
        self
    }

    pub fn model_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.config.model_provider = Some(provider);
        self
    }

    pub fn layout_analyzer(mut self, analyzer: Arc<dyn LayoutAnalyzer>) -> Self {
        self.config.layout_analyzer = Some(analyzer);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_image_bytes == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_image_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_invocation_contract() {
        let config = ExtractionConfig::default();
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_tokens, 2500);
        assert_eq!(config.max_image_bytes, 4_718_592);
    }

    #[test]
    fn temperature_is_clamped() {
        let config = ExtractionConfig::builder().temperature(3.0).build().unwrap();
        assert_eq!(config.temperature, 1.0);
    }

    #[test]
    fn empty_model_rejected() {
        let err = ExtractionConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = ExtractionConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }
}
