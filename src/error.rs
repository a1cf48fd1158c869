//! Error types for the doc2events library.
//!
//! The taxonomy is deliberately small:
//!
//! * **Input errors** — the caller handed us something we cannot even start
//!   on (empty payload, undeterminable document kind, bad base64). Surfaced
//!   immediately; retrying the same request cannot help.
//!
//! * **Service errors** — the layout-analysis or model-invocation call
//!   failed (network, auth, quota, malformed request). The pipeline does not
//!   retry these; the caller decides whether to retry or fall back to the
//!   heuristic extractor.
//!
//! Truncated or malformed *model output* is intentionally **not** an error:
//! the response recoverer degrades to a partial or empty event list instead
//! of failing, because a best-effort partial result outranks a hard failure
//! for a user-correctable feature. See [`crate::pipeline::recover`].

use thiserror::Error;

/// All errors returned by the doc2events library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request envelope carried neither an `image` nor a `pdf` key.
    #[error("Request body has no document payload: expected an 'image' or 'pdf' key")]
    MissingPayload,

    /// The request envelope carried both an `image` and a `pdf` key.
    ///
    /// The document kind must be decided exactly once at the boundary;
    /// guessing a precedence here would silently drop one of the payloads.
    #[error("Request body has both 'image' and 'pdf' keys; the document kind is ambiguous")]
    AmbiguousKind,

    /// The document payload decoded to zero bytes.
    #[error("Document payload is empty")]
    EmptyDocument,

    /// The base64 payload could not be decoded.
    #[error("Document payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The request envelope itself is not valid JSON.
    #[error("Request envelope is not valid JSON: {0}")]
    InvalidEnvelope(String),

    /// Image bytes could not be decoded by any enabled format decoder.
    #[error("Failed to decode image for re-encoding: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// PDF bytes could not be parsed for text extraction.
    #[error("Failed to parse PDF content: {0}")]
    PdfParse(String),

    // ── Service errors ────────────────────────────────────────────────────
    /// The layout-analysis service call failed.
    #[error("Layout analysis failed: {detail}")]
    LayoutService { detail: String },

    /// The model-invocation service call failed.
    #[error("Model invocation failed: {detail}")]
    ModelService { detail: String },

    /// A service client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// True for failures of an external service call. The pipeline never
    /// retries these; the caller may.
    pub fn is_service(&self) -> bool {
        matches!(
            self,
            ExtractError::LayoutService { .. } | ExtractError::ModelService { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_kind_display() {
        let msg = ExtractError::AmbiguousKind.to_string();
        assert!(msg.contains("both"), "got: {msg}");
    }

    #[test]
    fn service_classification() {
        assert!(ExtractError::ModelService {
            detail: "quota".into()
        }
        .is_service());
        assert!(ExtractError::LayoutService {
            detail: "503".into()
        }
        .is_service());
        assert!(!ExtractError::EmptyDocument.is_service());
    }
}
