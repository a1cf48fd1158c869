//! Data model: documents in, events out.
//!
//! Everything here is plain serde data. The one piece of logic is
//! [`DocumentInput::from_envelope`], which decides the document kind exactly
//! once at the boundary. The wire envelope is untyped JSON with an `image`
//! or `pdf` key; resolving that into a tagged union up front means no later
//! stage ever has to re-ask "what kind of document is this?", and the
//! ambiguous both-keys-present request is rejected instead of silently
//! resolved by key-check order.

use crate::error::ExtractError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

// ── Output records ───────────────────────────────────────────────────────

/// One extracted calendar event, exactly as the model emits it.
///
/// Dates are ISO-8601 strings with a UTC−5 offset. The pipeline validates
/// JSON structure only, not date semantics — a model that emits
/// `startDate > endDate` is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub start_date: String,
    pub end_date: String,
    pub event_title: String,
    pub event_description: String,
    pub tags: Vec<String>,
}

/// The `{"events": [...]}` wrapper the pipeline returns.
///
/// The model emits a bare JSON array; the recoverer wraps it into this
/// envelope during parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventList {
    pub events: Vec<Event>,
}

/// One coarse record from the model-free heuristic extractor.
///
/// `start` is a `YYYY-MM-DD` day key; the heuristic path has no notion of
/// an end date or tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicEvent {
    pub title: String,
    pub start: String,
}

// ── Layout-analysis shapes ───────────────────────────────────────────────

/// Kind discriminator for a detected text region.
///
/// The layout-analysis service emits more kinds than these (tables, cells,
/// page markers); everything the tabular representation does not consume
/// collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    #[serde(rename = "LINE")]
    Line,
    #[serde(rename = "WORD")]
    Word,
    #[serde(other)]
    Other,
}

impl RegionKind {
    /// Label used in the tabular representation's `Type` column.
    pub fn label(&self) -> &'static str {
        match self {
            RegionKind::Line => "LINE",
            RegionKind::Word => "WORD",
            RegionKind::Other => "OTHER",
        }
    }
}

/// One detected line/word unit with normalized geometry.
///
/// Ordering of regions is document-scan order, not guaranteed reading
/// order. Missing fields deserialize to zero — the analysis service omits
/// geometry for some block kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub kind: RegionKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

// ── Prompt ───────────────────────────────────────────────────────────────

/// An assembled model request: fixed extraction contract plus document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Extraction contract with the reference timestamp embedded.
    pub system_instruction: String,
    /// Tabular or raw document text.
    pub user_content: String,
}

// ── Boundary envelopes ───────────────────────────────────────────────────

/// A document ready for extraction: raw bytes plus kind, decided once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    Image(Vec<u8>),
    Pdf(Vec<u8>),
}

impl DocumentInput {
    /// The raw document bytes, whatever the kind.
    pub fn bytes(&self) -> &[u8] {
        match self {
            DocumentInput::Image(b) | DocumentInput::Pdf(b) => b,
        }
    }

    /// Parse a request envelope `{"body": {"image"|"pdf": <base64>}}`.
    ///
    /// Exactly one of the two keys must be present; both or neither is an
    /// input error, as is invalid base64 or an empty decoded payload.
    pub fn from_envelope(json: &str) -> Result<Self, ExtractError> {
        let envelope: RequestEnvelope = serde_json::from_str(json)
            .map_err(|e| ExtractError::InvalidEnvelope(e.to_string()))?;
        envelope.body.into_document()
    }
}

#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    body: RequestBody,
}

#[derive(Debug, Deserialize)]
struct RequestBody {
    image: Option<String>,
    pdf: Option<String>,
}

impl RequestBody {
    fn into_document(self) -> Result<DocumentInput, ExtractError> {
        let document = match (self.image, self.pdf) {
            (Some(_), Some(_)) => return Err(ExtractError::AmbiguousKind),
            (None, None) => return Err(ExtractError::MissingPayload),
            (Some(b64), None) => DocumentInput::Image(STANDARD.decode(b64.trim())?),
            (None, Some(b64)) => DocumentInput::Pdf(STANDARD.decode(b64.trim())?),
        };
        if document.bytes().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        Ok(document)
    }
}

/// Response envelope returned by the top-level handler.
///
/// `body` carries the recovered model text verbatim; the API layer is
/// responsible for re-parsing it into an [`EventList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn envelope_image_key() {
        let json = format!(r#"{{"body": {{"image": "{}"}}}}"#, b64(b"jpeg bytes"));
        let doc = DocumentInput::from_envelope(&json).unwrap();
        assert_eq!(doc, DocumentInput::Image(b"jpeg bytes".to_vec()));
    }

    #[test]
    fn envelope_pdf_key() {
        let json = format!(r#"{{"body": {{"pdf": "{}"}}}}"#, b64(b"%PDF-1.4"));
        let doc = DocumentInput::from_envelope(&json).unwrap();
        assert_eq!(doc, DocumentInput::Pdf(b"%PDF-1.4".to_vec()));
    }

    #[test]
    fn envelope_both_keys_rejected() {
        let json = format!(
            r#"{{"body": {{"image": "{}", "pdf": "{}"}}}}"#,
            b64(b"a"),
            b64(b"b")
        );
        let err = DocumentInput::from_envelope(&json).unwrap_err();
        assert!(matches!(err, ExtractError::AmbiguousKind));
    }

    #[test]
    fn envelope_neither_key_rejected() {
        let err = DocumentInput::from_envelope(r#"{"body": {}}"#).unwrap_err();
        assert!(matches!(err, ExtractError::MissingPayload));
    }

    #[test]
    fn envelope_empty_payload_rejected() {
        let json = r#"{"body": {"image": ""}}"#;
        let err = DocumentInput::from_envelope(json).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[test]
    fn envelope_bad_base64_rejected() {
        let json = r#"{"body": {"image": "not base64!!!"}}"#;
        let err = DocumentInput::from_envelope(json).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidBase64(_)));
    }

    #[test]
    fn region_kind_unknown_collapses_to_other() {
        let region: TextRegion =
            serde_json::from_str(r#"{"kind": "TABLE", "text": "x"}"#).unwrap();
        assert_eq!(region.kind, RegionKind::Other);
        assert_eq!(region.confidence, 0.0);
    }

    #[test]
    fn event_round_trips_camel_case() {
        let json = r#"{"startDate":"2025-01-01T09:00:00-0500","endDate":"2025-01-01T10:00:00-0500","eventTitle":"Standup","eventDescription":"daily","tags":["productivity"]}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_title, "Standup");
        let back = serde_json::to_string(&event).unwrap();
        assert!(back.contains("\"startDate\""));
        assert!(!back.contains("start_date"));
    }
}
