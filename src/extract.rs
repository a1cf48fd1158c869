//! Entry points: drive a document through the extraction pipeline.
//!
//! The stage chain is strictly sequential per invocation — one document in,
//! one event list out — and every intermediate artifact is local to the
//! call. Nothing here retries: a layout or model failure surfaces as a
//! service error, and the caller decides between retrying and falling back
//! to the [`HeuristicRegex`] strategy.
//!
//! Two extraction strategies sit behind the [`EventExtractor`] trait:
//!
//! * [`ModelBacked`] — the full pipeline (normalize → layout → prompt →
//!   model → recover);
//! * [`HeuristicRegex`] — the regex scanner over the same extracted text,
//!   no model call involved.
//!
//! They are selected by the caller, never by control-flow fallthrough, so
//! each stays independently testable.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::event::{DocumentInput, Event, EventList, HeuristicEvent, ResponseEnvelope};
use crate::pipeline::model::{
    HttpLayoutAnalyzer, HttpModelProvider, LayoutAnalyzer, ModelProvider,
};
use crate::pipeline::{heuristic, layout, normalize, recover};
use crate::prompts;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Extract events from a document via the model-backed pipeline.
///
/// This is the primary entry point for the library. Returns a (possibly
/// empty) event list; an empty list means "no events found or extraction
/// degraded", not a hard failure.
///
/// # Errors
/// * Input errors — undecodable image, unparseable PDF
/// * Service errors — layout-analysis or model call failed
pub async fn document_to_events(
    document: &DocumentInput,
    config: &ExtractionConfig,
) -> Result<EventList, ExtractError> {
    let raw = document_to_raw(document, config).await?;
    Ok(recover::recover_events(&raw))
}

/// Extract events from raw image bytes.
pub async fn image_to_events(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<EventList, ExtractError> {
    document_to_events(&DocumentInput::Image(bytes.to_vec()), config).await
}

/// Extract events from raw PDF bytes.
pub async fn pdf_to_events(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<EventList, ExtractError> {
    document_to_events(&DocumentInput::Pdf(bytes.to_vec()), config).await
}

/// Run the pipeline up to the model call and return its raw text output.
///
/// Used by [`handle_request`], whose response envelope carries the raw
/// model text for the API layer to re-parse.
pub async fn document_to_raw(
    document: &DocumentInput,
    config: &ExtractionConfig,
) -> Result<String, ExtractError> {
    let text = document_text(document, config).await?;
    let prompt = prompts::build_prompt(&text, prompts::reference_now());
    debug!("Prompt assembled: {} bytes of document text", text.len());

    let provider = resolve_model_provider(config)?;
    let raw = provider.invoke(&prompt).await?;
    info!("Model invocation complete: {} bytes of raw output", raw.len());
    Ok(raw)
}

/// Handle a JSON request envelope end to end.
///
/// Parses `{"body": {"image"|"pdf": <base64>}}`, runs the pipeline, and
/// returns `{"statusCode": 200, "body": <raw model text>}`. The caller
/// unwraps `body` back into an event list (typically via
/// [`crate::pipeline::recover::recover_events`]).
pub async fn handle_request(
    envelope_json: &str,
    config: &ExtractionConfig,
) -> Result<ResponseEnvelope, ExtractError> {
    let document = DocumentInput::from_envelope(envelope_json)?;
    let raw = document_to_raw(&document, config).await?;
    Ok(ResponseEnvelope {
        status_code: 200,
        body: raw,
    })
}

/// Produce the model-ready text for a document, whatever its kind.
///
/// Images go through size normalization and layout analysis into the CSV
/// tabular representation; PDFs skip both and yield raw concatenated page
/// text. An empty result is passed through — the pipeline does not
/// short-circuit on blank documents.
async fn document_text(
    document: &DocumentInput,
    config: &ExtractionConfig,
) -> Result<String, ExtractError> {
    match document {
        DocumentInput::Image(bytes) => {
            info!("Extracting from image document ({} bytes)", bytes.len());
            let normalized = normalize::normalize_image_size(bytes, config.max_image_bytes)?;
            let analyzer = resolve_layout_analyzer(config)?;
            let regions = analyzer.analyze(&normalized).await?;
            debug!("Layout analysis found {} regions", regions.len());
            layout::regions_to_table(&regions)
        }
        DocumentInput::Pdf(bytes) => {
            info!("Extracting from PDF document ({} bytes)", bytes.len());
            let pages = layout::extract_pdf_text(bytes)?;
            Ok(layout::concat_page_texts(&pages))
        }
    }
}

fn resolve_model_provider(
    config: &ExtractionConfig,
) -> Result<Arc<dyn ModelProvider>, ExtractError> {
    if let Some(ref provider) = config.model_provider {
        return Ok(Arc::clone(provider));
    }
    Ok(Arc::new(HttpModelProvider::from_config(config)?))
}

fn resolve_layout_analyzer(
    config: &ExtractionConfig,
) -> Result<Arc<dyn LayoutAnalyzer>, ExtractError> {
    if let Some(ref analyzer) = config.layout_analyzer {
        return Ok(Arc::clone(analyzer));
    }
    Ok(Arc::new(HttpLayoutAnalyzer::from_config(config)?))
}

// ── Extraction strategies ────────────────────────────────────────────────

/// A selectable event-extraction strategy.
#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(&self, document: &DocumentInput) -> Result<EventList, ExtractError>;
}

/// The full model-backed pipeline.
#[derive(Debug, Clone)]
pub struct ModelBacked {
    config: ExtractionConfig,
}

impl ModelBacked {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EventExtractor for ModelBacked {
    async fn extract(&self, document: &DocumentInput) -> Result<EventList, ExtractError> {
        document_to_events(document, &self.config).await
    }
}

/// The regex scanner over the same extracted text; no model call.
///
/// Coarse records map into [`Event`]s with `start_date` = `end_date` =
/// the `YYYY-MM-DD` day key and empty description/tags, so both strategies
/// satisfy the same interface. Callers that want the unconverted records
/// can use [`crate::pipeline::heuristic::extract_heuristic`] directly.
#[derive(Debug, Clone)]
pub struct HeuristicRegex {
    config: ExtractionConfig,
}

impl HeuristicRegex {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EventExtractor for HeuristicRegex {
    async fn extract(&self, document: &DocumentInput) -> Result<EventList, ExtractError> {
        let text = document_text(document, &self.config).await?;
        let events = heuristic::extract_heuristic(&text)
            .into_iter()
            .map(coarse_to_event)
            .collect();
        Ok(EventList { events })
    }
}

fn coarse_to_event(coarse: HeuristicEvent) -> Event {
    Event {
        start_date: coarse.start.clone(),
        end_date: coarse.start,
        event_title: coarse.title,
        event_description: String::new(),
        tags: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_record_maps_to_event() {
        let event = coarse_to_event(HeuristicEvent {
            title: "2:00 PM - Budget review".into(),
            start: "2025-03-15".into(),
        });
        assert_eq!(event.start_date, "2025-03-15");
        assert_eq!(event.end_date, "2025-03-15");
        assert_eq!(event.event_title, "2:00 PM - Budget review");
        assert!(event.event_description.is_empty());
        assert!(event.tags.is_empty());
    }
}
