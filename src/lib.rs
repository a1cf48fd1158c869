//! # doc2events
//!
//! Turn a photographed or scanned document (image or PDF) into a normalized
//! list of calendar events using a hosted text-generation model.
//!
//! ## Why this crate?
//!
//! Documents that carry dates — syllabi, schedules, flyers, emails printed
//! and photographed — rarely carry them in machine-readable form. Instead
//! of hand-writing a parser per layout, this crate feeds a structured
//! rendering of the document to a text-generation model under a strict
//! extraction contract and salvages a well-formed event list from whatever
//! comes back, including truncated or malformed replies.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document bytes
//!  │
//!  ├─ 1. Normalize  re-encode oversized images under the transport budget
//!  ├─ 2. Layout     detected text regions → CSV table (images)
//!  │                per-page native text (PDFs)
//!  ├─ 3. Prompt     fixed extraction contract + UTC−5 reference timestamp
//!  ├─ 4. Invoke     hosted model call (max_tokens 2500, temperature 0.5)
//!  └─ 5. Recover    salvage an event list from the raw model output
//! ```
//!
//! A model-free fallback ([`pipeline::heuristic`]) scans the same extracted
//! text with fixed date/time regexes; both strategies sit behind the
//! [`EventExtractor`] trait and are selected by the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2events::{pdf_to_events, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from DOC2EVENTS_MODEL_API_KEY
//!     let config = ExtractionConfig::default();
//!     let bytes = std::fs::read("syllabus.pdf")?;
//!     let list = pdf_to_events(&bytes, &config).await?;
//!     for event in &list.events {
//!         println!("{}  {}", event.start_date, event.event_title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure policy
//!
//! Input and service failures return [`ExtractError`]; a truncated or
//! malformed *model reply* does not — the recoverer degrades to a partial
//! or empty list instead. Treat an empty [`EventList`] as "no events found
//! or extraction degraded", not as a hard failure.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2events` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc2events = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_MAX_IMAGE_BYTES};
pub use error::ExtractError;
pub use event::{
    DocumentInput, Event, EventList, HeuristicEvent, Prompt, RegionKind, ResponseEnvelope,
    TextRegion,
};
pub use extract::{
    document_to_events, document_to_raw, handle_request, image_to_events, pdf_to_events,
    EventExtractor, HeuristicRegex, ModelBacked,
};
pub use pipeline::heuristic::extract_heuristic;
pub use pipeline::model::{HttpLayoutAnalyzer, HttpModelProvider, LayoutAnalyzer, ModelProvider};
pub use pipeline::normalize::normalize_image_size;
pub use pipeline::recover::recover_events;
