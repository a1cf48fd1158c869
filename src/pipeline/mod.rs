//! Pipeline stages for document-to-events extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different layout-analysis backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ normalize ──▶ layout ──▶ prompt ──▶ model ──▶ recover
//!           (JPEG fit)    (CSV/raw)  (anchor)   (HTTP)    (salvage)
//! ```
//!
//! 1. [`normalize`] — fit image payloads under the transport byte budget
//! 2. [`layout`]    — detected regions → CSV table, or PDF pages → raw text
//! 3. [`model`]     — service traits + HTTP clients; the only stages with
//!    network I/O live here
//! 4. [`recover`]   — salvage an event list from truncated/malformed output
//! 5. [`heuristic`] — regex-based model-free alternative over the same text

pub mod heuristic;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod recover;
