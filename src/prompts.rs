//! System prompt for model-backed event extraction.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the extraction contract (field
//!    names, tag vocabulary, date format) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt directly
//!    without a live model call.
//!
//! The reference timestamp is captured once per invocation and embedded
//! verbatim in the instruction text, so the model resolves relative dates
//! ("next Tuesday", a month/day with no year) against a concrete anchor
//! instead of whatever "today" it imagines. Both dates in the output format
//! and the anchor use the same fixed UTC−5 offset.

use crate::event::Prompt;
use chrono::{DateTime, FixedOffset, Utc};

/// Fixed timezone for the reference timestamp and all emitted dates (UTC−5).
pub fn reference_offset() -> FixedOffset {
    // Statically valid: 5 hours is inside FixedOffset's ±24 h range.
    FixedOffset::west_opt(5 * 3600).expect("UTC-5 is a valid offset")
}

/// Capture "now" in the reference timezone.
///
/// Every invocation calls this exactly once, so the instruction text and any
/// relative-date resolution the model performs agree on the same instant.
pub fn reference_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&reference_offset())
}

/// Render a timestamp the way the instruction text embeds it.
pub fn format_reference(now: DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

/// Fixed extraction contract. `{current_date}` is replaced at build time.
const SYSTEM_INSTRUCTION_TEMPLATE: &str = r#"You are acting strictly as a date and event extractor. You read document text and return every event and deadline it contains in a consistent format. No response should be provided other than the formatted data: no prose, no commentary, no explanation.

The output must be a single JSON array. Each element has exactly these five fields:
[
{
"startDate": "<start date of the event, %Y-%m-%dT%H:%M:%S%z, UTC-5>",
"endDate": "<end date of the event, %Y-%m-%dT%H:%M:%S%z, UTC-5>",
"eventTitle": "<title of event>",
"eventDescription": "<short event description>",
"tags": <list of relevant tags, e.g. "productivity", "recreation", "personal", "athletics">
}
]

The current date is {current_date}
Resolve relative dates against the current date above.
Make sure to find ALL events and important deadlines, not just the first."#;

/// Build the system instruction with the reference timestamp embedded.
pub fn build_system_instruction(now: DateTime<FixedOffset>) -> String {
    SYSTEM_INSTRUCTION_TEMPLATE.replace("{current_date}", &format_reference(now))
}

/// Assemble a full prompt from extracted document text.
///
/// `text` is either the CSV tabular representation (images) or raw
/// concatenated page text (PDFs). Deterministic given identical inputs and
/// an identical captured timestamp.
pub fn build_prompt(text: &str, now: DateTime<FixedOffset>) -> Prompt {
    Prompt {
        system_instruction: build_system_instruction(now),
        user_content: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<FixedOffset> {
        reference_offset()
            .with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
            .unwrap()
    }

    #[test]
    fn instruction_embeds_timestamp() {
        let instruction = build_system_instruction(fixed_now());
        assert!(instruction.contains("2025-03-14T09:26:53-0500"));
        assert!(!instruction.contains("{current_date}"));
    }

    #[test]
    fn instruction_demands_all_events() {
        let instruction = build_system_instruction(fixed_now());
        assert!(instruction.contains("ALL events"));
        assert!(instruction.contains("startDate"));
        assert!(instruction.contains("tags"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let now = fixed_now();
        assert_eq!(build_prompt("LINE,Standup", now), build_prompt("LINE,Standup", now));
    }

    #[test]
    fn reference_format_has_numeric_offset() {
        let rendered = format_reference(fixed_now());
        assert!(rendered.ends_with("-0500"), "got: {rendered}");
    }
}
