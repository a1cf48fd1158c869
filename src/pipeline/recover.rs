//! Response recoverer: salvage an event list from raw model output.
//!
//! The model is instructed to emit a bare JSON array of events, but the
//! output-length cap means long documents can be cut off mid-object or
//! mid-string, and format drift can add prose around the array. This module
//! turns whatever came back into a well-formed [`EventList`], degrading in
//! stages:
//!
//! 1. Wrap the raw text as `{"events": <raw>}` and parse. Succeeds for the
//!    common untruncated case.
//! 2. On failure, truncate at the last `}` (the end of the last *complete*
//!    event object), re-balance the array with a `]`, and parse again.
//! 3. If that also fails, return an empty list.
//!
//! Recovering the longest prefix of complete events is strictly better than
//! discarding the whole response, and an empty list is better than a parse
//! error crashing a best-effort extraction. `recover_events` is therefore a
//! total function: any string in, a valid event list out, never an error.
//!
//! The truncation step is string surgery, not a streaming JSON parser. It
//! stays a narrow last-resort heuristic on purpose; callers that need real
//! truncation-tolerant parsing need a different tool.

use crate::event::EventList;
use tracing::{debug, warn};

/// Parse raw model output into an event list, repairing truncation.
///
/// Never fails. A response that parses cleanly but is not a JSON array
/// (an object, a scalar, prose) takes the same repair path as truncated
/// output and bottoms out at the empty list.
pub fn recover_events(raw: &str) -> EventList {
    if let Some(list) = parse_wrapped(raw) {
        debug!("Model output parsed cleanly: {} events", list.events.len());
        return list;
    }

    if let Some(repaired) = truncate_to_last_object(raw) {
        if let Some(list) = parse_wrapped(&repaired) {
            warn!(
                "Recovered {} complete events from truncated model output ({} bytes)",
                list.events.len(),
                raw.len()
            );
            return list;
        }
    }

    warn!("Model output unrecoverable ({} bytes); returning empty event list", raw.len());
    EventList::default()
}

/// Wrap raw text in the `{"events": …}` envelope and parse strictly.
fn parse_wrapped(raw: &str) -> Option<EventList> {
    serde_json::from_str(&format!("{{\"events\": {raw}}}")).ok()
}

/// Cut the text at the last complete object and re-balance the array.
///
/// Returns `None` when no `}` exists at all — nothing salvageable.
fn truncate_to_last_object(raw: &str) -> Option<String> {
    let last_brace = raw.rfind('}')?;
    let mut repaired = raw[..=last_brace].to_string();
    repaired.push(']');
    Some(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE_EVENT: &str = r#"{"startDate":"2025-01-01T09:00:00-0500","endDate":"2025-01-01T10:00:00-0500","eventTitle":"Standup","eventDescription":"daily","tags":["productivity"]}"#;

    #[test]
    fn well_formed_array_passes_through() {
        let raw = format!("[{COMPLETE_EVENT}]");
        let list = recover_events(&raw);
        assert_eq!(list.events.len(), 1);
        let event = &list.events[0];
        assert_eq!(event.start_date, "2025-01-01T09:00:00-0500");
        assert_eq!(event.end_date, "2025-01-01T10:00:00-0500");
        assert_eq!(event.event_title, "Standup");
        assert_eq!(event.event_description, "daily");
        assert_eq!(event.tags, vec!["productivity"]);
    }

    #[test]
    fn empty_array_yields_empty_list() {
        assert!(recover_events("[]").events.is_empty());
    }

    #[test]
    fn truncated_second_object_keeps_first() {
        let raw = format!(r#"[{COMPLETE_EVENT},{{"startDate":"2025-01-02T09:"#);
        let list = recover_events(&raw);
        assert_eq!(list.events.len(), 1);
        assert_eq!(list.events[0].event_title, "Standup");
    }

    #[test]
    fn truncated_mid_string_keeps_complete_prefix() {
        let raw = format!(
            r#"[{COMPLETE_EVENT},{COMPLETE_EVENT},{{"startDate":"2025-01-03T09:00:00-0500","endDate":"2025-01-03T1"#
        );
        let list = recover_events(&raw);
        assert_eq!(list.events.len(), 2);
    }

    #[test]
    fn no_brace_at_all_yields_empty_list() {
        assert!(recover_events("not json at all").events.is_empty());
    }

    #[test]
    fn empty_and_whitespace_yield_empty_list() {
        assert!(recover_events("").events.is_empty());
        assert!(recover_events("   \n\t  ").events.is_empty());
    }

    #[test]
    fn valid_json_object_is_not_an_event_list() {
        assert!(recover_events(r#"{"events": []}"#).events.is_empty());
        assert!(recover_events(r#"{"a": 1}"#).events.is_empty());
    }

    #[test]
    fn valid_json_scalar_yields_empty_list() {
        assert!(recover_events("42").events.is_empty());
        assert!(recover_events("\"just a string\"").events.is_empty());
    }

    #[test]
    fn object_missing_required_fields_is_unrecoverable() {
        let raw = r#"[{"eventTitle": "no dates"}]"#;
        assert!(recover_events(raw).events.is_empty());
    }

    #[test]
    fn array_with_trailing_prose_recovers_events() {
        let raw = format!("[{COMPLETE_EVENT} I hope this helps!");
        let list = recover_events(&raw);
        assert_eq!(list.events.len(), 1);
    }

    #[test]
    fn never_panics_on_hostile_inputs() {
        for raw in [
            "}{",
            "]][[",
            "[{}]",
            "[{\"startDate\":}]",
            "\u{0}\u{1}}",
            "[null]",
            "[[]]",
            "{\"events\": [",
        ] {
            // A valid (possibly empty) list for every input.
            let _ = recover_events(raw);
        }
    }
}
