//! Model-free fallback: regex date/time scanning over extracted text.
//!
//! When no model is available (or a caller prefers not to pay for one),
//! events can still be pulled out of document text with fixed date and time
//! patterns. The scanner walks the text line by line and groups lines under
//! the most recent date seen:
//!
//! * a line with a date flushes the previous group and starts a new one
//!   from the line's residual text (date/time substrings stripped);
//! * a line without a date joins the current group's description, and is
//!   scanned for a time if the group has none yet;
//! * lines before the first date are discarded;
//! * the last open group is flushed after the final line.
//!
//! This is deliberately coarse. Matched substrings are not semantically
//! validated (`13/45/2099` is not rejected by the regexes; it simply fails
//! to parse and the line is treated as dateless), and only the enumerated
//! formats are recognised — anything else is silently skipped.

use crate::event::HeuristicEvent;
use crate::prompts::reference_offset;
use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// Date patterns, in priority order: first match per line wins.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Numeric D/M/Y variants, 2- or 4-digit year
        r"(?i)\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
        // Month-name formats: "March 15, 2025", "Mar 15 2025"
        r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2},? \d{4}\b",
        // ISO Y-M-D
        r"(?i)\b\d{4}[-/]\d{1,2}[-/]\d{1,2}\b",
        // Weekday + month-day, year implied
        r"(?i)\b(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday|Mon|Tue|Wed|Thu|Fri|Sat|Sun),?\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date pattern compiles"))
    .collect()
});

// Time patterns, in priority order.
static TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 12-hour with AM/PM, minutes optional
        r"(?i)\b(?:1[0-2]|0?[1-9])(?::[0-5][0-9])?\s*(?:AM|PM)\b",
        // 24-hour
        r"\b(?:2[0-3]|[01]?[0-9]):[0-5][0-9]\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("time pattern compiles"))
    .collect()
});

/// Weekday prefix stripped before year-resolved parsing.
static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday|Mon|Tue|Wed|Thu|Fri|Sat|Sun),?\s+",
    )
    .expect("weekday pattern compiles")
});

/// Formats tried against a matched date substring, in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m-%d-%y",
];

/// Extract coarse `{title, start}` events from plain text.
///
/// Year-less dates (weekday + month-day) resolve to the current year in the
/// pipeline's fixed UTC−5 timezone.
pub fn extract_heuristic(text: &str) -> Vec<HeuristicEvent> {
    let year = Utc::now().with_timezone(&reference_offset()).year();
    extract_heuristic_with_year(text, year)
}

struct Group {
    date: NaiveDate,
    time: Option<String>,
    description: Vec<String>,
}

fn extract_heuristic_with_year(text: &str, year: i32) -> Vec<HeuristicEvent> {
    let mut events = Vec::new();
    let mut current: Option<Group> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let date_match = find_date(line, year);
        let time_match = find_time(line);

        if let Some((date, date_text)) = date_match {
            if let Some(group) = current.take() {
                flush(&mut events, group);
            }

            let mut residual = line.to_string();
            if let Some(ref time) = time_match {
                residual = remove_first(&residual, time);
            }
            residual = remove_first(&residual, &date_text);

            let mut description = Vec::new();
            let residual = normalize_spaces(&residual);
            if !residual.is_empty() {
                description.push(residual);
            }
            current = Some(Group {
                date,
                time: time_match,
                description,
            });
        } else if let Some(group) = current.as_mut() {
            let mut line = line.to_string();
            if group.time.is_none() {
                if let Some(time) = time_match {
                    line = remove_first(&line, &time);
                    group.time = Some(time);
                }
            }
            let line = normalize_spaces(&line);
            if !line.is_empty() {
                group.description.push(line);
            }
        }
        // Lines before the first date are discarded.
    }

    if let Some(group) = current {
        flush(&mut events, group);
    }

    events
}

/// First date pattern match in `line` that also parses, with its matched text.
fn find_date(line: &str, year: i32) -> Option<(NaiveDate, String)> {
    for pattern in DATE_PATTERNS.iter() {
        if let Some(m) = pattern.find(line) {
            if let Some(date) = parse_date_str(m.as_str(), year) {
                return Some((date, m.as_str().to_string()));
            }
        }
    }
    None
}

/// First time pattern match in `line`, as matched text.
fn find_time(line: &str) -> Option<String> {
    TIME_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(line))
        .map(|m| m.as_str().to_string())
}

/// Parse a matched date substring against the enumerated formats.
fn parse_date_str(s: &str, year: i32) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            // A two-digit year parsed by %Y would land in the first century;
            // skip so the %y formats apply their pivot instead.
            if fmt.contains("%Y") && date.year() < 100 {
                continue;
            }
            return Some(date);
        }
    }

    // Weekday + month-day carries no year: drop the weekday (which would
    // otherwise have to be consistent with the resolved date) and attach
    // the current year.
    let stripped = WEEKDAY_PREFIX.replace(s, "");
    if stripped.len() != s.len() {
        let with_year = format!("{} {}", stripped.trim(), year);
        for fmt in ["%B %d %Y", "%b %d %Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(&with_year, fmt) {
                return Some(date);
            }
        }
    }

    None
}

fn remove_first(text: &str, needle: &str) -> String {
    text.replacen(needle, "", 1)
}

fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flush(events: &mut Vec<HeuristicEvent>, group: Group) {
    if group.description.is_empty() {
        return;
    }
    let mut title = group.description.join(" ");
    if let Some(time) = group.time {
        title = format!("{time} - {title}");
    }
    events.push(HeuristicEvent {
        title,
        start: group.date.format("%Y-%m-%d").to_string(),
    });
}
