//! Row counting and delimited-text helpers
//!
//! A "row count" is a sanity-display estimate of how many records a raw
//! response holds. It is independent of the comparator: callers use it to tell
//! "no data on either side" apart from "response shape not recognized".

use serde_json::{Map, Value};
use tracing::debug;

/// Count the rows in a raw response body
///
/// Tries, in order: a non-empty root array; the known record paths `data`,
/// `data.results`, `data.items`, `results`, `spotlights.retailers`,
/// `spotlights.prolonged_oos_weekly.skus`; the largest array anywhere in the
/// tree; and finally delimited tabular text (non-blank data lines after a
/// header). Returns `None` (never `Some(0)`) when nothing parseable is found
/// or every candidate array is empty.
pub fn count_rows(text: &str) -> Option<usize> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Value::Array(items) = &value {
            return non_empty_len(items.len());
        }

        if let Some(count) = count_from_known_paths(&value) {
            return Some(count);
        }

        let mut max = 0;
        find_largest_array(&value, &mut max);
        return non_empty_len(max);
    }

    debug!("response is not JSON, trying delimited tabular text");
    count_delimited_rows(trimmed)
}

/// Whether both raw responses count to absent (no rows found on either side)
pub fn both_empty(left: &str, right: &str) -> bool {
    count_rows(left).is_none() && count_rows(right).is_none()
}

fn non_empty_len(len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(len)
    }
}

fn count_from_known_paths(value: &Value) -> Option<usize> {
    // Specific paths first; an empty known array falls through to the
    // largest-array scan rather than reporting a count.
    if let Some(data) = value.get("data") {
        if let Value::Array(items) = data {
            return non_empty_len(items.len());
        }
        if data.is_object() {
            if let Some(Value::Array(items)) = data.get("results") {
                return non_empty_len(items.len());
            }
            if let Some(Value::Array(items)) = data.get("items") {
                return non_empty_len(items.len());
            }
        }
    }

    if let Some(Value::Array(items)) = value.get("results") {
        return non_empty_len(items.len());
    }

    if let Some(spotlights) = value.get("spotlights").filter(|s| s.is_object()) {
        if let Some(Value::Array(items)) = spotlights.get("retailers") {
            return non_empty_len(items.len());
        }
        if let Some(Value::Array(items)) = spotlights
            .get("prolonged_oos_weekly")
            .and_then(|p| p.get("skus"))
        {
            return non_empty_len(items.len());
        }
    }

    None
}

fn find_largest_array(value: &Value, max: &mut usize) {
    match value {
        Value::Array(items) => {
            *max = (*max).max(items.len());
            for item in items {
                find_largest_array(item, max);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                find_largest_array(item, max);
            }
        }
        _ => {}
    }
}

fn count_delimited_rows(text: &str) -> Option<usize> {
    if !text.contains(',') || text.starts_with('{') {
        return None;
    }
    let lines: Vec<&str> = text.split(['\n', '\r']).filter(|l| !l.is_empty()).collect();
    if lines.len() < 2 {
        return None;
    }
    // header + data lines; blank-only data counts as absent
    non_empty_len(lines.iter().skip(1).filter(|l| !l.trim().is_empty()).count())
}

/// Convert delimited tabular text (header + data lines) into a JSON array of
/// objects for display. Returns `None` when the text has no data lines.
pub fn delimited_to_records(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lines: Vec<&str> = trimmed
        .split(['\n', '\r'])
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return None;
    }

    let headers = parse_delimited_line(lines[0]);
    if headers.iter().all(|h| h.is_empty()) {
        return None;
    }

    let mut records = Vec::new();
    for line in &lines[1..] {
        if line.trim().is_empty() {
            continue;
        }
        let values = parse_delimited_line(line);
        let mut record = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let key = if header.is_empty() {
                format!("col{i}")
            } else {
                header.clone()
            };
            let value = values.get(i).cloned().unwrap_or_default();
            record.insert(key, Value::String(value));
        }
        records.push(Value::Object(record));
    }
    if records.is_empty() {
        return None;
    }
    Some(Value::Array(records))
}

/// Split one line on commas outside double quotes, trimming each field
fn parse_delimited_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
