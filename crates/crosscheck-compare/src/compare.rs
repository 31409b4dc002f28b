//! Structural comparison of two document trees
//!
//! The traversal is pure and deterministic: object keys are visited in sorted
//! order, record arrays are matched by discovered key (falling back to
//! position), and scalars go through tolerant equality. Inputs are never
//! mutated and the result is local to the call, so callers may run many
//! comparisons concurrently without coordination.

use crosscheck_core::{
    display_value, is_scalar, parse_document, scalar_display, CompareOptions, CompareResult,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::diff::{ComparisonResult, DiffRecord, MissingRecord};
use crate::equality::tolerant_eq;
use crate::keys::{discover, CompositeKey};

/// Compare two normalized documents under the given options
pub fn compare(left: &Value, right: &Value, options: &CompareOptions) -> ComparisonResult {
    let mut result = ComparisonResult::default();
    compare_node("", Some(left), Some(right), options, &mut result);
    result
}

/// Compare two documents with the default options and the given tolerance
pub fn compare_with_tolerance(left: &Value, right: &Value, tolerance: f64) -> ComparisonResult {
    compare(left, right, &CompareOptions::with_tolerance(tolerance))
}

/// Parse two JSON texts and compare them
///
/// A side that fails to parse propagates the parse error; an unreadable
/// document must never be reported as a clean match.
pub fn compare_documents(
    left: &str,
    right: &str,
    options: &CompareOptions,
) -> CompareResult<ComparisonResult> {
    let left = parse_document(left)?;
    let right = parse_document(right)?;
    Ok(compare(&left, &right, options))
}

fn compare_node(
    path: &str,
    left: Option<&Value>,
    right: Option<&Value>,
    options: &CompareOptions,
    result: &mut ComparisonResult,
) {
    if !path.is_empty() && options.is_ignored_path(path) {
        return;
    }

    match (left, right) {
        (None, None) => {}
        (Some(Value::Object(l)), Some(Value::Object(r))) => {
            compare_objects(path, l, r, options, result);
        }
        (Some(Value::Array(l)), Some(Value::Array(r))) => {
            compare_arrays(path, l, r, options, result);
        }
        // a container against nothing recurses against its empty counterpart,
        // so nested missing fields surface individually
        (Some(Value::Object(l)), None) => {
            compare_objects(path, l, &Map::new(), options, result);
        }
        (None, Some(Value::Object(r))) => {
            compare_objects(path, &Map::new(), r, options, result);
        }
        (Some(Value::Array(l)), None) => {
            compare_arrays(path, l, &[], options, result);
        }
        (None, Some(Value::Array(r))) => {
            compare_arrays(path, &[], r, options, result);
        }
        _ => compare_scalars(path, left, right, options, result),
    }
}

fn compare_objects(
    path: &str,
    left: &Map<String, Value>,
    right: &Map<String, Value>,
    options: &CompareOptions,
    result: &mut ComparisonResult,
) {
    let keys: BTreeSet<&str> = left
        .keys()
        .chain(right.keys())
        .map(String::as_str)
        .collect();
    for &key in &keys {
        // a field with an alias-suffixed counterpart is handled at the alias
        if options
            .alias_suffixes
            .iter()
            .any(|s| keys.contains(format!("{key}{s}").as_str()))
        {
            continue;
        }
        match options.alias_base(key).filter(|b| keys.contains(b)) {
            Some(base) => compare_aliased(path, key, base, left, right, options, result),
            None => {
                let child_path = join_path(path, key);
                compare_node(&child_path, left.get(key), right.get(key), options, result);
            }
        }
    }
}

/// Compare a field that one side renamed with an alias suffix
/// (`price` on the left against `price_v2` on the right)
fn compare_aliased(
    path: &str,
    key: &str,
    base: &str,
    left: &Map<String, Value>,
    right: &Map<String, Value>,
    options: &CompareOptions,
    result: &mut ComparisonResult,
) {
    let left_name = if left.contains_key(key) { key } else { base };
    let right_name = if right.contains_key(key) { key } else { base };
    let label = if left_name == right_name {
        left_name.to_string()
    } else {
        format!("{left_name} vs {right_name}")
    };
    let child_path = join_path(path, &label);
    compare_node(
        &child_path,
        left.get(left_name),
        right.get(right_name),
        options,
        result,
    );
}

fn compare_arrays(
    path: &str,
    left: &[Value],
    right: &[Value],
    options: &CompareOptions,
    result: &mut ComparisonResult,
) {
    if left.is_empty() && right.is_empty() {
        return;
    }

    let record_arrays = !left.is_empty()
        && !right.is_empty()
        && left.iter().all(Value::is_object)
        && right.iter().all(Value::is_object);
    if record_arrays {
        if let Some(key) = discover(left, right, options) {
            compare_records(path, left, right, &key, options, result);
            return;
        }
        debug!(path, "no composite key; comparing records by position");
    }

    // positional pairing; the longer side's tail compares against nothing
    let len = left.len().max(right.len());
    for i in 0..len {
        let child_path = format!("{path}[{i}]");
        compare_node(&child_path, left.get(i), right.get(i), options, result);
    }
}

/// Match records across the two sides by their built key
fn compare_records(
    path: &str,
    left: &[Value],
    right: &[Value],
    key: &CompositeKey,
    options: &CompareOptions,
    result: &mut ComparisonResult,
) {
    let left_by_key = group_by_key(left, key);
    let right_by_key = group_by_key(right, key);
    trace!(
        path,
        key = %key.label(),
        left = left_by_key.len(),
        right = right_by_key.len(),
        "matching records"
    );

    for (built, (record, annotation)) in &left_by_key {
        match right_by_key.get(built) {
            Some((counterpart, _)) => {
                let child_path = format!("{path}[{annotation}]");
                compare_node(&child_path, Some(*record), Some(*counterpart), options, result);
            }
            None => result.missing_on_right.push(MissingRecord {
                path: path.to_string(),
                key_label: key.label(),
                key_value: annotation.clone(),
            }),
        }
    }

    for (built, (_, annotation)) in &right_by_key {
        if !left_by_key.contains_key(built) {
            result.missing_on_left.push(MissingRecord {
                path: path.to_string(),
                key_label: key.label(),
                key_value: annotation.clone(),
            });
        }
    }
}

/// Records keyed by their built identity, in input order
///
/// Records that cannot build the key (absent/null key field) are excluded
/// from matching.
fn group_by_key<'a>(
    records: &'a [Value],
    key: &CompositeKey,
) -> IndexMap<String, (&'a Value, String)> {
    let mut grouped = IndexMap::new();
    let mut skipped = 0usize;
    for record in records {
        match (key.build(record), key.annotate(record)) {
            (Some(built), Some(annotation)) => {
                grouped.insert(built, (record, annotation));
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(key = %key.label(), skipped, "records without a buildable key excluded from matching");
    }
    grouped
}

fn compare_scalars(
    path: &str,
    left: Option<&Value>,
    right: Option<&Value>,
    options: &CompareOptions,
    result: &mut ComparisonResult,
) {
    let left = left.map(unwrap_value_wrapper);
    let right = right.map(unwrap_value_wrapper);

    match (left, right) {
        // an explicit null against a missing key is not a divergence
        (Some(Value::Null), None) | (None, Some(Value::Null)) => {}
        // value present on one side only: nothing to recurse into, one entry
        (Some(_), None) | (None, Some(_)) => {
            result.field_differences.push(DiffRecord {
                path: path.to_string(),
                left_value: display_value(left),
                right_value: display_value(right),
            });
        }
        (Some(l), Some(r)) => {
            // type mismatches (e.g. object vs string) also land here and
            // compare through their display text
            let l_text = scalar_display(l);
            let r_text = scalar_display(r);
            if !tolerant_eq(&l_text, &r_text, options.tolerance) {
                result.field_differences.push(DiffRecord {
                    path: path.to_string(),
                    left_value: l_text,
                    right_value: r_text,
                });
            }
        }
        (None, None) => {}
    }
}

/// Unwrap one level of a `{"value": X}` wrapper object
fn unwrap_value_wrapper(value: &Value) -> &Value {
    if let Value::Object(map) = value {
        if map.len() == 1 {
            if let Some(inner) = map.get("value") {
                if is_scalar(inner) {
                    return inner;
                }
            }
        }
    }
    value
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
