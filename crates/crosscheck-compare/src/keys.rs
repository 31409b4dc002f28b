//! Composite key discovery
//!
//! Records inside an array-of-objects carry no declared identity; which fields
//! identify a record is discovered at runtime. Discovery collects candidate
//! identity fields from a sample record, drops metric/measure fields, ranks the
//! rest, and searches field combinations of growing size until one builds a
//! key that is unique within each side's array.

use crosscheck_core::{scalar_display, CompareOptions};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Delimiter joining the per-field parts of a built key.
/// Reserved: a field value containing it could make two distinct records
/// collide, which injectivity checking would then reject.
pub const KEY_DELIMITER: char = '|';

/// An ordered set of field paths that jointly identify a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeKey {
    fields: Vec<String>,
}

impl CompositeKey {
    /// Create a key over the given dotted field paths
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// The field paths, in key order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field names joined with the key delimiter, e.g. `retailer|store_id`
    pub fn label(&self) -> String {
        self.fields.join(&KEY_DELIMITER.to_string())
    }

    /// Build the identity string for a record, e.g. `R1|2`
    ///
    /// Each field contributes its normalized string form (hyphenated
    /// identifiers are canonicalized so one stray dash does not unmatch a
    /// record). `None` when any key field is absent or null on this record;
    /// such a record is excluded from key-based matching.
    pub fn build(&self, record: &Value) -> Option<String> {
        let parts: Vec<String> = self
            .parts(record)?
            .into_iter()
            .map(|p| crate::equality::normalize_hyphenated_id(&p).unwrap_or(p))
            .collect();
        Some(parts.join(&KEY_DELIMITER.to_string()))
    }

    /// Render `field=value` pairs for path annotations,
    /// e.g. `retailer=R1|store_id=2`
    pub fn annotate(&self, record: &Value) -> Option<String> {
        let parts = self.parts(record)?;
        let pairs: Vec<String> = self
            .fields
            .iter()
            .zip(parts)
            .map(|(field, value)| format!("{field}={value}"))
            .collect();
        Some(pairs.join(&KEY_DELIMITER.to_string()))
    }

    fn parts(&self, record: &Value) -> Option<Vec<String>> {
        self.fields
            .iter()
            .map(|field| {
                let value = lookup_path(record, field)?;
                if value.is_null() {
                    return None;
                }
                Some(scalar_display(value))
            })
            .collect()
    }
}

/// Find the field combination that uniquely identifies records within `left`
/// and within `right` independently
///
/// The preferred identity fields present on the sample record are tried first
/// as one unit, so a record array carrying e.g. both `retailer` and `store_id`
/// is keyed by the pair even when one of them happens to be unique on its own.
/// Only when that set is absent or collides does discovery search ranked
/// candidate combinations of growing size. Returns `None` when nothing up to
/// `options.max_key_fields` fields is injective on both sides; callers then
/// fall back to positional comparison.
pub fn discover(left: &[Value], right: &[Value], options: &CompareOptions) -> Option<CompositeKey> {
    let sample = left.first().or_else(|| right.first())?;
    let candidates = rank_candidates(collect_leaf_paths(sample), options);
    if candidates.is_empty() {
        debug!("no identity candidates in sample record");
        return None;
    }

    let preferred: Vec<String> = options
        .preferred_keys
        .iter()
        .filter(|k| candidates.iter().any(|c| c == *k))
        .cloned()
        .collect();
    if !preferred.is_empty() {
        let key = CompositeKey::new(preferred);
        if injective_within(&key, left) && injective_within(&key, right) {
            debug!(key = %key.label(), "using preferred identity fields");
            return Some(key);
        }
    }

    let max_size = options.max_key_fields.min(candidates.len()).max(1);
    for size in 1..=max_size {
        let mut combo = Vec::with_capacity(size);
        if let Some(key) = search_combinations(&candidates, 0, size, &mut combo, left, right) {
            debug!(key = %key.label(), "discovered composite key");
            return Some(key);
        }
    }
    debug!(
        candidates = candidates.len(),
        max_size, "no injective key combination found"
    );
    None
}

/// Scalar leaf paths reachable from a record, in document order
///
/// Nested objects flatten to dotted paths, so a `{"value": X}` wrapper
/// contributes `path.value` directly. Arrays are never identity fields.
fn collect_leaf_paths(record: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    if let Value::Object(map) = record {
        for (field, value) in map {
            match value {
                Value::Object(_) => {
                    for sub in collect_leaf_paths(value) {
                        paths.push(format!("{field}.{sub}"));
                    }
                }
                Value::Array(_) => {}
                _ => paths.push(field.clone()),
            }
        }
    }
    paths
}

/// Preferred identity fields first (in preference order), the rest
/// lexicographic; metric fields excluded
fn rank_candidates(paths: Vec<String>, options: &CompareOptions) -> Vec<String> {
    let available: Vec<String> = paths
        .into_iter()
        .filter(|p| !options.is_metric_field(p))
        .collect();

    let mut ranked: Vec<String> = options
        .preferred_keys
        .iter()
        .filter(|k| available.iter().any(|p| p == *k))
        .cloned()
        .collect();
    let mut rest: Vec<String> = available
        .into_iter()
        .filter(|p| !ranked.contains(p))
        .collect();
    rest.sort();
    ranked.extend(rest);
    ranked
}

fn search_combinations(
    candidates: &[String],
    start: usize,
    size: usize,
    combo: &mut Vec<String>,
    left: &[Value],
    right: &[Value],
) -> Option<CompositeKey> {
    if combo.len() == size {
        let key = CompositeKey::new(combo.clone());
        if injective_within(&key, left) && injective_within(&key, right) {
            return Some(key);
        }
        return None;
    }
    for i in start..candidates.len() {
        combo.push(candidates[i].clone());
        let found = search_combinations(candidates, i + 1, size, combo, left, right);
        combo.pop();
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Whether the built key distinguishes every record in one side's array
///
/// Records that cannot build the key are excluded rather than treated as
/// collisions, but at least one record must build it on a non-empty side.
fn injective_within(key: &CompositeKey, records: &[Value]) -> bool {
    let mut seen = HashSet::new();
    let mut built = 0usize;
    for record in records {
        if let Some(k) = key.build(record) {
            built += 1;
            if !seen.insert(k) {
                return false;
            }
        }
    }
    records.is_empty() || built > 0
}

/// Resolve a dotted path against a record
pub fn lookup_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Value> {
        value.as_array().unwrap().clone()
    }

    #[test]
    fn test_single_preferred_field() {
        let left = records(json!([{"id": 1, "count": 5}, {"id": 2, "count": 5}]));
        let right = records(json!([{"id": 2, "count": 6}]));
        let key = discover(&left, &right, &CompareOptions::default()).unwrap();
        assert_eq!(key.fields(), ["id"]);
    }

    #[test]
    fn test_metric_fields_never_identity() {
        // `count` differs per record but is a metric; only `brand` is eligible
        let left = records(json!([{"brand": "A", "count": 1}, {"brand": "B", "count": 2}]));
        let right = left.clone();
        let key = discover(&left, &right, &CompareOptions::default()).unwrap();
        assert_eq!(key.fields(), ["brand"]);
    }

    #[test]
    fn test_preferred_fields_used_as_a_unit() {
        // store_id alone would be unique on both sides, but both preferred
        // fields are present so the pair keys the records
        let left = records(json!([{"retailer": "R1", "store_id": "1", "count": 10}]));
        let right = records(json!([
            {"retailer": "R1", "store_id": "1", "count": 11},
            {"retailer": "R2", "store_id": "2", "count": 20},
        ]));
        let key = discover(&left, &right, &CompareOptions::default()).unwrap();
        assert_eq!(key.fields(), ["retailer", "store_id"]);
    }

    #[test]
    fn test_key_build_normalizes_hyphenated_ids() {
        let key = CompositeKey::new(vec!["id".to_string()]);
        let a = json!({"id": "Walgreens-USprod6020383"});
        let b = json!({"id": "Walgreens-US-prod6020383"});
        assert_eq!(key.build(&a), key.build(&b));
        // the annotation keeps the raw value
        assert_eq!(key.annotate(&a).unwrap(), "id=Walgreens-USprod6020383");
    }

    #[test]
    fn test_composite_of_two_fields() {
        // retailer alone collides, store_id alone collides; the pair is unique
        let left = records(json!([
            {"retailer": "R1", "store_id": "1"},
            {"retailer": "R1", "store_id": "2"},
            {"retailer": "R2", "store_id": "1"},
        ]));
        let right = left.clone();
        let key = discover(&left, &right, &CompareOptions::default()).unwrap();
        assert_eq!(key.fields(), ["retailer", "store_id"]);
        assert_eq!(key.label(), "retailer|store_id");
        assert_eq!(key.build(&left[1]).unwrap(), "R1|2");
        assert_eq!(key.annotate(&left[1]).unwrap(), "retailer=R1|store_id=2");
    }

    #[test]
    fn test_nested_value_wrapper_collapses() {
        let left = records(json!([
            {"date": {"value": "2024-01-01"}, "count": 1},
            {"date": {"value": "2024-01-02"}, "count": 2},
        ]));
        let right = left.clone();
        let key = discover(&left, &right, &CompareOptions::default()).unwrap();
        assert_eq!(key.fields(), ["date.value"]);
    }

    #[test]
    fn test_no_discoverable_key() {
        // every non-metric field is identical across records
        let left = records(json!([
            {"brand": "A", "count": 1},
            {"brand": "A", "count": 2},
        ]));
        let right = left.clone();
        assert!(discover(&left, &right, &CompareOptions::default()).is_none());
    }

    #[test]
    fn test_injectivity_required_on_both_sides() {
        let left = records(json!([{"id": 1}, {"id": 2}]));
        let right = records(json!([{"id": 1}, {"id": 1}]));
        assert!(discover(&left, &right, &CompareOptions::default()).is_none());
    }

    #[test]
    fn test_null_key_field_excludes_record() {
        let left = records(json!([{"id": 1}, {"id": null}]));
        let right = records(json!([{"id": 1}]));
        let key = discover(&left, &right, &CompareOptions::default()).unwrap();
        assert_eq!(key.build(&left[1]), None);
    }

    #[test]
    fn test_max_key_fields_caps_search() {
        let left = records(json!([
            {"a": 1, "b": 1, "c": 1, "d": 1},
            {"a": 1, "b": 1, "c": 1, "d": 2},
        ]));
        let right = left.clone();
        let mut options = CompareOptions::default();
        options.max_key_fields = 1;
        // only `d` distinguishes the records, but it is only reachable at size 1
        let key = discover(&left, &right, &options).unwrap();
        assert_eq!(key.fields(), ["d"]);
    }
}
