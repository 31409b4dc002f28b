//! Comparison results
//!
//! A comparison produces three ordered collections: records present on only
//! one side, and field-level differences. Results are created per call,
//! populated during traversal, and returned immutably; there is no shared
//! state between comparisons.

use serde::Serialize;

/// One atomic divergence between two documents
///
/// `path` locates the value; array elements carry either the matched key
/// (`items[retailer=R1|store_id=2].count`) or a positional index
/// (`items[3].count`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    pub path: String,
    pub left_value: String,
    pub right_value: String,
}

impl std::fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "path={} | left={} | right={}",
            self.path, self.left_value, self.right_value
        )
    }
}

/// A record found on one side only, identified by its discovered key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingRecord {
    /// Path of the array holding the record
    pub path: String,
    /// Key field names, e.g. `retailer|store_id`
    pub key_label: String,
    /// `field=value` pairs, e.g. `retailer=R2|store_id=2`
    pub key_value: String,
}

impl MissingRecord {
    /// The record's location, e.g. `data[retailer=R2|store_id=2]`
    pub fn location(&self) -> String {
        format!("{}[{}]", self.path, self.key_value)
    }
}

/// One line of the flattened diff view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatDiff {
    pub path: String,
    pub left_display: String,
    pub right_display: String,
}

/// The outcome of comparing two documents
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonResult {
    /// Records present on the right side only
    pub missing_on_left: Vec<MissingRecord>,
    /// Records present on the left side only
    pub missing_on_right: Vec<MissingRecord>,
    /// Matched values that differ
    pub field_differences: Vec<DiffRecord>,
}

impl ComparisonResult {
    /// Whether the two documents compared equal
    pub fn is_match(&self) -> bool {
        self.missing_on_left.is_empty()
            && self.missing_on_right.is_empty()
            && self.field_differences.is_empty()
    }

    /// Total number of reported divergences
    pub fn difference_count(&self) -> usize {
        self.missing_on_left.len() + self.missing_on_right.len() + self.field_differences.len()
    }

    /// One line per divergence, in report order: records missing on the left,
    /// records missing on the right, then field differences
    pub fn flatten(&self) -> Vec<FlatDiff> {
        let mut flat = Vec::with_capacity(self.difference_count());
        for record in &self.missing_on_left {
            flat.push(FlatDiff {
                path: record.location(),
                left_display: "(missing)".to_string(),
                right_display: "(present)".to_string(),
            });
        }
        for record in &self.missing_on_right {
            flat.push(FlatDiff {
                path: record.location(),
                left_display: "(present)".to_string(),
                right_display: "(missing)".to_string(),
            });
        }
        for diff in &self.field_differences {
            flat.push(FlatDiff {
                path: diff.path.clone(),
                left_display: diff.left_value.clone(),
                right_display: diff.right_value.clone(),
            });
        }
        flat
    }

    /// Flattened view truncated to `cap` lines, with a trailing
    /// "... and N more differences" marker when lines were dropped
    pub fn flatten_capped(&self, cap: usize) -> Vec<FlatDiff> {
        let mut flat = self.flatten();
        if flat.len() > cap {
            let dropped = flat.len() - cap;
            flat.truncate(cap);
            flat.push(FlatDiff {
                path: format!("... and {dropped} more differences"),
                left_display: String::new(),
                right_display: String::new(),
            });
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ComparisonResult {
        ComparisonResult {
            missing_on_left: vec![MissingRecord {
                path: "data".to_string(),
                key_label: "retailer|store_id".to_string(),
                key_value: "retailer=R2|store_id=2".to_string(),
            }],
            missing_on_right: Vec::new(),
            field_differences: vec![
                DiffRecord {
                    path: "data[retailer=R1|store_id=1].count".to_string(),
                    left_value: "10".to_string(),
                    right_value: "11".to_string(),
                },
                DiffRecord {
                    path: "data[retailer=R1|store_id=1].pct".to_string(),
                    left_value: "0.5".to_string(),
                    right_value: "0.6".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_match_predicate() {
        assert!(ComparisonResult::default().is_match());
        assert!(!sample().is_match());
        assert_eq!(sample().difference_count(), 3);
    }

    #[test]
    fn test_missing_record_location() {
        let record = &sample().missing_on_left[0];
        assert_eq!(record.location(), "data[retailer=R2|store_id=2]");
    }

    #[test]
    fn test_flatten_order() {
        let flat = sample().flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].path, "data[retailer=R2|store_id=2]");
        assert_eq!(flat[0].left_display, "(missing)");
        assert_eq!(flat[1].path, "data[retailer=R1|store_id=1].count");
        assert_eq!(flat[1].right_display, "11");
    }

    #[test]
    fn test_flatten_capped() {
        let flat = sample().flatten_capped(2);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[2].path, "... and 1 more differences");

        // no marker when nothing was dropped
        assert_eq!(sample().flatten_capped(10).len(), 3);
    }
}
