//! Options controlling comparison behavior
//!
//! Everything tunable about a comparison is carried here explicitly so tests
//! and callers can vary each knob independently; there is no global state.

use serde::{Deserialize, Serialize};

/// Options for comparing two documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Allowed relative difference between two fractional numbers
    /// (e.g. 0.01 accepts a 1% drift). Integers are always compared exactly.
    pub tolerance: f64,

    /// Vocabulary of metric/measure field tokens. A field whose last path
    /// segment contains one of these tokens (split on `_` and `-`,
    /// case-insensitive) is a payload value, never an identity field.
    pub metric_fields: Vec<String>,

    /// Identity fields tried first during key discovery, in priority order.
    /// Dotted paths refer to nested fields (e.g. `date.value`).
    pub preferred_keys: Vec<String>,

    /// Maximum number of fields combined into one composite key.
    /// Bounds the only super-linear step of discovery.
    pub max_key_fields: usize,

    /// Path suffixes excluded from diffing entirely (deployment-specific
    /// measures known to disagree; empty by default).
    pub ignored_suffixes: Vec<String>,

    /// Path prefixes excluded from diffing entirely (empty by default).
    pub ignored_prefixes: Vec<String>,

    /// Field-name suffixes marking a renamed alias of the same field: with
    /// the default `_v2`, a `price` field on one side pairs with `price_v2`
    /// on the other instead of reporting both as one-sided.
    pub alias_suffixes: Vec<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            metric_fields: [
                "count", "pct", "percent", "score", "average", "avg", "total", "sum",
                "share", "amount", "delivery", "shipping",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            preferred_keys: ["id", "product_id", "retailer", "store_id", "date.value"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_key_fields: 3,
            ignored_suffixes: Vec::new(),
            ignored_prefixes: Vec::new(),
            alias_suffixes: vec!["_v2".to_string()],
        }
    }
}

impl CompareOptions {
    /// Create options with the default vocabulary and the given tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Exclude every path ending with `suffix` from diffing
    pub fn ignore_suffix(mut self, suffix: &str) -> Self {
        self.ignored_suffixes.push(suffix.to_string());
        self
    }

    /// Exclude every path starting with `prefix` from diffing
    pub fn ignore_prefix(mut self, prefix: &str) -> Self {
        self.ignored_prefixes.push(prefix.to_string());
        self
    }

    /// Whether a diff at `path` should be suppressed
    pub fn is_ignored_path(&self, path: &str) -> bool {
        self.ignored_suffixes.iter().any(|s| path.ends_with(s.as_str()))
            || self.ignored_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// The base field name when `field` carries an alias suffix
    /// (`price_v2` yields `price`)
    pub fn alias_base<'a>(&self, field: &'a str) -> Option<&'a str> {
        self.alias_suffixes.iter().find_map(|s| {
            field
                .strip_suffix(s.as_str())
                .filter(|base| !base.is_empty())
        })
    }

    /// Whether a field's last path segment names a metric rather than an identity
    ///
    /// Matches on tokens so `availability_pct` and `avg_price` are metrics while
    /// `discount` is not (no token equals `count`).
    pub fn is_metric_field(&self, path: &str) -> bool {
        let segment = path.rsplit('.').next().unwrap_or(path);
        segment
            .split(['_', '-'])
            .filter(|t| !t.is_empty())
            .any(|token| {
                self.metric_fields
                    .iter()
                    .any(|m| m.eq_ignore_ascii_case(token))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_field_token_match() {
        let opts = CompareOptions::default();
        assert!(opts.is_metric_field("count"));
        assert!(opts.is_metric_field("availability_pct"));
        assert!(opts.is_metric_field("avg_price"));
        assert!(opts.is_metric_field("data.items.review_count"));
        assert!(opts.is_metric_field("delivery_time"));
        assert!(opts.is_metric_field("Shipping-Cost"));
    }

    #[test]
    fn test_metric_field_no_substring_match() {
        let opts = CompareOptions::default();
        // "discount" contains "count" but is a single token
        assert!(!opts.is_metric_field("discount"));
        assert!(!opts.is_metric_field("retailer"));
        assert!(!opts.is_metric_field("store_id"));
    }

    #[test]
    fn test_metric_field_uses_last_segment() {
        let opts = CompareOptions::default();
        // A metric-named intermediate object does not disqualify the leaf
        assert!(!opts.is_metric_field("totals.store_id"));
        assert!(opts.is_metric_field("store.total"));
    }

    #[test]
    fn test_alias_base() {
        let opts = CompareOptions::default();
        assert_eq!(opts.alias_base("price_v2"), Some("price"));
        assert_eq!(opts.alias_base("price"), None);
        // a bare suffix is not an alias of the empty field
        assert_eq!(opts.alias_base("_v2"), None);
    }

    #[test]
    fn test_ignored_paths() {
        let opts = CompareOptions::default()
            .ignore_suffix("m_review_count")
            .ignore_prefix("Total.");
        assert!(opts.is_ignored_path("data[id=1].dsa_m_review_count"));
        assert!(opts.is_ignored_path("Total.count"));
        assert!(!opts.is_ignored_path("data[id=1].count"));
    }
}
