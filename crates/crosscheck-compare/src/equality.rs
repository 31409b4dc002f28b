//! Tolerant scalar equality
//!
//! Scalars are compared through their display text (see
//! `crosscheck_core::scalar_display`; absent values render as `null`). The
//! rules are ordered and the first match wins:
//!
//! 1. exact string equality
//! 2. documented null/zero equivalences (plus the narrow null ≡ `1` default)
//! 3. numeric comparison, exact for integers and relative otherwise
//! 4. hyphenated-identifier normalization
//! 5. otherwise not equal

use regex::Regex;
use std::sync::OnceLock;

/// Magnitude below which relative difference is numerically unstable
const NEAR_ZERO: f64 = 1e-10;

/// Absolute threshold used instead of relative difference near zero
const NEAR_ZERO_EPSILON: f64 = 1e-6;

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$").unwrap())
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?\d+$").unwrap())
}

fn hyphenated_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // <name>-<2-letter-code>[-]<rest>, e.g. Walgreens-US-prod6020383
    PATTERN.get_or_init(|| Regex::new(r"^(.+?)-([A-Z]{2})-?(.+)$").unwrap())
}

/// Decide whether two stringified scalars are equal under `tolerance`
///
/// `tolerance` is the allowed relative difference between two fractional
/// numbers; it never applies to a pair of integer literals.
pub fn tolerant_eq(left: &str, right: &str, tolerance: f64) -> bool {
    if left == right {
        return true;
    }

    let a = left.trim();
    let b = right.trim();
    if a == b {
        return true;
    }

    if null_zero_equivalent(a, b) || null_zero_equivalent(b, a) {
        return true;
    }

    if numeric_pattern().is_match(a) && numeric_pattern().is_match(b) {
        return numbers_equal(a, b, tolerance);
    }

    hyphenated_ids_equal(a, b)
}

/// One direction of the documented value equivalences
fn null_zero_equivalent(a: &str, b: &str) -> bool {
    let a_null = is_null_text(a);
    if (a_null || a == "0") && b == "0.0" {
        return true;
    }
    if a == "0" && is_null_text(b) {
        return true;
    }
    if a == ".0" && b == "0.0" {
        return true;
    }
    // null ≡ "1": a backend-specific default for one field family
    // (availability-style percentages). Deliberately not generalized.
    if a_null && b == "1" {
        return true;
    }
    false
}

fn is_null_text(s: &str) -> bool {
    s.eq_ignore_ascii_case("null")
}

fn numbers_equal(a: &str, b: &str, tolerance: f64) -> bool {
    let integral = integer_pattern().is_match(a) && integer_pattern().is_match(b);
    if integral {
        // no tolerance on integers; i128 first so huge ids stay exact
        if let (Ok(x), Ok(y)) = (a.parse::<i128>(), b.parse::<i128>()) {
            return x == y;
        }
    }

    let (Ok(x), Ok(y)) = (a.parse::<f64>(), b.parse::<f64>()) else {
        return false;
    };
    if integral {
        return x == y;
    }

    let diff = (x - y).abs();
    if x.abs() < NEAR_ZERO && y.abs() < NEAR_ZERO {
        return diff <= NEAR_ZERO_EPSILON;
    }
    diff / x.abs().max(y.abs()) <= tolerance
}

/// Identifiers equal up to one optional dash after a two-letter code
fn hyphenated_ids_equal(a: &str, b: &str) -> bool {
    match (normalize_hyphenated_id(a), normalize_hyphenated_id(b)) {
        (Some(na), Some(nb)) => na == nb,
        _ => false,
    }
}

/// Canonical `<name>-<CC>-<rest>` form of a hyphenated identifier, or `None`
/// when the string does not have that shape
///
/// Absorbs one known upstream naming inconsistency (a missing dash after the
/// two-letter code); also used when building record-matching keys so the same
/// record is not reported missing on both sides over that dash.
pub(crate) fn normalize_hyphenated_id(s: &str) -> Option<String> {
    let captures = hyphenated_id_pattern().captures(s)?;
    Some(format!("{}-{}-{}", &captures[1], &captures[2], &captures[3]))
}
