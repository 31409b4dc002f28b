//! Schema-free structural comparison of JSON documents
//!
//! This crate decides whether two JSON-like documents from comparable backends
//! are semantically equivalent without a fixed schema. Records inside
//! arrays-of-objects are matched by a composite key discovered at runtime, and
//! scalars are compared under a caller-supplied numeric tolerance.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │  left JSON   │     │  right JSON  │
//! └──────┬───────┘     └──────┬───────┘
//!        │  normalize         │
//!        └─────────┬──────────┘
//!                  │
//!        ┌─────────▼──────────┐
//!        │ key discovery      │  which fields identify a record?
//!        ├────────────────────┤
//!        │ structural compare │  match records, recurse, tolerant scalars
//!        ├────────────────────┤
//!        │ ComparisonResult   │  missing records + field differences
//!        └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use crosscheck_compare::{compare_documents, CompareOptions};
//!
//! let left = r#"{"data":[{"retailer":"R1","count":10}]}"#;
//! let right = r#"{"data":[{"count":10,"retailer":"R1"}]}"#;
//! let result = compare_documents(left, right, &CompareOptions::with_tolerance(0.01))?;
//! assert!(result.is_match());
//! # Ok::<(), crosscheck_compare::CompareError>(())
//! ```
//!
//! The comparison is a pure, synchronous computation over in-memory trees:
//! no I/O, no shared state, safe to run from many threads at once. Fetching
//! the documents, retrying empty responses, and persisting or rendering the
//! diff list are the caller's concern.

mod compare;
mod diff;
mod equality;
mod keys;

pub use compare::{compare, compare_documents, compare_with_tolerance};
pub use diff::{ComparisonResult, DiffRecord, FlatDiff, MissingRecord};
pub use equality::tolerant_eq;
pub use keys::{discover, CompositeKey, KEY_DELIMITER};

// The building blocks callers usually need alongside a comparison.
pub use crosscheck_core::{
    both_empty, count_rows, parse_document, to_document, CompareError, CompareOptions,
    CompareResult,
};
