//! Core types for crosscheck
//!
//! This crate provides the pieces the structural comparator is built on:
//! document normalization into a canonical `serde_json::Value` tree, the
//! comparison error taxonomy, the options bundle, and the row-count estimator
//! used to sanity-display raw responses.

mod error;
mod normalize;
mod options;
mod rows;

pub use error::{CompareError, CompareResult};
pub use normalize::{display_value, is_scalar, parse_document, scalar_display, to_document};
pub use options::CompareOptions;
pub use rows::{both_empty, count_rows, delimited_to_records};
