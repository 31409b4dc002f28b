//! Error types for document comparison

use thiserror::Error;

/// Result type for comparison operations
pub type CompareResult<T> = Result<T, CompareError>;

/// Errors that can occur while preparing documents for comparison
///
/// An empty or mismatching document is never an error: the comparator reports
/// those as differences. Errors are reserved for input that cannot be turned
/// into a value tree at all.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Input text is not valid JSON (and no fallback interpretation applied)
    #[error("failed to parse document near '{fragment}': {source}")]
    Parse {
        /// Byte offset of the failure in the input text
        offset: usize,
        /// Short excerpt of the input around the failure
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    /// A decoded value could not be represented as a JSON-native tree
    /// (e.g. a non-finite float or a map with non-string keys)
    #[error("unsupported value shape: {source}")]
    UnsupportedShape {
        #[source]
        source: serde_json::Error,
    },
}
