//! Error taxonomy
//!
//! Every failure is terminal for the operation that raised it: there is no
//! partial index and no "match nothing" fallback for a bad query.

use std::time::Duration;

/// Errors surfaced by parsing, query compilation and the parser pool
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The path-query string cannot be translated into a matcher.
    #[error("invalid path query {query:?}: {reason}")]
    QueryCompilation { query: String, reason: String },

    /// The XML text is not well-formed or could not be decoded.
    #[error("malformed XML at byte {offset}: {message}")]
    DocumentParse { offset: usize, message: String },

    /// No parser could be leased from the pool under its wait policy.
    #[error("no parser available after waiting {waited:?}")]
    ResourceExhausted { waited: Duration },

    /// A scalar could not be interpreted as a typed field value.
    #[error("cannot interpret {raw:?} as a field value: {reason}")]
    Value { raw: String, reason: String },
}

impl Error {
    pub(crate) fn query(query: &str, reason: impl Into<String>) -> Self {
        Error::QueryCompilation {
            query: query.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Error::DocumentParse {
            offset,
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input (bad XML or bad query),
    /// which collaborators report as "unprocessable input".
    pub fn is_unprocessable_input(&self) -> bool {
        matches!(
            self,
            Error::QueryCompilation { .. } | Error::DocumentParse { .. } | Error::Value { .. }
        )
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
