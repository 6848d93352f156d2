//! Error types for the aip-query crate.

use thiserror::Error;

/// Errors raised while compiling filters and orders, rendering SQL, or
/// encoding and decoding page tokens.
///
/// Compiled predicates and comparators never return errors; everything here
/// surfaces before a closure is handed out, or from the cursor codec.
#[derive(Debug, Error)]
pub enum Error {
    /// The filter string does not follow the AIP-160 grammar.
    #[error("invalid filter at offset {position}: {message}")]
    InvalidFilter { position: usize, message: String },

    /// The order-by string is malformed.
    #[error("invalid order_by: {message}")]
    InvalidOrderBy { message: String },

    /// A filter or order key does not resolve against the record schema.
    #[error("invalid field path {path:?}: {reason}")]
    InvalidFieldPath { path: String, reason: String },

    /// An operator was applied to a pair of values with no defined ordering.
    #[error("unsupported comparison: {lhs} {op} {rhs}")]
    UnsupportedComparison {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// A value could not be assigned to a field of a different type.
    #[error("type mismatch: field expects {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The page token failed to decode, authenticate or deserialize.
    #[error("invalid page token")]
    InvalidPageToken,

    /// An order key maps to no sortable column.
    #[error("no sortable field named {field:?}, valid fields are {valid}")]
    UnsortableField { field: String, valid: String },

    /// Two order keys map to the same column.
    #[error("field appears in order_by multiple times: {field:?}")]
    DuplicateOrderField { field: String },

    /// The authenticated-encryption backend refused to seal a token.
    #[error("encrypting page token failed")]
    Encryption,

    /// The projected cursor record could not be serialized.
    #[error("serializing cursor record: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    /// A column table or key could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn field_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidFieldPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for aip-query operations.
pub type Result<T> = std::result::Result<T, Error>;
