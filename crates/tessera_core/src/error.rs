//! # Store Error Types
//!
//! All errors that can occur while registering a schema or accessing a store.

use thiserror::Error;

/// Errors that can occur in the columnar store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record type cannot be laid out as columns.
    ///
    /// Raised while the schema layout is built, so it blocks store construction.
    #[error("schema violation in {schema}: {reason}")]
    SchemaViolation {
        /// Type name of the offending record.
        schema: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The byte offset is not the start of any field of the record.
    #[error("unknown member at byte offset {offset}")]
    UnknownMember {
        /// The offset that failed to resolve.
        offset: usize,
    },

    /// The dotted field path does not name a field of the record.
    #[error("unknown member path `{path}`")]
    UnknownPath {
        /// The path that failed to resolve.
        path: String,
    },

    /// The flat position is past the last column.
    #[error("unknown column {index}")]
    UnknownColumn {
        /// The requested flat position.
        index: usize,
    },

    /// The requested leaf type does not match the column's element type.
    #[error("type mismatch on column {column}: requested {expected}, column holds {found}")]
    TypeMismatch {
        /// Flat position of the column.
        column: usize,
        /// Type the caller asked for.
        expected: &'static str,
        /// Type the column actually stores.
        found: &'static str,
    },

    /// Row index is not below the current row count.
    #[error("row {index} out of range for store of {len} rows")]
    IndexOutOfRange {
        /// The requested row.
        index: usize,
        /// The row count at the time of the call.
        len: usize,
    },

    /// Two requested columns resolve to the same flat position.
    #[error("column {column} requested more than once")]
    AliasedColumns {
        /// The duplicated flat position.
        column: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
