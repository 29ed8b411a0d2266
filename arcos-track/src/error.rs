//! Error types for arcos-track.

use thiserror::Error;

/// Result type alias for arcos-track operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while adapting tabular or raster input into Linker calls.
#[derive(Error, Debug)]
pub enum Error {
    /// Two columns (or a configured column and an input column) share a name.
    #[error("duplicate column name: {0:?}")]
    DuplicateColumn(String),

    /// A configured or requested column is absent from the table.
    #[error("missing column: {0:?}")]
    MissingColumn(String),

    /// A column given to [`crate::Table::with_column`] has a different row
    /// count than the table's existing columns.
    #[error("column {name:?} has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        name: String,
        /// Row count of the table so far.
        expected: usize,
        /// Row count of the column being added.
        actual: usize,
    },

    /// A column was accessed as the wrong variant (e.g. a coordinate column
    /// that holds strings).
    #[error("column {name:?} has the wrong type, expected {expected}")]
    ColumnTypeMismatch {
        /// Name of the offending column.
        name: String,
        /// The type the caller required.
        expected: &'static str,
    },

    /// `track` was called on a table with zero rows.
    #[error("input table has no rows")]
    EmptyInput,

    /// The frame column held a negative value.
    #[error("frame column contained a negative value: {0}")]
    NegativeFrame(i64),

    /// `dims` failed validation against the tracker's axis requirements.
    #[error("`dims` string {dims:?} is invalid: {reason}")]
    InvalidDims {
        /// The offending `dims` string.
        dims: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A raster's `shape` did not have as many axes as `dims` names.
    #[error("raster tensor shape {shape:?} does not match dims {dims:?}")]
    ShapeDimsMismatch {
        /// The tensor shape that was given.
        shape: Vec<usize>,
        /// The `dims` string it was checked against.
        dims: String,
    },

    /// Two tables given to [`crate::Table::vstack`] have incompatible schemas.
    #[error("cannot stack tables with mismatched schemas: {0}")]
    SchemaMismatch(String),

    /// Propagated from the Linker/Clusterer construction layer.
    #[error(transparent)]
    Core(#[from] arcos_core::Error),
}
