//! Error types for arcos-core.

use thiserror::Error;

/// Result type alias for arcos-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for event detection and linking.
#[derive(Error, Debug)]
pub enum Error {
    /// `clusteringMethod` named something other than a known backend.
    #[error("unknown clustering method: {0:?} (expected \"dbscan\", \"hdbscan\", or a custom callable)")]
    UnknownClusteringMethod(String),

    /// `eps` was not a positive, finite number.
    #[error("eps must be a positive finite number, got {0}")]
    InvalidEps(f64),

    /// `epsPrev` was not a non-negative, finite number.
    #[error("epsPrev must be a non-negative finite number, got {0}")]
    InvalidEpsPrev(f64),

    /// `minClSz`, `minSamples`, `propagationThreshold`, `nPrev`, or `nJobs` was zero.
    #[error("{field} must be a positive integer, got {value}")]
    InvalidParameter {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A coordinate row did not have exactly `D` components.
    #[error("coordinate row {row} has {actual} components, expected {expected}")]
    DimensionMismatch {
        /// Row index within the offending frame.
        row: usize,
        /// Number of components found.
        actual: usize,
        /// Number of components required (the Linker's const generic `D`).
        expected: usize,
    },

    /// Memory's coordinate and event-id vectors had different lengths.
    #[error("coordinates and event ids of a frame have mismatched lengths: {coords} vs {event_ids}")]
    MisalignedFrame {
        /// Length of the coordinate array.
        coords: usize,
        /// Length of the event-id array.
        event_ids: usize,
    },

    /// A user-supplied clustering callable returned a label vector of the wrong length.
    #[error("custom clusterer returned {actual} labels for {expected} input points")]
    CustomClustererShapeMismatch {
        /// Labels actually returned.
        actual: usize,
        /// Points that were passed in.
        expected: usize,
    },
}
