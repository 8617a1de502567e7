//! Unified error handling for the segmentation engine.
//!
//! Configuration errors are raised before any partition is processed.
//! Precondition errors always carry the `(tracker, session)` of the
//! partition that failed so the caller can locate the offending input.

use chrono::NaiveDateTime;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Errors produced while configuring or running the segmentation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("distance threshold must be a positive number of millimeters, got {value}")]
    InvalidDistanceThreshold { value: f64 },

    #[error("invalid duration threshold '{input}': {reason}")]
    InvalidDurationThreshold { input: String, reason: String },

    #[error(
        "samples out of order in partition (tracker {tracker}, session {session}): \
         sample {index} at {current} precedes {previous}"
    )]
    OutOfOrder {
        tracker: String,
        session: String,
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error(
        "non-finite coordinate in partition (tracker {tracker}, session {session}) \
         at sample {index}"
    )]
    NonFiniteCoordinate {
        tracker: String,
        session: String,
        index: usize,
    },

    #[error(
        "sample {index} of partition (tracker {tracker}, session {session}) belongs to \
         tracker {found_tracker}, session {found_session}"
    )]
    ForeignSample {
        tracker: String,
        session: String,
        index: usize,
        found_tracker: String,
        found_session: String,
    },

    #[error("segmentation cancelled after {completed} of {total} partitions")]
    Cancelled { completed: usize, total: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SegmentError {
    /// Whether this error stems from configuration rather than input data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SegmentError::InvalidDistanceThreshold { .. }
                | SegmentError::InvalidDurationThreshold { .. }
                | SegmentError::Config(_)
        )
    }

    /// The `(tracker, session)` of the failing partition, if the error is tied to one.
    pub fn partition(&self) -> Option<(&str, &str)> {
        match self {
            SegmentError::OutOfOrder {
                tracker, session, ..
            }
            | SegmentError::NonFiniteCoordinate {
                tracker, session, ..
            }
            | SegmentError::ForeignSample {
                tracker, session, ..
            } => Some((tracker.as_str(), session.as_str())),
            _ => None,
        }
    }
}
