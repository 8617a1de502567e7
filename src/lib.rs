//! # Staypoint
//!
//! Stop and transition segmentation for indoor positioning traces.
//!
//! This library turns a time-ordered stream of per-tracker position samples
//! into labeled intervals:
//! - **stops**: the tracker stayed within a small neighborhood for a sustained time
//! - **transitions**: movement between stops
//!
//! The pipeline runs per `(tracker, session)` partition:
//! 1. Cluster consecutive samples against a moving base point (distance threshold)
//! 2. Label each cluster stop or transition (duration threshold)
//! 3. Merge consecutive same-label clusters into blocks
//! 4. Summarize blocks: one row per stop, one row per transition sample
//!
//! ## Features
//!
//! - **`parallel`** - Process partitions in parallel with rayon (default)
//! - **`synthetic`** - Synthetic session generator for benchmarks and demos
//! - **`cli`** - The `staypoint-cli` debug tool
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeDelta};
//! use staypoint::{PositionSample, SegmentationConfig, segment_samples};
//!
//! let start = NaiveDate::from_ymd_opt(2020, 8, 11)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//!
//! // Five samples at the same spot, one second apart
//! let samples: Vec<PositionSample> = (0..5)
//!     .map(|i| PositionSample::new("t1", "s1", start + TimeDelta::seconds(i), 500.0, 500.0))
//!     .collect();
//!
//! let config = SegmentationConfig::new(1000.0, "0:00:03").unwrap();
//! let result = segment_samples(samples, &config).unwrap();
//!
//! let rows = result.rows();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].max_duration_sec, 4.0);
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, SegmentError};

// Threshold configuration
pub mod config;
pub use config::SegmentationConfig;

// Planar geometry and statistics
pub mod geo_utils;

// Timestamp and time-span parsing
pub mod time_utils;

// Grouping samples into independent (tracker, session) partitions
pub mod partition;
pub use partition::{partition_samples, validate_partition};

// The four-stage segmentation engine
pub mod segmentation;
pub use segmentation::{
    Assignment, AtomicProgressTracker, BasePoint, Block, BlockMember, BlockSummary, Cluster,
    ClusterMember, ClusterState, LabeledCluster, NoopProgress, PartitionSegmentation,
    SegmentRow, SegmentationPhase, SegmentationProgress, SegmentationResult, SegmentationStats,
    StopRecord, TransitionRecord, build_clusters, classify_cluster, classify_clusters,
    max_delta_from_base, merge_blocks, segment_partition, segment_samples,
    segment_samples_with_progress, summarize_block,
};

// Per-phase stop and transition metrics
pub mod metrics;
pub use metrics::{PhaseMetrics, StopMetrics, TransitionMetrics, compute_phase_metrics};

// Synthetic positioning sessions
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// Sentinel for a phase or quantile that was never assigned upstream.
pub const UNASSIGNED: i32 = -100;

fn unassigned() -> i32 {
    UNASSIGNED
}

/// A single positioning sample of one tracker.
///
/// Coordinates are planar, in millimeters. `phase` and `quantile` are
/// assigned by preprocessing and passed through untouched; [`UNASSIGNED`]
/// is a valid value.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use staypoint::{PositionSample, UNASSIGNED};
///
/// let ts = NaiveDate::from_ymd_opt(2020, 8, 11).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let sample = PositionSample::new("tracker-1", "session-1", ts, 1200.0, 3400.0);
/// assert_eq!(sample.phase, UNASSIGNED);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub tracker: String,
    pub session: String,
    #[serde(with = "time_utils::timestamp_format")]
    pub timestamp: NaiveDateTime,
    /// X coordinate in millimeters
    pub x: f64,
    /// Y coordinate in millimeters
    pub y: f64,
    #[serde(default = "unassigned")]
    pub phase: i32,
    #[serde(default = "unassigned")]
    pub quantile: i32,
}

impl PositionSample {
    /// Create a sample with unassigned phase and quantile.
    pub fn new(
        tracker: impl Into<String>,
        session: impl Into<String>,
        timestamp: NaiveDateTime,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            tracker: tracker.into(),
            session: session.into(),
            timestamp,
            x,
            y,
            phase: UNASSIGNED,
            quantile: UNASSIGNED,
        }
    }

    /// Set phase and quantile.
    pub fn with_phase(mut self, phase: i32, quantile: i32) -> Self {
        self.phase = phase;
        self.quantile = quantile;
        self
    }

    /// The partition this sample belongs to.
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey::new(self.tracker.clone(), self.session.clone())
    }

    /// Check that both coordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Identity of an independent processing unit: one tracker in one session.
///
/// Cluster and block ids are only meaningful within a partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub tracker: String,
    pub session: String,
}

impl PartitionKey {
    pub fn new(tracker: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            tracker: tracker.into(),
            session: session.into(),
        }
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tracker {} / session {}", self.tracker, self.session)
    }
}

/// Label of a cluster or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// The tracker stayed within the distance threshold for at least the duration threshold
    Stop,
    /// Anything that is not a stop: movement between stops
    Transition,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Stop => "stop",
            SegmentKind::Transition => "transition",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SegmentKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stop" => Ok(SegmentKind::Stop),
            "transition" => Ok(SegmentKind::Transition),
            other => Err(format!("unknown segment kind '{other}'")),
        }
    }
}
