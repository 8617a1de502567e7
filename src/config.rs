//! Segmentation thresholds.
//!
//! Both thresholds are explicit inputs handed to every stage by reference:
//! `distance_threshold` controls how eagerly a trajectory is split into
//! distance-bounded clusters, and `duration_threshold` decides whether a
//! cluster is a stop or part of a transition.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};
use crate::time_utils::{format_duration, parse_duration};

/// Default distance threshold: one meter.
pub const DEFAULT_DISTANCE_THRESHOLD_MM: f64 = 1000.0;

/// Default duration threshold in seconds.
pub const DEFAULT_DURATION_THRESHOLD_SECS: i64 = 10;

/// Configuration for stop/transition segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationConfig {
    /// Maximum distance (mm) from a cluster's base point for a sample to
    /// stay in that cluster. A sample at exactly this distance stays.
    /// Default: 1000.0
    pub distance_threshold: f64,

    /// Minimum time span a cluster must cover, measured from its base point,
    /// to be labeled a stop. A cluster covering exactly this span is a stop.
    /// Default: 10 seconds
    pub duration_threshold: TimeDelta,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD_MM,
            duration_threshold: TimeDelta::seconds(DEFAULT_DURATION_THRESHOLD_SECS),
        }
    }
}

/// On-disk shape of the configuration: the duration is a human-written span.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default = "default_distance")]
    distance_threshold: f64,
    #[serde(default = "default_duration")]
    duration_threshold: String,
}

fn default_distance() -> f64 {
    DEFAULT_DISTANCE_THRESHOLD_MM
}

fn default_duration() -> String {
    format_duration(TimeDelta::seconds(DEFAULT_DURATION_THRESHOLD_SECS))
}

impl SegmentationConfig {
    /// Build a validated configuration from a distance in millimeters and a
    /// time span such as `"0:00:10"` or `"10s"`.
    ///
    /// # Example
    /// ```
    /// use staypoint::SegmentationConfig;
    ///
    /// let config = SegmentationConfig::new(1000.0, "0:00:10").unwrap();
    /// assert_eq!(config.duration_threshold.num_seconds(), 10);
    /// assert!(SegmentationConfig::new(0.0, "0:00:10").is_err());
    /// ```
    pub fn new(distance_threshold: f64, duration_threshold: &str) -> Result<Self> {
        let config = Self {
            distance_threshold,
            duration_threshold: parse_duration(duration_threshold)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check both thresholds.
    ///
    /// A non-positive distance would open a new cluster at every sample, so
    /// it is rejected rather than silently degenerating.
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(SegmentError::InvalidDistanceThreshold {
                value: self.distance_threshold,
            });
        }
        if self.duration_threshold < TimeDelta::zero() {
            return Err(SegmentError::InvalidDurationThreshold {
                input: format_duration(self.duration_threshold),
                reason: "time span must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Parse a JSON configuration document:
    ///
    /// ```json
    /// { "distance_threshold": 1000, "duration_threshold": "0:00:10" }
    /// ```
    ///
    /// Missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ConfigDocument =
            serde_json::from_str(json).map_err(|e| SegmentError::Config(e.to_string()))?;
        Self::new(doc.distance_threshold, &doc.duration_threshold)
    }

    /// Serialize to the same JSON shape accepted by [`SegmentationConfig::from_json`].
    pub fn to_json(&self) -> Result<String> {
        let doc = ConfigDocument {
            distance_threshold: self.distance_threshold,
            duration_threshold: format_duration(self.duration_threshold),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}
