//! Synthetic positioning sessions for benchmarking and demos.
//!
//! Generates a tracker that dwells at known locations and walks in straight
//! lines between them, so the expected number of stops is known up front.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use staypoint::synthetic::SyntheticSession;
//! use staypoint::{SegmentationConfig, segment_samples};
//!
//! let session = SyntheticSession::with_stop_count(4);
//! let dataset = session.generate();
//!
//! let result = segment_samples(dataset.samples, &SegmentationConfig::default()).unwrap();
//! assert_eq!(result.stats.stop_blocks, dataset.expected_stops);
//! ```

use std::f64::consts::PI;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::PositionSample;
use crate::geo_utils::euclidean_distance;
use crate::time_utils::delta_seconds;

// ============================================================================
// Types
// ============================================================================

/// A location where the synthetic tracker dwells.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticStop {
    /// X coordinate in millimeters
    pub x: f64,
    /// Y coordinate in millimeters
    pub y: f64,
    /// Time spent at the location
    pub dwell: TimeDelta,
}

/// Scenario configuration for one tracker in one session.
#[derive(Debug, Clone)]
pub struct SyntheticSession {
    pub tracker: String,
    pub session: String,
    /// Timestamp of the first sample
    pub start: NaiveDateTime,
    /// Stops visited in order
    pub stops: Vec<SyntheticStop>,
    /// Walking speed between stops
    pub walking_speed_mm_per_s: f64,
    /// Time between consecutive samples
    pub sample_interval: TimeDelta,
    /// Positioning noise standard deviation in millimeters
    pub noise_sigma_mm: f64,
    /// Phase assigned to every sample
    pub phase: i32,
    /// RNG seed for deterministic reproduction
    pub seed: u64,
}

/// A generated sample stream with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub samples: Vec<PositionSample>,
    /// Number of stops the scenario visits
    pub expected_stops: usize,
}

// ============================================================================
// Noise
// ============================================================================

/// Gaussian positioning noise (Box-Muller transform).
fn gaussian_offset(sigma_mm: f64, rng: &mut StdRng) -> (f64, f64) {
    if sigma_mm <= 0.0 {
        return (0.0, 0.0);
    }
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let r = (-2.0 * u1.ln()).sqrt() * sigma_mm;
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}

// ============================================================================
// Scenario Implementation
// ============================================================================

impl SyntheticSession {
    /// Generate the time-ordered samples of this session.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let interval_secs = delta_seconds(self.sample_interval).max(0.001);
        let step_mm = (self.walking_speed_mm_per_s * interval_secs).max(1.0);

        let mut samples: Vec<PositionSample> = Vec::new();
        let mut timestamp = self.start;
        let mut push = |x: f64, y: f64, rng: &mut StdRng| {
            let (dx, dy) = gaussian_offset(self.noise_sigma_mm, rng);
            samples.push(
                PositionSample::new(
                    self.tracker.clone(),
                    self.session.clone(),
                    timestamp,
                    x + dx,
                    y + dy,
                )
                .with_phase(self.phase, 1),
            );
            timestamp += self.sample_interval;
        };

        let mut previous: Option<(f64, f64)> = None;
        for stop in &self.stops {
            // Walk from the previous stop, excluding both endpoints
            if let Some((px, py)) = previous {
                let distance = euclidean_distance(px, py, stop.x, stop.y);
                let steps = (distance / step_mm).ceil().max(1.0) as usize;
                for k in 1..steps {
                    let f = k as f64 / steps as f64;
                    push(px + (stop.x - px) * f, py + (stop.y - py) * f, &mut rng);
                }
            }

            let dwell_samples = (delta_seconds(stop.dwell) / interval_secs).round() as usize + 1;
            for _ in 0..dwell_samples {
                push(stop.x, stop.y, &mut rng);
            }
            previous = Some((stop.x, stop.y));
        }

        SyntheticDataset {
            samples,
            expected_stops: self.stops.len(),
        }
    }

    /// Replace the tracker and session identifiers.
    pub fn with_ids(mut self, tracker: impl Into<String>, session: impl Into<String>) -> Self {
        self.tracker = tracker.into();
        self.session = session.into();
        self
    }

    /// Replace the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

// ============================================================================
// Presets
// ============================================================================

fn session_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 8, 11)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

impl SyntheticSession {
    /// A teacher moving between the front of a classroom and student desks.
    pub fn classroom() -> Self {
        let stop = |x: f64, y: f64, secs: i64| SyntheticStop {
            x,
            y,
            dwell: TimeDelta::seconds(secs),
        };
        Self {
            tracker: "teacher".to_string(),
            session: "lesson-1".to_string(),
            start: session_start(),
            stops: vec![
                stop(5000.0, 500.0, 300),
                stop(2000.0, 4000.0, 90),
                stop(8000.0, 4000.0, 120),
                stop(8000.0, 7500.0, 45),
                stop(5000.0, 500.0, 240),
            ],
            walking_speed_mm_per_s: 1500.0,
            sample_interval: TimeDelta::seconds(1),
            noise_sigma_mm: 40.0,
            phase: 1,
            seed: 42,
        }
    }

    /// `count` one-minute stops spaced 3 m apart along a line.
    ///
    /// Walking samples land 1.5 m apart, well clear of the default 1 m
    /// distance threshold, so every stop is recovered as one stop block.
    pub fn with_stop_count(count: usize) -> Self {
        let stops = (0..count)
            .map(|i| SyntheticStop {
                x: 1000.0 + 3000.0 * i as f64,
                y: 2000.0,
                dwell: TimeDelta::seconds(60),
            })
            .collect();
        Self {
            tracker: "tracker-1".to_string(),
            session: "session-1".to_string(),
            start: session_start(),
            stops,
            walking_speed_mm_per_s: 1500.0,
            sample_interval: TimeDelta::seconds(1),
            noise_sigma_mm: 30.0,
            phase: 1,
            seed: 7,
        }
    }
}

/// Generate `trackers x sessions` independent partitions, interleaved by time.
pub fn generate_sessions(
    trackers: usize,
    sessions: usize,
    stops_per_session: usize,
) -> Vec<PositionSample> {
    let mut samples: Vec<PositionSample> = Vec::new();
    for t in 0..trackers {
        for s in 0..sessions {
            let dataset = SyntheticSession::with_stop_count(stops_per_session)
                .with_ids(format!("tracker-{t}"), format!("session-{s}"))
                .with_seed((t * 1000 + s) as u64)
                .generate();
            samples.extend(dataset.samples);
        }
    }
    // Stable sort keeps each partition's own order
    samples.sort_by_key(|s| s.timestamp);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SegmentationConfig, segment_samples};

    #[test]
    fn test_deterministic_generation() {
        let a = SyntheticSession::classroom().generate();
        let b = SyntheticSession::classroom().generate();
        assert_eq!(a.samples, b.samples);

        let c = SyntheticSession::classroom().with_seed(43).generate();
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    fn test_samples_are_time_ordered() {
        let dataset = SyntheticSession::classroom().generate();
        assert!(
            dataset
                .samples
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp)
        );
        assert_eq!(dataset.expected_stops, 5);
    }

    #[test]
    fn test_dwell_sample_count() {
        let mut session = SyntheticSession::with_stop_count(1);
        session.noise_sigma_mm = 0.0;
        let dataset = session.generate();
        // 60 s at 1 Hz, both ends inclusive
        assert_eq!(dataset.samples.len(), 61);
        assert!(dataset.samples.iter().all(|s| s.x == 1000.0 && s.y == 2000.0));
    }

    #[test]
    fn test_stop_count_recovered() {
        for count in [1, 3, 8] {
            let dataset = SyntheticSession::with_stop_count(count).generate();
            let result = segment_samples(dataset.samples, &SegmentationConfig::default()).unwrap();
            assert_eq!(result.stats.stop_blocks, count);
        }
    }

    #[test]
    fn test_generate_sessions_partitions() {
        let samples = generate_sessions(3, 2, 2);
        let result = segment_samples(samples, &SegmentationConfig::default()).unwrap();
        assert_eq!(result.stats.partitions, 6);
        assert_eq!(result.stats.stop_blocks, 12);
    }
}
