//! Per-phase stop and transition metrics.
//!
//! Aggregates the segmentation output by `(session, tracker, phase)`:
//! how many stops there were and how long they lasted, and how many
//! transitions there were, how far the tracker walked and how fast.

use std::collections::{BTreeMap, BTreeSet};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::SegmentationResult;
use crate::geo_utils::{mean, median, sample_std_dev};
use crate::time_utils::delta_seconds;

const MM_PER_METER: f64 = 1000.0;

/// Stop statistics for one phase. Durations are in minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopMetrics {
    pub count: usize,
    pub total_minutes: f64,
    pub max_minutes: f64,
    pub mean_minutes: f64,
    pub median_minutes: f64,
    /// Sample standard deviation; 0 with fewer than two stops
    pub std_minutes: f64,
}

/// Transition statistics for one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionMetrics {
    /// Distinct transition blocks with samples in this phase
    pub count: usize,
    /// Sum of sample-to-sample distances, in meters
    pub distance_walked_m: f64,
    /// Time spent on those steps, in seconds; a block's first step is timed
    /// from the preceding sample of the partition
    pub moving_seconds: f64,
    /// `distance_walked_m / moving_seconds`; 0 when no time elapsed
    pub mean_speed_m_per_s: f64,
}

/// Metrics for one `(session, tracker, phase)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    pub session: String,
    pub tracker: String,
    pub phase: i32,
    pub stops: StopMetrics,
    pub transitions: TransitionMetrics,
}

#[derive(Default)]
struct PhaseAccumulator {
    stop_minutes: Vec<f64>,
    transition_blocks: BTreeSet<u32>,
    distance_mm: f64,
    moving_seconds: f64,
}

/// Aggregate stop and transition metrics per `(session, tracker, phase)`.
///
/// A stop is attributed to its block phase (the lowest phase among its
/// samples); transition samples are attributed to their own phase. Rows are
/// ordered by session, tracker, then phase.
pub fn compute_phase_metrics(result: &SegmentationResult) -> Vec<PhaseMetrics> {
    let mut groups: BTreeMap<(String, String, i32), PhaseAccumulator> = BTreeMap::new();

    for partition in &result.partitions {
        let session = &partition.key.session;
        let tracker = &partition.key.tracker;

        for stop in partition.stops() {
            groups
                .entry((session.clone(), tracker.clone(), stop.phase))
                .or_default()
                .stop_minutes
                .push(delta_seconds(stop.duration) / 60.0);
        }

        // Each step is paired with the time it took, including the step
        // into the block from the preceding stop sample.
        for block in partition.blocks.iter().filter(|b| !b.is_stop()) {
            for m in &block.members {
                let sample = &partition.samples[m.index];
                let gap = match m.index.checked_sub(1) {
                    Some(previous) => sample.timestamp - partition.samples[previous].timestamp,
                    None => TimeDelta::zero(),
                };
                let acc = groups
                    .entry((session.clone(), tracker.clone(), sample.phase))
                    .or_default();
                acc.transition_blocks.insert(block.id);
                acc.distance_mm += m.distance_to_previous;
                acc.moving_seconds += delta_seconds(gap);
            }
        }
    }

    groups
        .into_iter()
        .map(|((session, tracker, phase), acc)| PhaseMetrics {
            session,
            tracker,
            phase,
            stops: stop_metrics(&acc.stop_minutes),
            transitions: transition_metrics(&acc),
        })
        .collect()
}

fn stop_metrics(minutes: &[f64]) -> StopMetrics {
    if minutes.is_empty() {
        return StopMetrics::default();
    }
    StopMetrics {
        count: minutes.len(),
        total_minutes: minutes.iter().sum(),
        max_minutes: minutes.iter().copied().fold(f64::MIN, f64::max),
        mean_minutes: mean(minutes),
        median_minutes: median(minutes),
        std_minutes: sample_std_dev(minutes),
    }
}

fn transition_metrics(acc: &PhaseAccumulator) -> TransitionMetrics {
    let distance_walked_m = acc.distance_mm / MM_PER_METER;
    let mean_speed_m_per_s = if acc.moving_seconds > 0.0 {
        distance_walked_m / acc.moving_seconds
    } else {
        0.0
    };
    TransitionMetrics {
        count: acc.transition_blocks.len(),
        distance_walked_m,
        moving_seconds: acc.moving_seconds,
        mean_speed_m_per_s,
    }
}
