//! Grouping samples into independent `(tracker, session)` partitions.
//!
//! The input table is scanned once; each partition keeps its samples in
//! their original relative order. Partitions never share state, so the
//! segmentation engine can process them in any order or in parallel.

use std::collections::BTreeMap;

use log::warn;

use crate::error::{Result, SegmentError};
use crate::{PartitionKey, PositionSample};

/// Group samples by `(tracker, session)` in a single pass.
///
/// Samples keep their relative order inside each partition. Partitions are
/// returned in key order, which is the output order of the pipeline.
pub fn partition_samples(
    samples: Vec<PositionSample>,
) -> BTreeMap<PartitionKey, Vec<PositionSample>> {
    let mut partitions: BTreeMap<PartitionKey, Vec<PositionSample>> = BTreeMap::new();
    for sample in samples {
        partitions
            .entry(sample.partition_key())
            .or_default()
            .push(sample);
    }
    partitions
}

/// Check the per-partition preconditions of the clustering state machine.
///
/// - every sample carries the partition's tracker and session
/// - timestamps must be non-decreasing (equal timestamps are allowed)
/// - coordinates must be finite
///
/// An empty partition is valid.
pub fn validate_partition(key: &PartitionKey, samples: &[PositionSample]) -> Result<()> {
    for (index, sample) in samples.iter().enumerate() {
        if sample.tracker != key.tracker || sample.session != key.session {
            return Err(SegmentError::ForeignSample {
                tracker: key.tracker.clone(),
                session: key.session.clone(),
                index,
                found_tracker: sample.tracker.clone(),
                found_session: sample.session.clone(),
            });
        }
        if !sample.is_valid() {
            return Err(SegmentError::NonFiniteCoordinate {
                tracker: key.tracker.clone(),
                session: key.session.clone(),
                index,
            });
        }
    }

    if let Some(index) = samples
        .windows(2)
        .position(|w| w[1].timestamp < w[0].timestamp)
    {
        return Err(SegmentError::OutOfOrder {
            tracker: key.tracker.clone(),
            session: key.session.clone(),
            index: index + 1,
            previous: samples[index].timestamp,
            current: samples[index + 1].timestamp,
        });
    }

    if samples.len() > 1 && samples[0].timestamp == samples[samples.len() - 1].timestamp {
        warn!(
            "[Partition] {} has {} samples sharing one timestamp",
            key,
            samples.len()
        );
    }

    Ok(())
}
