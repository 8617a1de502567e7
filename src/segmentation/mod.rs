//! # Stop and Transition Segmentation
//!
//! Converts time-ordered position samples into labeled intervals.
//!
//! ## Algorithm
//! 1. Group samples by `(tracker, session)` once
//! 2. Per partition, cluster samples against a moving base point: a sample
//!    farther than `distance_threshold` from the base opens a new cluster
//! 3. Label each cluster: stop if it spans at least `duration_threshold`
//!    from its base point, transition otherwise
//! 4. Merge consecutive same-label clusters into blocks, recomputing
//!    per-sample time deltas from each block's first sample
//! 5. Summarize: one row per stop block, one row per transition sample
//!
//! ## Partitions
//! Partitions are independent. Each is segmented into its own arena (the
//! partition's samples plus clusters and blocks that index into them), and
//! the arenas are concatenated in partition-key order. With the `parallel`
//! feature the partitions are processed on rayon workers; the output is
//! identical either way.

mod blocks;
mod classify;
mod clusters;
pub mod progress;
mod summary;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SegmentError};
use crate::partition::{partition_samples, validate_partition};
use crate::{PartitionKey, PositionSample, SegmentationConfig};

pub use blocks::{Block, BlockMember, merge_blocks};
pub use classify::{LabeledCluster, classify_cluster, classify_clusters, max_delta_from_base};
pub use clusters::{Assignment, BasePoint, Cluster, ClusterMember, ClusterState, build_clusters};
pub use progress::{AtomicProgressTracker, NoopProgress, SegmentationPhase, SegmentationProgress};
pub use summary::{BlockSummary, SegmentRow, StopRecord, TransitionRecord, summarize_block};

/// Segmentation of a single `(tracker, session)` partition.
#[derive(Debug, Clone)]
pub struct PartitionSegmentation {
    pub key: PartitionKey,
    /// The partition's samples in input order; members index into this
    pub samples: Vec<PositionSample>,
    pub clusters: Vec<LabeledCluster>,
    pub blocks: Vec<Block>,
    /// One summary per block, in block order
    pub summaries: Vec<BlockSummary>,
}

impl PartitionSegmentation {
    /// Stop records of this partition, in block order.
    pub fn stops(&self) -> impl Iterator<Item = &StopRecord> {
        self.summaries.iter().filter_map(|s| match s {
            BlockSummary::Stop(stop) => Some(stop),
            BlockSummary::Transition(_) => None,
        })
    }

    /// Transition records of this partition, in block then time order.
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.summaries
            .iter()
            .filter_map(|s| match s {
                BlockSummary::Stop(_) => None,
                BlockSummary::Transition(records) => Some(records),
            })
            .flatten()
    }

    /// Output table rows of this partition.
    pub fn rows(&self) -> Vec<SegmentRow> {
        self.summaries.iter().flat_map(|s| s.rows()).collect()
    }

    /// `(cluster_id, block_id)` of every sample, indexed like `samples`.
    pub fn assignments(&self) -> Vec<(u32, u32)> {
        let mut assignments = vec![(0, 0); self.samples.len()];
        for block in &self.blocks {
            for m in &block.members {
                assignments[m.index] = (m.cluster_id, block.id);
            }
        }
        assignments
    }

    pub fn stop_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_stop()).count()
    }

    pub fn transition_block_count(&self) -> usize {
        self.blocks.len() - self.stop_block_count()
    }
}

/// Totals over a segmentation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationStats {
    pub partitions: usize,
    pub samples: usize,
    pub clusters: usize,
    pub stop_blocks: usize,
    pub transition_blocks: usize,
}

impl SegmentationStats {
    fn from_partitions(partitions: &[PartitionSegmentation]) -> Self {
        partitions.iter().fold(Self::default(), |mut stats, p| {
            stats.partitions += 1;
            stats.samples += p.samples.len();
            stats.clusters += p.clusters.len();
            stats.stop_blocks += p.stop_block_count();
            stats.transition_blocks += p.transition_block_count();
            stats
        })
    }
}

/// Result of segmenting a whole sample table.
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Partitions in `(tracker, session)` order
    pub partitions: Vec<PartitionSegmentation>,
    pub stats: SegmentationStats,
}

impl SegmentationResult {
    /// The full output table, ordered by `(tracker, session, block_id)` and time.
    pub fn rows(&self) -> Vec<SegmentRow> {
        self.partitions.iter().flat_map(|p| p.rows()).collect()
    }

    /// Look up one partition.
    pub fn partition(&self, tracker: &str, session: &str) -> Option<&PartitionSegmentation> {
        self.partitions
            .iter()
            .find(|p| p.key.tracker == tracker && p.key.session == session)
    }
}

/// Segment the samples of a single partition.
///
/// The samples must all belong to `key` and be in non-decreasing timestamp
/// order; a sample of another partition is rejected with
/// [`SegmentError::ForeignSample`]. An empty partition yields no clusters
/// and no blocks.
pub fn segment_partition(
    key: PartitionKey,
    samples: Vec<PositionSample>,
    config: &SegmentationConfig,
) -> Result<PartitionSegmentation> {
    config.validate()?;
    validate_partition(&key, &samples)?;

    let clusters = build_clusters(&samples, config.distance_threshold);
    let clusters = classify_clusters(clusters, &samples, config.duration_threshold);
    let blocks = merge_blocks(&clusters, &samples);
    let summaries: Vec<BlockSummary> = blocks
        .iter()
        .map(|b| summarize_block(&key, b, &samples))
        .collect();

    let segmentation = PartitionSegmentation {
        key,
        samples,
        clusters,
        blocks,
        summaries,
    };

    debug!(
        "[Segmentation] {}: {} samples -> {} clusters -> {} stops, {} transitions",
        segmentation.key,
        segmentation.samples.len(),
        segmentation.clusters.len(),
        segmentation.stop_block_count(),
        segmentation.transition_block_count()
    );

    Ok(segmentation)
}

/// Segment a full sample table.
///
/// Samples may interleave partitions; within each partition they must be
/// time-ordered. The thresholds are validated before any partition runs,
/// and the first failing partition aborts the run.
pub fn segment_samples(
    samples: Vec<PositionSample>,
    config: &SegmentationConfig,
) -> Result<SegmentationResult> {
    segment_samples_with_progress(samples, config, &NoopProgress)
}

/// Segment a full sample table, reporting progress and honoring cancellation.
///
/// Cancellation is checked before each partition starts; a cancelled run
/// returns [`SegmentError::Cancelled`] and no partial output.
pub fn segment_samples_with_progress(
    samples: Vec<PositionSample>,
    config: &SegmentationConfig,
    progress: &dyn SegmentationProgress,
) -> Result<SegmentationResult> {
    config.validate()?;

    let start = Instant::now();
    progress.on_phase(SegmentationPhase::Partitioning, samples.len() as u32);
    let sample_count = samples.len();
    let partitions: Vec<(PartitionKey, Vec<PositionSample>)> =
        partition_samples(samples).into_iter().collect();
    let total = partitions.len();

    info!(
        "[Segmentation] {} samples in {} partitions (distance {}mm, duration {}s)",
        sample_count,
        total,
        config.distance_threshold,
        config.duration_threshold.num_seconds()
    );

    progress.on_phase(SegmentationPhase::Segmenting, total as u32);
    let completed = AtomicUsize::new(0);

    let run = |(key, samples): (PartitionKey, Vec<PositionSample>)| {
        if progress.is_cancelled() {
            return Err(SegmentError::Cancelled {
                completed: completed.load(Ordering::SeqCst),
                total,
            });
        }
        let segmentation = segment_partition(key, samples, config)?;
        completed.fetch_add(1, Ordering::SeqCst);
        progress.on_progress();
        Ok::<_, SegmentError>(segmentation)
    };

    #[cfg(feature = "parallel")]
    let segmented: Result<Vec<PartitionSegmentation>> =
        partitions.into_par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let segmented: Result<Vec<PartitionSegmentation>> = partitions.into_iter().map(run).collect();

    let partitions = segmented?;
    let stats = SegmentationStats::from_partitions(&partitions);

    info!(
        "[Segmentation] {} clusters -> {} stops, {} transitions in {}ms",
        stats.clusters,
        stats.stop_blocks,
        stats.transition_blocks,
        start.elapsed().as_millis()
    );

    Ok(SegmentationResult { partitions, stats })
}
