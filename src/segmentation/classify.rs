//! Stop/transition labeling of distance-bounded clusters.
//!
//! The label depends only on the time a single cluster spans from its own
//! base point. Clusters that are later merged into one block are never
//! re-labeled, so a run of short clusters stays a transition even when the
//! merged block is long.

use chrono::TimeDelta;

use super::clusters::Cluster;
use crate::{PositionSample, SegmentKind};

/// A cluster with its stop/transition label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledCluster {
    pub cluster: Cluster,
    pub kind: SegmentKind,
    /// Largest time offset of any member from the base point
    pub max_delta: TimeDelta,
}

/// Largest `timestamp(member) - timestamp(base)` over the cluster's members.
///
/// Zero for a single-member cluster.
pub fn max_delta_from_base(cluster: &Cluster, samples: &[PositionSample]) -> TimeDelta {
    cluster
        .members
        .iter()
        .map(|m| samples[m.index].timestamp - cluster.base.timestamp)
        .max()
        .unwrap_or_else(TimeDelta::zero)
        .max(TimeDelta::zero())
}

/// Label one cluster: stop when it spans at least `duration_threshold`.
pub fn classify_cluster(
    cluster: Cluster,
    samples: &[PositionSample],
    duration_threshold: TimeDelta,
) -> LabeledCluster {
    let max_delta = max_delta_from_base(&cluster, samples);
    let kind = if max_delta >= duration_threshold {
        SegmentKind::Stop
    } else {
        SegmentKind::Transition
    };
    LabeledCluster {
        cluster,
        kind,
        max_delta,
    }
}

/// Label every cluster of a partition, keeping their order.
pub fn classify_clusters(
    clusters: Vec<Cluster>,
    samples: &[PositionSample],
    duration_threshold: TimeDelta,
) -> Vec<LabeledCluster> {
    clusters
        .into_iter()
        .map(|c| classify_cluster(c, samples, duration_threshold))
        .collect()
}
