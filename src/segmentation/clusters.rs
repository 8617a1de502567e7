//! Distance-bounded clustering against a moving base point.
//!
//! The walk is a fold over the time-ordered samples of one partition. The
//! state is the current cluster id plus its base point; each sample either
//! joins the current cluster (distance to base within the threshold, ties
//! included) or becomes the base point of a new cluster.

use chrono::NaiveDateTime;

use crate::PositionSample;
use crate::geo_utils::euclidean_distance;

/// The anchor sample of a cluster. Always the cluster's first member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: NaiveDateTime,
}

impl BasePoint {
    fn of(sample: &PositionSample) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            timestamp: sample.timestamp,
        }
    }
}

/// A member of a cluster, referring to its sample by index into the
/// partition's sample slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterMember {
    /// Index of the sample within its partition
    pub index: usize,
    /// Distance (mm) to the cluster's base point
    pub distance_to_base: f64,
    /// Distance (mm) to the previous sample of the partition
    pub distance_to_previous: f64,
}

/// A run of consecutive samples within `distance_threshold` of one base point.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Cluster id, starting at 1 and strictly increasing within a partition
    pub id: u32,
    pub base: BasePoint,
    pub members: Vec<ClusterMember>,
}

impl Cluster {
    fn anchored_at(id: u32, base: BasePoint) -> Self {
        Self {
            id,
            base,
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Index of the first member (the base point's sample).
    pub fn first_index(&self) -> Option<usize> {
        self.members.first().map(|m| m.index)
    }
}

/// What the state machine decided for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub cluster_id: u32,
    /// The sample opened a new cluster and is its base point
    pub starts_cluster: bool,
    pub distance_to_base: f64,
    pub distance_to_previous: f64,
}

/// Clustering state after consuming at least one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterState {
    pub cluster_id: u32,
    pub base: BasePoint,
    previous_x: f64,
    previous_y: f64,
}

impl ClusterState {
    /// Consume the first sample of a partition: it opens cluster 1.
    pub fn start(sample: &PositionSample) -> (Self, Assignment) {
        let state = Self {
            cluster_id: 1,
            base: BasePoint::of(sample),
            previous_x: sample.x,
            previous_y: sample.y,
        };
        let assignment = Assignment {
            cluster_id: 1,
            starts_cluster: true,
            distance_to_base: 0.0,
            distance_to_previous: 0.0,
        };
        (state, assignment)
    }

    /// Consume the next sample.
    ///
    /// Pure transition: `(state, sample) -> (state', assignment)`.
    pub fn step(self, sample: &PositionSample, distance_threshold: f64) -> (Self, Assignment) {
        let distance_to_previous =
            euclidean_distance(self.previous_x, self.previous_y, sample.x, sample.y);
        let distance_to_base = euclidean_distance(self.base.x, self.base.y, sample.x, sample.y);

        if distance_to_base <= distance_threshold {
            let state = Self {
                previous_x: sample.x,
                previous_y: sample.y,
                ..self
            };
            let assignment = Assignment {
                cluster_id: self.cluster_id,
                starts_cluster: false,
                distance_to_base,
                distance_to_previous,
            };
            (state, assignment)
        } else {
            let cluster_id = self.cluster_id + 1;
            let state = Self {
                cluster_id,
                base: BasePoint::of(sample),
                previous_x: sample.x,
                previous_y: sample.y,
            };
            let assignment = Assignment {
                cluster_id,
                starts_cluster: true,
                distance_to_base: 0.0,
                distance_to_previous,
            };
            (state, assignment)
        }
    }
}

/// Split a partition's time-ordered samples into distance-bounded clusters.
///
/// Every sample lands in exactly one cluster, in original order. An empty
/// input yields no clusters.
///
/// `distance_threshold` must be positive; callers validate it through
/// [`SegmentationConfig::validate`](crate::SegmentationConfig::validate).
pub fn build_clusters(samples: &[PositionSample], distance_threshold: f64) -> Vec<Cluster> {
    debug_assert!(distance_threshold > 0.0);

    let mut clusters: Vec<Cluster> = Vec::new();

    samples
        .iter()
        .enumerate()
        .fold(None, |state: Option<ClusterState>, (index, sample)| {
            let (next, assignment) = match state {
                None => ClusterState::start(sample),
                Some(state) => state.step(sample, distance_threshold),
            };

            if assignment.starts_cluster {
                clusters.push(Cluster::anchored_at(assignment.cluster_id, next.base));
            }
            if let Some(cluster) = clusters.last_mut() {
                cluster.members.push(ClusterMember {
                    index,
                    distance_to_base: assignment.distance_to_base,
                    distance_to_previous: assignment.distance_to_previous,
                });
            }

            Some(next)
        });

    clusters
}
