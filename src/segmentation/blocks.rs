//! Merging consecutive same-label clusters into blocks.
//!
//! A distance reset inside a walk opens a new cluster with its own base
//! point, so one physical transition is usually several clusters. Blocks
//! undo that fragmentation: a new block starts only where the label changes.
//! Time columns are recomputed from the block's first sample.

use chrono::{NaiveDateTime, TimeDelta};

use super::classify::LabeledCluster;
use crate::{PositionSample, SegmentKind};

/// A member sample of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockMember {
    /// Index of the sample within its partition
    pub index: usize,
    /// Cluster the sample was assigned to
    pub cluster_id: u32,
    /// Distance (mm) to the base point of its original cluster
    pub distance_to_base: f64,
    /// Distance (mm) to the previous sample of the partition
    pub distance_to_previous: f64,
    /// Time since the previous sample of the same block (zero at block start)
    pub delta_to_previous: TimeDelta,
    /// Time since the first sample of the block
    pub elapsed: TimeDelta,
}

/// One or more consecutive clusters sharing a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block id, starting at 1 and strictly increasing within a partition
    pub id: u32,
    pub kind: SegmentKind,
    /// Ids of the merged clusters, in order
    pub cluster_ids: Vec<u32>,
    pub members: Vec<BlockMember>,
    /// Timestamp of the first member
    pub start: NaiveDateTime,
    /// Timestamp of the last member
    pub end: NaiveDateTime,
}

impl Block {
    fn open(id: u32, kind: SegmentKind, start: NaiveDateTime) -> Self {
        Self {
            id,
            kind,
            cluster_ids: Vec::new(),
            members: Vec::new(),
            start,
            end: start,
        }
    }

    /// `end - start`; zero for a single-member block.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_stop(&self) -> bool {
        self.kind == SegmentKind::Stop
    }

    fn push(&mut self, member: BlockMember, timestamp: NaiveDateTime) {
        self.end = timestamp;
        self.members.push(member);
    }
}

/// Concatenate consecutive clusters with identical labels into blocks.
///
/// The first cluster always opens block 1; every label change opens the
/// next block. Empty clusters are skipped.
pub fn merge_blocks(labeled: &[LabeledCluster], samples: &[PositionSample]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();

    for lc in labeled {
        let Some(first) = lc.cluster.members.first() else {
            continue;
        };
        let first_ts = samples[first.index].timestamp;

        let continues_block = blocks.last().is_some_and(|b| b.kind == lc.kind);
        if !continues_block {
            let id = blocks.last().map_or(1, |b| b.id + 1);
            blocks.push(Block::open(id, lc.kind, first_ts));
        }
        let Some(block) = blocks.last_mut() else {
            continue;
        };
        block.cluster_ids.push(lc.cluster.id);

        for m in &lc.cluster.members {
            let timestamp = samples[m.index].timestamp;
            let delta_to_previous = if block.is_empty() {
                TimeDelta::zero()
            } else {
                timestamp - block.end
            };
            let member = BlockMember {
                index: m.index,
                cluster_id: lc.cluster.id,
                distance_to_base: m.distance_to_base,
                distance_to_previous: m.distance_to_previous,
                delta_to_previous,
                elapsed: timestamp - block.start,
            };
            block.push(member, timestamp);
        }
    }

    blocks
}
