//! Tests for merging labeled clusters into blocks

mod common;

use chrono::TimeDelta;
use common::{at, sample, stop_walk_stop};
use staypoint::{
    Block, PositionSample, SegmentKind, build_clusters, classify_clusters, merge_blocks,
};

fn blocks_for(samples: &[PositionSample], distance: f64, duration_secs: i64) -> Vec<Block> {
    let clusters = build_clusters(samples, distance);
    let labeled = classify_clusters(clusters, samples, TimeDelta::seconds(duration_secs));
    merge_blocks(&labeled, samples)
}

#[test]
fn test_no_clusters_no_blocks() {
    assert!(merge_blocks(&[], &[]).is_empty());
}

#[test]
fn test_merges_consecutive_transitions() {
    let samples = stop_walk_stop();
    let blocks = blocks_for(&samples, 1000.0, 10);

    assert_eq!(blocks.len(), 3);
    let kinds: Vec<SegmentKind> = blocks.iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![SegmentKind::Stop, SegmentKind::Transition, SegmentKind::Stop]
    );
    assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2, 3]);

    assert_eq!(blocks[0].cluster_ids, vec![1]);
    assert_eq!(blocks[1].cluster_ids, vec![2, 3]);
    assert_eq!(blocks[2].cluster_ids, vec![4]);

    assert_eq!(blocks[0].duration(), TimeDelta::seconds(12));
    assert_eq!(blocks[1].duration(), TimeDelta::seconds(1));
    assert_eq!(blocks[2].duration(), TimeDelta::seconds(10));
}

#[test]
fn test_block_time_columns_reset() {
    let samples = stop_walk_stop();
    let blocks = blocks_for(&samples, 1000.0, 10);

    let walk = &blocks[1];
    assert_eq!(walk.start, at(13));
    assert_eq!(walk.end, at(14));
    assert_eq!(walk.members[0].index, 5);
    assert_eq!(walk.members[0].cluster_id, 2);
    assert_eq!(walk.members[0].delta_to_previous, TimeDelta::zero());
    assert_eq!(walk.members[0].elapsed, TimeDelta::zero());
    assert_eq!(walk.members[1].cluster_id, 3);
    assert_eq!(walk.members[1].delta_to_previous, TimeDelta::seconds(1));
    assert_eq!(walk.members[1].elapsed, TimeDelta::seconds(1));

    let stop = &blocks[2];
    let deltas: Vec<i64> = stop.members.iter().map(|m| m.delta_to_previous.num_seconds()).collect();
    let elapsed: Vec<i64> = stop.members.iter().map(|m| m.elapsed.num_seconds()).collect();
    assert_eq!(deltas, vec![0, 5, 5]);
    assert_eq!(elapsed, vec![0, 5, 10]);
}

#[test]
fn test_block_members_keep_partition_distances() {
    let samples = stop_walk_stop();
    let blocks = blocks_for(&samples, 1000.0, 10);

    // distance_to_previous is not reset at block boundaries
    assert_eq!(blocks[1].members[0].distance_to_previous, 3000.0);
    assert_eq!(blocks[1].members[1].distance_to_previous, 1500.0);
    assert_eq!(blocks[2].members[0].distance_to_previous, 1500.0);
    // distance_to_base refers to the member's own cluster
    assert_eq!(blocks[1].members[1].distance_to_base, 0.0);
}

#[test]
fn test_adjacent_blocks_differ_in_kind() {
    let samples = common::wandering_track("t1", "s1", 300);
    let blocks = blocks_for(&samples, 1000.0, 10);
    assert!(blocks.len() > 2);
    assert!(blocks.windows(2).all(|w| w[0].kind != w[1].kind));
    assert!(blocks.windows(2).all(|w| w[0].end < w[1].start));

    let covered: Vec<usize> = blocks
        .iter()
        .flat_map(|b| b.members.iter().map(|m| m.index))
        .collect();
    assert_eq!(covered, (0..samples.len()).collect::<Vec<_>>());
}

#[test]
fn test_all_transitions_single_block() {
    // Every sample jumps past the threshold: one transition block
    let samples: Vec<_> = (0..6).map(|i| sample(i, i as f64 * 2000.0, 0.0)).collect();
    let blocks = blocks_for(&samples, 1000.0, 10);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, SegmentKind::Transition);
    assert_eq!(blocks[0].cluster_ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(blocks[0].duration(), TimeDelta::seconds(5));
    assert!(!blocks[0].is_stop());
}
