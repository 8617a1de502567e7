//! Tests for distance-bounded clustering

mod common;

use common::{sample, stop_walk_stop, wandering_track};
use staypoint::{ClusterState, build_clusters};

#[test]
fn test_empty_partition_has_no_clusters() {
    assert!(build_clusters(&[], 1000.0).is_empty());
}

#[test]
fn test_single_sample_opens_cluster_one() {
    let clusters = build_clusters(&[sample(0, 5.0, 5.0)], 1000.0);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].id, 1);
    assert_eq!(clusters[0].len(), 1);
    assert_eq!(clusters[0].first_index(), Some(0));
    assert_eq!(clusters[0].members[0].distance_to_base, 0.0);
    assert_eq!(clusters[0].members[0].distance_to_previous, 0.0);
}

#[test]
fn test_split_on_distance_jump() {
    let samples = vec![
        sample(0, 0.0, 0.0),
        sample(1, 100.0, 0.0),
        sample(2, 200.0, 0.0),
        sample(3, 2200.0, 0.0),
        sample(4, 2300.0, 0.0),
    ];
    let clusters = build_clusters(&samples, 1000.0);
    assert_eq!(clusters.len(), 2);

    let indices: Vec<Vec<usize>> = clusters
        .iter()
        .map(|c| c.members.iter().map(|m| m.index).collect())
        .collect();
    assert_eq!(indices, vec![vec![0, 1, 2], vec![3, 4]]);

    let first = &clusters[0].members;
    assert_eq!(first[1].distance_to_base, 100.0);
    assert_eq!(first[2].distance_to_base, 200.0);
    assert_eq!(first[2].distance_to_previous, 100.0);

    // The jump sample becomes the new base
    let second = &clusters[1];
    assert_eq!(second.id, 2);
    assert_eq!((second.base.x, second.base.y), (2200.0, 0.0));
    assert_eq!(second.base.timestamp, samples[3].timestamp);
    assert_eq!(second.members[0].distance_to_base, 0.0);
    assert_eq!(second.members[0].distance_to_previous, 2000.0);
    assert_eq!(second.members[1].distance_to_base, 100.0);
}

#[test]
fn test_threshold_distance_stays_in_cluster() {
    // (600, 800) is exactly 1000 mm from the origin
    let samples = vec![sample(0, 0.0, 0.0), sample(1, 600.0, 800.0)];
    assert_eq!(build_clusters(&samples, 1000.0).len(), 1);

    let samples = vec![sample(0, 0.0, 0.0), sample(1, 1000.001, 0.0)];
    assert_eq!(build_clusters(&samples, 1000.0).len(), 2);
}

#[test]
fn test_distance_measured_from_base_not_previous() {
    // Each step is 900 mm, but the third sample is 1800 mm from the base
    let samples = vec![
        sample(0, 0.0, 0.0),
        sample(1, 900.0, 0.0),
        sample(2, 1800.0, 0.0),
    ];
    let clusters = build_clusters(&samples, 1000.0);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].len(), 2);
    assert_eq!(clusters[1].first_index(), Some(2));
}

#[test]
fn test_base_does_not_drift_with_members() {
    // Slow drift: every step is small, but the base stays at the origin
    let samples: Vec<_> = (0..12).map(|i| sample(i, i as f64 * 100.0, 0.0)).collect();
    let clusters = build_clusters(&samples, 1000.0);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].len(), 11);
    assert_eq!((clusters[0].base.x, clusters[0].base.y), (0.0, 0.0));
    assert_eq!(clusters[1].base.x, 1100.0);
}

#[test]
fn test_repeated_timestamps_and_positions() {
    let samples = vec![
        sample(0, 10.0, 10.0),
        sample(0, 10.0, 10.0),
        sample(0, 10.0, 10.0),
    ];
    let clusters = build_clusters(&samples, 1000.0);
    assert_eq!(clusters.len(), 1);
    assert!(clusters[0].members.iter().all(|m| m.distance_to_base == 0.0));
}

#[test]
fn test_every_sample_lands_in_one_cluster() {
    let samples = wandering_track("t1", "s1", 200);
    let clusters = build_clusters(&samples, 1000.0);

    let indices: Vec<usize> = clusters
        .iter()
        .flat_map(|c| c.members.iter().map(|m| m.index))
        .collect();
    assert_eq!(indices, (0..samples.len()).collect::<Vec<_>>());

    for (i, c) in clusters.iter().enumerate() {
        assert_eq!(c.id, i as u32 + 1);
        assert!(!c.is_empty());
        assert!(c.members.iter().all(|m| m.distance_to_base <= 1000.0));
    }
}

#[test]
fn test_cluster_state_step_is_pure() {
    let samples = stop_walk_stop();
    let (state, first) = ClusterState::start(&samples[0]);
    assert!(first.starts_cluster);
    assert_eq!(first.cluster_id, 1);

    let (a, stay) = state.step(&samples[1], 1000.0);
    let (b, again) = state.step(&samples[1], 1000.0);
    assert_eq!(a, b);
    assert_eq!(stay, again);
    assert!(!stay.starts_cluster);
    assert_eq!(stay.cluster_id, 1);

    let (jumped, split) = a.step(&samples[5], 1000.0);
    assert!(split.starts_cluster);
    assert_eq!(split.cluster_id, 2);
    assert_eq!(split.distance_to_previous, 3000.0);
    assert_eq!(jumped.base.x, 3000.0);

    // The original state is untouched
    assert_eq!(state.cluster_id, 1);
    assert_eq!(state.base.x, 0.0);
}
