//! Shared builders for the integration tests.

// Each test binary only uses a subset of this module's items.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use staypoint::{PositionSample, SegmentationConfig};

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// 2020-08-11 09:00:00, the start of every hand-built session.
pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 8, 11)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// `t0() + secs`.
pub fn at(secs: i64) -> NaiveDateTime {
    t0() + TimeDelta::seconds(secs)
}

/// A sample of tracker `t1` in session `s1`.
pub fn sample(secs: i64, x: f64, y: f64) -> PositionSample {
    PositionSample::new("t1", "s1", at(secs), x, y).with_phase(1, 1)
}

/// A sample in an arbitrary partition.
pub fn sample_in(tracker: &str, session: &str, secs: i64, x: f64, y: f64) -> PositionSample {
    PositionSample::new(tracker, session, at(secs), x, y).with_phase(1, 1)
}

pub fn config(distance_mm: f64, duration_secs: i64) -> SegmentationConfig {
    SegmentationConfig {
        distance_threshold: distance_mm,
        duration_threshold: TimeDelta::seconds(duration_secs),
    }
}

/// Stop at the origin for 12 s, two walking samples, then a 10 s stop.
///
/// With `config(1000.0, 10)` this yields clusters
/// `{0..=4}` stop, `{5}` transition, `{6}` transition, `{7..=9}` stop,
/// and blocks stop / transition / stop.
pub fn stop_walk_stop() -> Vec<PositionSample> {
    vec![
        sample(0, 0.0, 0.0),
        sample(3, 0.0, 0.0),
        sample(6, 0.0, 0.0),
        sample(9, 0.0, 0.0),
        sample(12, 0.0, 0.0),
        sample(13, 3000.0, 0.0),
        sample(14, 4500.0, 0.0),
        sample(15, 6000.0, 0.0),
        sample(20, 6000.0, 0.0),
        sample(25, 6000.0, 0.0),
    ]
}

/// A deterministic track alternating 15-sample dwells and 15-sample walks.
///
/// Dwells jitter within 100 mm; walking samples land 300 mm apart, so
/// the walk fragments into several short clusters. Every fourth second
/// is skipped to leave sampling gaps.
pub fn wandering_track(tracker: &str, session: &str, n: usize) -> Vec<PositionSample> {
    let mut secs = 0i64;
    (0..n)
        .map(|i| {
            let segment = i / 15;
            let origin = segment as f64 * 2000.0;
            let (x, y) = if segment % 2 == 0 {
                (origin + (i % 3) as f64 * 50.0, 100.0 - (i % 2) as f64 * 40.0)
            } else {
                (origin + (i % 15) as f64 * 300.0, 100.0)
            };
            secs += if i % 4 == 3 { 2 } else { 1 };
            PositionSample::new(tracker, session, at(secs), x, y)
                .with_phase((segment % 3) as i32, 1)
        })
        .collect()
}
