//! Tests for error module

mod common;

use common::{at, sample, sample_in};
use staypoint::{SegmentError, segment_samples};

#[test]
fn test_error_display_names_partition() {
    let err = SegmentError::OutOfOrder {
        tracker: "badge-7".to_string(),
        session: "monday".to_string(),
        index: 3,
        previous: at(10),
        current: at(4),
    };
    let message = err.to_string();
    assert!(message.contains("badge-7"));
    assert!(message.contains("monday"));
    assert!(message.contains("sample 3"));
    assert_eq!(err.partition(), Some(("badge-7", "monday")));
    assert!(!err.is_configuration());
}

#[test]
fn test_configuration_errors() {
    let distance = SegmentError::InvalidDistanceThreshold { value: -1.0 };
    assert!(distance.is_configuration());
    assert!(distance.partition().is_none());
    assert!(distance.to_string().contains("-1"));

    assert!(SegmentError::Config("bad".to_string()).is_configuration());
    assert!(!SegmentError::Cancelled { completed: 1, total: 4 }.is_configuration());
}

#[test]
fn test_io_and_json_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "samples.json");
    let err: SegmentError = io.into();
    assert!(matches!(err, SegmentError::Io(_)));

    let json_err = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
    let err: SegmentError = json_err.into();
    assert!(matches!(err, SegmentError::Json(_)));
}

#[test]
fn test_pipeline_error_locates_partition() {
    let samples = vec![
        sample_in("a", "s1", 0, 0.0, 0.0),
        sample_in("a", "s1", 1, 0.0, 0.0),
        sample_in("b", "s9", 5, 0.0, 0.0),
        sample_in("b", "s9", 2, 0.0, 0.0),
    ];
    let err = segment_samples(samples, &Default::default()).unwrap_err();
    assert_eq!(err.partition(), Some(("b", "s9")));
    assert!(matches!(err, SegmentError::OutOfOrder { index: 1, .. }));

    let mut broken = sample(3, 0.0, 0.0);
    broken.y = f64::NAN;
    let err = segment_samples(vec![sample(0, 0.0, 0.0), broken], &Default::default()).unwrap_err();
    assert!(matches!(
        err,
        SegmentError::NonFiniteCoordinate { index: 1, .. }
    ));
    assert_eq!(err.partition(), Some(("t1", "s1")));
}
