//! Planar geometry and summary statistics over positioning samples.
//!
//! Coordinates are planar (millimeters on a floor plan), so distances are
//! plain Euclidean rather than geodesic.

use crate::PositionSample;

/// Euclidean distance between two planar points.
#[inline]
pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Euclidean distance between two samples.
#[inline]
pub fn sample_distance(a: &PositionSample, b: &PositionSample) -> f64 {
    euclidean_distance(a.x, a.y, b.x, b.y)
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Defined as 0.0 when fewer than two values are present.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Median of the values. Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Centroid (mean x, mean y) of a set of samples.
pub fn centroid<'a, I>(samples: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a PositionSample>,
{
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut count = 0usize;
    for s in samples {
        sum_x += s.x;
        sum_y += s.y;
        count += 1;
    }
    if count == 0 {
        return (0.0, 0.0);
    }
    (sum_x / count as f64, sum_y / count as f64)
}
