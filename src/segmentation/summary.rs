//! Final per-block records.
//!
//! Stop blocks collapse to a single row (centroid, dispersion, duration).
//! Transition blocks keep one row per sample so that downstream consumers
//! can rebuild walked distance and speed from the trajectory shape.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::blocks::Block;
use crate::geo_utils::{centroid, sample_std_dev};
use crate::time_utils::{TIMESTAMP_OUTPUT_FORMAT, delta_seconds, timestamp_format};
use crate::{PartitionKey, PositionSample, SegmentKind, UNASSIGNED};

/// Summary of one stop block.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub block_id: u32,
    pub tracker: String,
    pub session: String,
    /// Lowest phase seen among the members
    pub phase: i32,
    /// Quantile of the first member
    pub quantile: i32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration: TimeDelta,
    /// Centroid x (mm)
    pub x: f64,
    /// Centroid y (mm)
    pub y: f64,
    /// Sample standard deviation of member x; 0 for a single member
    pub x_stdev: f64,
    /// Sample standard deviation of member y; 0 for a single member
    pub y_stdev: f64,
    pub sample_count: usize,
}

/// One sample of a transition block.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub block_id: u32,
    pub tracker: String,
    pub session: String,
    pub phase: i32,
    pub quantile: i32,
    pub timestamp: NaiveDateTime,
    pub x: f64,
    pub y: f64,
    /// Distance (mm) to the previous sample of the partition
    pub distance_to_previous: f64,
    /// Time since the previous sample of the block (zero at block start)
    pub delta_to_previous: TimeDelta,
    /// Duration of the enclosing block
    pub block_duration: TimeDelta,
}

/// Output of summarizing a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockSummary {
    Stop(StopRecord),
    Transition(Vec<TransitionRecord>),
}

/// Summarize a block into a stop row or per-sample transition rows.
pub fn summarize_block(
    key: &PartitionKey,
    block: &Block,
    samples: &[PositionSample],
) -> BlockSummary {
    match block.kind {
        SegmentKind::Stop => BlockSummary::Stop(summarize_stop(key, block, samples)),
        SegmentKind::Transition => {
            BlockSummary::Transition(summarize_transition(key, block, samples))
        }
    }
}

fn summarize_stop(key: &PartitionKey, block: &Block, samples: &[PositionSample]) -> StopRecord {
    let members: Vec<&PositionSample> = block.members.iter().map(|m| &samples[m.index]).collect();

    let (x, y) = centroid(members.iter().copied());
    let xs: Vec<f64> = members.iter().map(|s| s.x).collect();
    let ys: Vec<f64> = members.iter().map(|s| s.y).collect();

    let phase = members.iter().map(|s| s.phase).min().unwrap_or(UNASSIGNED);
    let quantile = members.first().map_or(UNASSIGNED, |s| s.quantile);

    StopRecord {
        block_id: block.id,
        tracker: key.tracker.clone(),
        session: key.session.clone(),
        phase,
        quantile,
        start: block.start,
        end: block.end,
        duration: block.duration(),
        x,
        y,
        x_stdev: sample_std_dev(&xs),
        y_stdev: sample_std_dev(&ys),
        sample_count: members.len(),
    }
}

fn summarize_transition(
    key: &PartitionKey,
    block: &Block,
    samples: &[PositionSample],
) -> Vec<TransitionRecord> {
    let block_duration = block.duration();
    block
        .members
        .iter()
        .map(|m| {
            let sample = &samples[m.index];
            TransitionRecord {
                block_id: block.id,
                tracker: key.tracker.clone(),
                session: key.session.clone(),
                phase: sample.phase,
                quantile: sample.quantile,
                timestamp: sample.timestamp,
                x: sample.x,
                y: sample.y,
                distance_to_previous: m.distance_to_previous,
                delta_to_previous: m.delta_to_previous,
                block_duration,
            }
        })
        .collect()
}

/// A row of the output table consumed by downstream aggregation.
///
/// Stops contribute one row with their centroid; transitions contribute one
/// row per sample with raw coordinates and zero dispersion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub block_id: u32,
    pub tracker: String,
    pub session: String,
    pub phase: i32,
    pub quantile: i32,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    /// Block start for stops, sample time for transitions
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    /// Block duration in seconds
    pub max_duration_sec: f64,
    pub x: f64,
    pub y: f64,
    pub x_stdev: f64,
    pub y_stdev: f64,
}

impl SegmentRow {
    /// Column order of the output table.
    pub const CSV_HEADER: &'static str =
        "block_id,tracker,session,phase,quantile,type,timestamp,max_duration_sec,x,y,x_stdev,y_stdev";

    /// Render the row in [`SegmentRow::CSV_HEADER`] column order.
    pub fn to_csv_record(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            self.block_id,
            csv_field(&self.tracker),
            csv_field(&self.session),
            self.phase,
            self.quantile,
            self.kind,
            self.timestamp.format(TIMESTAMP_OUTPUT_FORMAT),
            self.max_duration_sec,
            self.x,
            self.y,
            self.x_stdev,
            self.y_stdev
        )
    }
}

/// Quote a text field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl From<&StopRecord> for SegmentRow {
    fn from(stop: &StopRecord) -> Self {
        Self {
            block_id: stop.block_id,
            tracker: stop.tracker.clone(),
            session: stop.session.clone(),
            phase: stop.phase,
            quantile: stop.quantile,
            kind: SegmentKind::Stop,
            timestamp: stop.start,
            max_duration_sec: delta_seconds(stop.duration),
            x: stop.x,
            y: stop.y,
            x_stdev: stop.x_stdev,
            y_stdev: stop.y_stdev,
        }
    }
}

impl From<&TransitionRecord> for SegmentRow {
    fn from(t: &TransitionRecord) -> Self {
        Self {
            block_id: t.block_id,
            tracker: t.tracker.clone(),
            session: t.session.clone(),
            phase: t.phase,
            quantile: t.quantile,
            kind: SegmentKind::Transition,
            timestamp: t.timestamp,
            max_duration_sec: delta_seconds(t.block_duration),
            x: t.x,
            y: t.y,
            x_stdev: 0.0,
            y_stdev: 0.0,
        }
    }
}

impl BlockSummary {
    /// Output table rows for this block.
    pub fn rows(&self) -> Vec<SegmentRow> {
        match self {
            BlockSummary::Stop(stop) => vec![SegmentRow::from(stop)],
            BlockSummary::Transition(records) => records.iter().map(SegmentRow::from).collect(),
        }
    }
}
