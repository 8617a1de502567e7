//! Progress callback for segmentation runs.
//!
//! Implementations receive phase transitions and per-partition progress
//! updates. With the `parallel` feature, progress is emitted from rayon
//! worker threads, so implementations must be `Send + Sync`.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Run phases, ordered by execution sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationPhase {
    /// Grouping samples by (tracker, session)
    Partitioning,
    /// Clustering, labeling, merging and summarizing each partition
    Segmenting,
}

impl SegmentationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentationPhase::Partitioning => "partitioning",
            SegmentationPhase::Segmenting => "segmenting",
        }
    }
}

/// Trait for receiving progress updates and signalling cancellation.
///
/// Cancellation is whole-run: it is checked before each partition starts,
/// never in the middle of one.
pub trait SegmentationProgress: Send + Sync {
    /// Called when entering a new phase. `total` is the number of items in this phase.
    fn on_phase(&self, phase: SegmentationPhase, total: u32);
    /// Called after completing one partition.
    fn on_progress(&self);
    /// Return true to stop before the next partition starts.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// No-op implementation used by the plain entry points.
pub struct NoopProgress;

impl SegmentationProgress for NoopProgress {
    fn on_phase(&self, _phase: SegmentationPhase, _total: u32) {}
    fn on_progress(&self) {}
}

/// Simple atomic progress tracker that can be polled and cancelled from another thread.
pub struct AtomicProgressTracker {
    pub phase: Mutex<String>,
    pub completed: AtomicU32,
    pub total: AtomicU32,
    pub cancelled: AtomicBool,
}

impl Default for AtomicProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicProgressTracker {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(String::new()),
            completed: AtomicU32::new(0),
            total: AtomicU32::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request cancellation of the run.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Name of the current phase.
    pub fn current_phase(&self) -> String {
        match self.phase.lock() {
            Ok(phase) => phase.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SegmentationProgress for AtomicProgressTracker {
    fn on_phase(&self, phase: SegmentationPhase, total: u32) {
        match self.phase.lock() {
            Ok(mut current) => *current = phase.as_str().to_string(),
            Err(poisoned) => *poisoned.into_inner() = phase.as_str().to_string(),
        }
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    fn on_progress(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
