use crate::broadcast::job_progress::JobProgressTracker;

use super::catalog::{StageKind, STAGE_COUNT};

/// Highest value reported while a job has not completed yet.
pub const IN_FLIGHT_CEILING: u8 = 99;

/// Maps a stage position and its local progress onto overall job progress.
///
/// Each stage owns a fixed band of `100 / STAGE_COUNT` percent starting at
/// `band_index * 100 / STAGE_COUNT`. The result is
/// `floor(band_start + local * band_width / 100)`, computed in integers.
/// Skipped stages keep their band; nothing is renormalized.
pub fn overall_progress(band_index: usize, stage_progress: u8) -> u8 {
    let index = band_index.min(STAGE_COUNT - 1);
    let local = usize::from(stage_progress.min(100));
    ((index * 100 + local) / STAGE_COUNT) as u8
}

/// Same as [`overall_progress`], capped so that only completion reports 100.
pub fn in_flight_progress(band_index: usize, stage_progress: u8) -> u8 {
    overall_progress(band_index, stage_progress).min(IN_FLIGHT_CEILING)
}

/// Events emitted by the pipeline during processing.
pub enum ProgressEvent {
    Started,
    StageStarted {
        stage: StageKind,
        overall_progress: u8,
    },
    StageProgress {
        stage: StageKind,
        stage_progress: u8,
        overall_progress: u8,
    },
    StageCompleted {
        stage: StageKind,
        detail: String,
        overall_progress: u8,
    },
    StageSkipped {
        stage: StageKind,
        overall_progress: u8,
    },
    Completed,
    Failed {
        stage: StageKind,
        stage_progress: u8,
        overall_progress: u8,
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Bridges pipeline events to the broadcast channel.
pub struct BroadcastProgress {
    tracker: JobProgressTracker,
}

impl BroadcastProgress {
    pub fn new(tracker: JobProgressTracker) -> Self {
        Self { tracker }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started => self.tracker.started(),
            ProgressEvent::StageStarted {
                stage,
                overall_progress,
            } => self.tracker.stage_started(stage, overall_progress),
            ProgressEvent::StageProgress {
                stage,
                stage_progress,
                overall_progress,
            } => self
                .tracker
                .stage_progress(stage, stage_progress, overall_progress),
            ProgressEvent::StageCompleted {
                stage,
                detail,
                overall_progress,
            } => self
                .tracker
                .stage_completed(stage, &detail, overall_progress),
            ProgressEvent::StageSkipped {
                stage,
                overall_progress,
            } => self.tracker.stage_skipped(stage, overall_progress),
            ProgressEvent::Completed => self.tracker.completed(),
            ProgressEvent::Failed {
                stage,
                stage_progress,
                overall_progress,
                error,
            } => self
                .tracker
                .failed(stage, stage_progress, overall_progress, &error),
        }
    }
}
