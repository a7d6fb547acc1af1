//! Job progress broadcaster for real-time job status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::job::model::JobStatus;
use crate::pipeline::catalog::StageKind;

/// What happened to the job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    Queued,
    Started,
    StageStarted,
    StageProgress,
    StageCompleted,
    StageSkipped,
    Completed,
    Failed,
}

impl JobEventKind {
    /// Completed and Failed are sent exactly once per job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEventKind::Completed | JobEventKind::Failed)
    }
}

/// Progress event for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Unique job identifier.
    pub job_id: String,
    pub kind: JobEventKind,
    /// Job status after this event.
    pub status: JobStatus,
    /// Stage the event refers to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageKind>,
    /// Stage-local progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_progress: Option<u8>,
    pub overall_progress: u8,
    /// Human-readable message describing current activity.
    pub message: String,
    /// Stage detail (set on stage completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JobProgressEvent {
    pub fn new(job_id: &str, kind: JobEventKind, overall_progress: u8, message: &str) -> Self {
        let status = match kind {
            JobEventKind::Queued => JobStatus::Queued,
            JobEventKind::Completed => JobStatus::Completed,
            JobEventKind::Failed => JobStatus::Failed,
            _ => JobStatus::Processing,
        };

        Self {
            job_id: job_id.to_string(),
            kind,
            status,
            stage: None,
            stage_progress: None,
            overall_progress,
            message: message.to_string(),
            detail: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    fn for_stage(mut self, stage: StageKind, stage_progress: u8) -> Self {
        self.stage = Some(stage);
        self.stage_progress = Some(stage_progress);
        self
    }
}

/// Broadcasts job progress events to any number of subscribers.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    /// Creates a new job progress broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: JobProgressEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }

    /// Creates a tracker for one job and announces it as queued.
    pub fn start_job(&self, job_id: &str) -> JobProgressTracker {
        let tracker = JobProgressTracker::new(job_id, Arc::clone(&self.sender));
        tracker.queued();
        tracker
    }

    /// Creates a tracker for a job that was already announced.
    pub fn tracker(&self, job_id: &str) -> JobProgressTracker {
        JobProgressTracker::new(job_id, Arc::clone(&self.sender))
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Emits events for a single job.
pub struct JobProgressTracker {
    job_id: String,
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressTracker {
    pub fn new(job_id: &str, sender: Arc<broadcast::Sender<JobProgressEvent>>) -> Self {
        Self {
            job_id: job_id.to_string(),
            sender,
        }
    }

    fn emit(&self, event: JobProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn queued(&self) {
        self.emit(JobProgressEvent::new(
            &self.job_id,
            JobEventKind::Queued,
            0,
            "Job queued for processing",
        ));
    }

    pub fn started(&self) {
        self.emit(JobProgressEvent::new(
            &self.job_id,
            JobEventKind::Started,
            0,
            "Processing started",
        ));
    }

    pub fn stage_started(&self, stage: StageKind, overall_progress: u8) {
        let message = format!("{}...", stage.name());
        self.emit(
            JobProgressEvent::new(
                &self.job_id,
                JobEventKind::StageStarted,
                overall_progress,
                &message,
            )
            .for_stage(stage, 0),
        );
    }

    pub fn stage_progress(&self, stage: StageKind, stage_progress: u8, overall_progress: u8) {
        let message = format!("{}: {}%", stage.name(), stage_progress);
        self.emit(
            JobProgressEvent::new(
                &self.job_id,
                JobEventKind::StageProgress,
                overall_progress,
                &message,
            )
            .for_stage(stage, stage_progress),
        );
    }

    pub fn stage_completed(&self, stage: StageKind, detail: &str, overall_progress: u8) {
        let message = format!("{} completed", stage.name());
        let mut event = JobProgressEvent::new(
            &self.job_id,
            JobEventKind::StageCompleted,
            overall_progress,
            &message,
        )
        .for_stage(stage, 100);
        event.detail = Some(detail.to_string());
        self.emit(event);
    }

    pub fn stage_skipped(&self, stage: StageKind, overall_progress: u8) {
        let message = format!("{} skipped", stage.name());
        let mut event = JobProgressEvent::new(
            &self.job_id,
            JobEventKind::StageSkipped,
            overall_progress,
            &message,
        )
        .for_stage(stage, 100);
        event.detail = Some(crate::job::model::SKIPPED_DETAIL.to_string());
        self.emit(event);
    }

    pub fn completed(&self) {
        self.emit(JobProgressEvent::new(
            &self.job_id,
            JobEventKind::Completed,
            100,
            "Processing completed successfully",
        ));
    }

    pub fn failed(&self, stage: StageKind, stage_progress: u8, overall_progress: u8, error: &str) {
        let message = format!("{} failed", stage.name());
        let mut event = JobProgressEvent::new(
            &self.job_id,
            JobEventKind::Failed,
            overall_progress,
            &message,
        )
        .for_stage(stage, stage_progress);
        event.error = Some(error.to_string());
        self.emit(event);
    }
}
