use std::sync::Arc;

use crate::job::model::{AssetDescriptor, ProcessingOptions, StageStatus};
use crate::job::store::JobStore;

use super::catalog::StageKind;
use super::progress::{in_flight_progress, ProgressEvent, ProgressReporter};

/// Read-only view of the job handed to a collaborator.
#[derive(Debug, Clone, Copy)]
pub struct StageRequest<'a> {
    pub job_id: &'a str,
    pub asset: &'a AssetDescriptor,
    pub options: &'a ProcessingOptions,
    /// Set once signature generation has completed.
    pub signature_id: Option<&'a str>,
}

/// Progress handle for the stage that is currently running.
///
/// Every report updates the stage in the store, recomputes overall
/// progress and then yields, so pollers observe intermediate values.
pub struct StageProgress {
    store: Arc<JobStore>,
    reporter: Arc<dyn ProgressReporter>,
    job_id: String,
    stage: StageKind,
}

impl StageProgress {
    pub(crate) fn new(
        store: Arc<JobStore>,
        reporter: Arc<dyn ProgressReporter>,
        job_id: &str,
        stage: StageKind,
    ) -> Self {
        Self {
            store,
            reporter,
            job_id: job_id.to_string(),
            stage,
        }
    }

    pub fn stage(&self) -> StageKind {
        self.stage
    }

    /// Records stage-local progress (0-100). Lower values than the last
    /// report are ignored.
    pub async fn report(&self, stage_progress: u8) {
        let stage = self.stage;
        let band = stage.band_index();

        let update = self.store.update(&self.job_id, |job| {
            let entry = job.stage_mut(stage);
            if entry.status != StageStatus::Processing {
                return None;
            }
            let local = stage_progress.min(100).max(entry.progress);
            entry.progress = local;
            job.overall_progress = in_flight_progress(band, local);
            Some((local, job.overall_progress))
        });

        match update {
            Ok(Some((local, overall))) => self.reporter.report(ProgressEvent::StageProgress {
                stage,
                stage_progress: local,
                overall_progress: overall,
            }),
            Ok(None) => {
                tracing::debug!(job_id = %self.job_id, stage = %stage, "Progress report outside running stage ignored");
            }
            Err(e) => {
                tracing::warn!(job_id = %self.job_id, stage = %stage, "Progress report rejected: {}", e);
            }
        }

        tokio::task::yield_now().await;
    }
}
