use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::collaborators::Collaborators;
use crate::error::StoreError;
use crate::job::model::{Job, JobStatus, StageStatus, SKIPPED_DETAIL};
use crate::job::store::JobStore;
use crate::sanitize;

use super::catalog::{StageKind, STAGE_CATALOG};
use super::context::{StageProgress, StageRequest};
use super::error::StageError;
use super::progress::{in_flight_progress, ProgressEvent, ProgressReporter};

/// Result of a successful stage.
struct StageOutcome {
    detail: String,
    signature_id: Option<String>,
    dmca_registration_id: Option<String>,
}

impl StageOutcome {
    fn detail(detail: String) -> Self {
        Self {
            detail,
            signature_id: None,
            dmca_registration_id: None,
        }
    }
}

/// Credits a finished stage's band and returns the new overall progress.
///
/// When this was the last outstanding stage the job becomes completed at 100
/// within the same store update.
fn credit_finished_stage(job: &mut Job, stage: StageKind) -> u8 {
    if job
        .stages
        .iter()
        .all(|s| s.status == StageStatus::Completed)
    {
        job.status = JobStatus::Completed;
        job.overall_progress = 100;
    } else {
        job.overall_progress = in_flight_progress(stage.band_index(), 100);
    }
    job.overall_progress
}

/// Drives one job through every catalog stage, strictly in order.
///
/// The runner is the only writer of the jobs it runs. The first stage
/// failure is terminal: the stage and the job are marked failed and every
/// later stage stays pending.
pub struct PipelineRunner {
    store: Arc<JobStore>,
    collaborators: Collaborators,
    creator_ref: String,
}

impl PipelineRunner {
    pub fn new(store: Arc<JobStore>, collaborators: Collaborators, creator_ref: &str) -> Self {
        Self {
            store,
            collaborators,
            creator_ref: creator_ref.to_string(),
        }
    }

    /// Runs a queued job to completion or first failure and returns its
    /// terminal status.
    pub async fn run(
        &self,
        job_id: &str,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<JobStatus, StoreError> {
        let job = self
            .store
            .get(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;

        let span = info_span!("pipeline",
            job_id = %job.id,
            asset = job.asset.name.as_deref().unwrap_or("unnamed"),
            mime_type = %job.asset.mime_type,
            size_bytes = job.asset.size_bytes,
        );

        self.run_stages(&job, progress).instrument(span).await
    }

    async fn run_stages(
        &self,
        job: &Job,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<JobStatus, StoreError> {
        self.store.update(&job.id, |job| {
            job.status = JobStatus::Processing;
            job.started_at = Some(Utc::now());
        })?;
        progress.report(ProgressEvent::Started);
        info!("Processing started");

        let dmca_enabled = job.protection_options().dmca_protection;
        let mut signature_id: Option<String> = None;

        for stage in STAGE_CATALOG {
            if stage == StageKind::DmcaRegistration && !dmca_enabled {
                self.skip_stage(&job.id, stage, progress.as_ref())?;
                tokio::task::yield_now().await;
                continue;
            }

            self.begin_stage(&job.id, stage, progress.as_ref())?;
            tokio::task::yield_now().await;

            let request = StageRequest {
                job_id: &job.id,
                asset: &job.asset,
                options: &job.options,
                signature_id: signature_id.as_deref(),
            };
            let stage_progress = StageProgress::new(
                Arc::clone(&self.store),
                Arc::clone(&progress),
                &job.id,
                stage,
            );

            let outcome = self
                .execute_stage(stage, &request, &stage_progress)
                .instrument(info_span!("stage", stage = %stage))
                .await;

            match outcome {
                Ok(outcome) => {
                    if outcome.signature_id.is_some() {
                        signature_id = outcome.signature_id.clone();
                    }
                    self.complete_stage(&job.id, stage, outcome, progress.as_ref())?;
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    self.fail_stage(&job.id, stage, &e.to_string(), progress.as_ref())?;
                    return Ok(JobStatus::Failed);
                }
            }
        }

        // The last stage's update already marked the job completed.
        progress.report(ProgressEvent::Completed);
        info!("Processing completed");

        Ok(JobStatus::Completed)
    }

    async fn execute_stage(
        &self,
        stage: StageKind,
        request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<StageOutcome, StageError> {
        match stage {
            StageKind::ForensicSignature => {
                let signature = self
                    .collaborators
                    .protection
                    .generate_signature(request.asset, &self.creator_ref, progress)
                    .await
                    .map_err(|e| StageError::collaborator(stage, e))?;

                debug!(
                    "Generated signature {} with {} tracking tokens",
                    sanitize::short_token(&signature.signature_id, 8),
                    signature.tracking_tokens.len()
                );

                Ok(StageOutcome {
                    detail: format!(
                        "Signature: {}",
                        sanitize::short_token(&signature.signature_id, 8)
                    ),
                    signature_id: Some(signature.signature_id),
                    dmca_registration_id: None,
                })
            }
            StageKind::DmcaRegistration => {
                let signature_id = request.signature_id.ok_or(StageError::MissingSignature)?;
                let registration = self
                    .collaborators
                    .protection
                    .register_dmca(signature_id, progress)
                    .await
                    .map_err(|e| StageError::collaborator(stage, e))?;

                Ok(StageOutcome {
                    detail: format!("DMCA ID: {}", registration.registration_id),
                    signature_id: None,
                    dmca_registration_id: Some(registration.registration_id),
                })
            }
            StageKind::UploadDistribution => self
                .collaborators
                .distribution
                .distribute(request, progress)
                .await
                .map(StageOutcome::detail)
                .map_err(|e| StageError::collaborator(stage, e)),
            encoder_stage => self
                .collaborators
                .encoder
                .run_stage(encoder_stage, request, progress)
                .await
                .map(StageOutcome::detail)
                .map_err(|e| StageError::collaborator(encoder_stage, e)),
        }
    }

    fn begin_stage(
        &self,
        job_id: &str,
        stage: StageKind,
        progress: &dyn ProgressReporter,
    ) -> Result<(), StoreError> {
        let overall = self.store.update(job_id, |job| {
            let entry = job.stage_mut(stage);
            entry.status = StageStatus::Processing;
            entry.progress = 0;
            job.overall_progress = in_flight_progress(stage.band_index(), 0);
            job.overall_progress
        })?;

        debug!("Stage '{}' started", stage);
        progress.report(ProgressEvent::StageStarted {
            stage,
            overall_progress: overall,
        });
        Ok(())
    }

    fn complete_stage(
        &self,
        job_id: &str,
        stage: StageKind,
        outcome: StageOutcome,
        progress: &dyn ProgressReporter,
    ) -> Result<(), StoreError> {
        let detail = outcome.detail.clone();
        let overall = self.store.update(job_id, |job| {
            let entry = job.stage_mut(stage);
            entry.status = StageStatus::Completed;
            entry.progress = 100;
            entry.detail = Some(outcome.detail);
            if let Some(signature_id) = outcome.signature_id {
                job.signature_id = Some(signature_id);
            }
            if let Some(registration_id) = outcome.dmca_registration_id {
                job.dmca_registration_id = Some(registration_id);
            }
            credit_finished_stage(job, stage)
        })?;

        debug!("Stage '{}' completed: {}", stage, detail);
        progress.report(ProgressEvent::StageCompleted {
            stage,
            detail,
            overall_progress: overall,
        });
        Ok(())
    }

    fn skip_stage(
        &self,
        job_id: &str,
        stage: StageKind,
        progress: &dyn ProgressReporter,
    ) -> Result<(), StoreError> {
        let overall = self.store.update(job_id, |job| {
            let entry = job.stage_mut(stage);
            entry.status = StageStatus::Completed;
            entry.progress = 100;
            entry.detail = Some(SKIPPED_DETAIL.to_string());
            credit_finished_stage(job, stage)
        })?;

        debug!("Stage '{}' skipped", stage);
        progress.report(ProgressEvent::StageSkipped {
            stage,
            overall_progress: overall,
        });
        Ok(())
    }

    fn fail_stage(
        &self,
        job_id: &str,
        stage: StageKind,
        error: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<(), StoreError> {
        let (stage_progress, overall) = self.store.update(job_id, |job| {
            let entry = job.stage_mut(stage);
            entry.status = StageStatus::Failed;
            let stage_progress = entry.progress;
            job.status = JobStatus::Failed;
            job.error = Some(error.to_string());
            (stage_progress, job.overall_progress)
        })?;

        warn!("Stage '{}' failed: {}", stage, error);
        progress.report(ProgressEvent::Failed {
            stage,
            stage_progress,
            overall_progress: overall,
            error: error.to_string(),
        });
        Ok(())
    }

    /// Fails a job whose runner task died without reaching a terminal state.
    ///
    /// The running stage (or the first pending one) is marked failed. Jobs
    /// that already finished are left alone.
    pub fn abandon(
        &self,
        job_id: &str,
        error: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<(), StoreError> {
        let job = self
            .store
            .get(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;
        if job.is_finished() {
            return Ok(());
        }

        let stage = job
            .stages
            .iter()
            .find(|s| matches!(s.status, StageStatus::Processing | StageStatus::Pending))
            .map(|s| s.kind)
            .unwrap_or(StageKind::FileAnalysis);

        self.fail_stage(job_id, stage, error, progress)
    }
}
