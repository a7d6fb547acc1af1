//! Test harness and collaborator doubles.
//!
//! The doubles resolve without sleeping. `GatedEncoder` parks a chosen
//! stage until the test releases it, which makes intermediate states
//! observable deterministically.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Semaphore};

use mediaguard::config::Config;
use mediaguard::{
    AssetDescriptor, CollaboratorError, Collaborators, DistributionBackend, DmcaRegistration,
    EncodingBackend, ForensicSignature, Job, JobProgressEvent, MediaProcessor, ProcessingOptions,
    ProtectionService, StageKind, StageProgress, StageRequest,
};

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);
pub const POLL_INTERVAL: Duration = Duration::from_millis(2);

// ─── Doubles ────────────────────────────────────────────────────────────────

/// Reports 0, 50 and 100, optionally failing one stage at 50.
pub struct InstantEncoder {
    fail_at: Option<StageKind>,
}

impl InstantEncoder {
    pub fn new() -> Self {
        Self { fail_at: None }
    }

    pub fn failing_at(stage: StageKind) -> Self {
        Self {
            fail_at: Some(stage),
        }
    }
}

#[async_trait]
impl EncodingBackend for InstantEncoder {
    async fn run_stage(
        &self,
        stage: StageKind,
        _request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError> {
        progress.report(0).await;
        progress.report(50).await;
        if self.fail_at == Some(stage) {
            return Err(CollaboratorError::Backend {
                backend: "test-encoder",
                message: format!("injected failure in {}", stage.name()),
            });
        }
        progress.report(100).await;
        Ok(format!("{} done", stage.name()))
    }
}

/// Blocks `stage` until `release` is called, then behaves like
/// `InstantEncoder`.
pub struct GatedEncoder {
    stage: StageKind,
    gate: Arc<Semaphore>,
}

impl GatedEncoder {
    pub fn new(stage: StageKind) -> Self {
        Self {
            stage,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        Arc::clone(&self.gate)
    }
}

#[async_trait]
impl EncodingBackend for GatedEncoder {
    async fn run_stage(
        &self,
        stage: StageKind,
        _request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError> {
        progress.report(10).await;
        if stage == self.stage {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| CollaboratorError::Unavailable("gate closed".to_string()))?;
            permit.forget();
        }
        progress.report(100).await;
        Ok(format!("{} done", stage.name()))
    }
}

/// Releases one parked stage.
pub fn release(gate: &Semaphore) {
    gate.add_permits(1);
}

/// Panics inside `stage` after its first progress report, the way a
/// backend bug would take down the runner task.
pub struct PanickingEncoder {
    stage: StageKind,
}

impl PanickingEncoder {
    pub fn new(stage: StageKind) -> Self {
        Self { stage }
    }
}

#[async_trait]
impl EncodingBackend for PanickingEncoder {
    async fn run_stage(
        &self,
        stage: StageKind,
        _request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError> {
        progress.report(10).await;
        if stage == self.stage {
            panic!("encoder crashed in {}", stage.name());
        }
        progress.report(100).await;
        Ok(format!("{} done", stage.name()))
    }
}

pub struct InstantProtection {
    fail_signature: bool,
}

impl InstantProtection {
    pub fn new() -> Self {
        Self {
            fail_signature: false,
        }
    }

    pub fn failing_signature() -> Self {
        Self {
            fail_signature: true,
        }
    }
}

#[async_trait]
impl ProtectionService for InstantProtection {
    async fn generate_signature(
        &self,
        asset: &AssetDescriptor,
        creator_ref: &str,
        progress: &StageProgress,
    ) -> Result<ForensicSignature, CollaboratorError> {
        progress.report(50).await;
        if self.fail_signature {
            return Err(CollaboratorError::Unavailable(
                "signature service".to_string(),
            ));
        }
        Ok(ForensicSignature {
            signature_id: format!("sig_test_{}", asset.size_bytes),
            content_fingerprint: "feedfacecafebeef".to_string(),
            created_at: Utc::now(),
            creator_ref: creator_ref.to_string(),
            platform_id: "test-platform".to_string(),
            watermark_token: "wm_test".to_string(),
            tracking_tokens: vec!["px_1".to_string(), "px_2".to_string()],
        })
    }

    async fn register_dmca(
        &self,
        signature_id: &str,
        progress: &StageProgress,
    ) -> Result<DmcaRegistration, CollaboratorError> {
        progress.report(100).await;
        Ok(DmcaRegistration {
            registration_id: format!("dmca_{}", signature_id),
        })
    }
}

pub struct InstantDistribution;

#[async_trait]
impl DistributionBackend for InstantDistribution {
    async fn distribute(
        &self,
        _request: &StageRequest<'_>,
        progress: &StageProgress,
    ) -> Result<String, CollaboratorError> {
        progress.report(100).await;
        Ok("Distributed to test platform".to_string())
    }
}

pub fn instant_collaborators() -> Collaborators {
    Collaborators::new(
        Arc::new(InstantEncoder::new()),
        Arc::new(InstantProtection::new()),
        Arc::new(InstantDistribution),
    )
}

pub fn with_encoder(encoder: Arc<dyn EncodingBackend>) -> Collaborators {
    Collaborators::new(
        encoder,
        Arc::new(InstantProtection::new()),
        Arc::new(InstantDistribution),
    )
}

// ─── Harness ────────────────────────────────────────────────────────────────

pub struct TestHarness {
    pub processor: MediaProcessor,
}

impl TestHarness {
    /// Instant doubles with the default test config. Needs a tokio runtime.
    pub fn new() -> Self {
        Self::with_collaborators(instant_collaborators())
    }

    pub fn with_collaborators(collaborators: Collaborators) -> Self {
        Self::with_config(super::ConfigBuilder::new().build(), collaborators)
    }

    pub fn with_config(config: Config, collaborators: Collaborators) -> Self {
        let processor =
            MediaProcessor::new(config, collaborators).expect("Failed to build processor");
        Self { processor }
    }

    pub fn submit(&self, asset: AssetDescriptor, options: ProcessingOptions) -> Job {
        self.processor
            .process_media(asset, options)
            .expect("Submission rejected")
    }

    /// Waits for a terminal state, panicking on timeout.
    pub async fn wait(&self, job_id: &str) -> Job {
        let job = self
            .processor
            .wait_for_completion(job_id, POLL_INTERVAL, WAIT_TIMEOUT)
            .await
            .expect("Job disappeared");
        assert!(job.is_finished(), "job {} did not finish in time", job_id);
        job
    }

    /// Polls until `predicate` holds for the job, panicking on timeout.
    pub async fn wait_until<F>(&self, job_id: &str, predicate: F) -> Job
    where
        F: Fn(&Job) -> bool,
    {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            let job = self.processor.get_job(job_id).expect("Job disappeared");
            if predicate(&job) {
                return job;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "condition never held for job {}",
                job_id
            );
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Drains events for `job_id` up to and including its terminal event.
pub async fn collect_events(
    receiver: &mut broadcast::Receiver<JobProgressEvent>,
    job_id: &str,
) -> Vec<JobProgressEvent> {
    let mut events = Vec::new();
    let result = tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            match receiver.recv().await {
                Ok(event) if event.job_id == job_id => {
                    let terminal = event.kind.is_terminal();
                    events.push(event);
                    if terminal {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    panic!("event receiver lagged by {}", n)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
    .await;
    assert!(result.is_ok(), "no terminal event for job {}", job_id);
    events
}
