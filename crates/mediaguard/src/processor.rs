//! Composition root: owns the job store, the runner and the event channel.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, Semaphore};

use crate::broadcast::{JobProgressBroadcaster, JobProgressEvent};
use crate::collaborators::Collaborators;
use crate::config::{validate_config, Config};
use crate::error::{MediaGuardError, Result, ValidationError};
use crate::job::{AssetDescriptor, Job, JobCounts, JobStore, ProcessingOptions};
use crate::pipeline::{BroadcastProgress, PipelineRunner, ProgressReporter};
use crate::validation::{validate_asset, validate_options};

/// Accepts submissions and runs each job on its own tokio task.
pub struct MediaProcessor {
    config: Config,
    store: Arc<JobStore>,
    runner: Arc<PipelineRunner>,
    broadcaster: JobProgressBroadcaster,
    permits: Option<Arc<Semaphore>>,
    runtime: Handle,
}

impl MediaProcessor {
    /// Must be called from within a tokio runtime; jobs are spawned on it.
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        validate_config(&config)?;

        let runtime = Handle::try_current().map_err(|e| MediaGuardError::Runtime(e.to_string()))?;

        let store = Arc::new(JobStore::new());
        let runner = Arc::new(PipelineRunner::new(
            Arc::clone(&store),
            collaborators,
            &config.pipeline.creator_ref,
        ));
        let broadcaster = JobProgressBroadcaster::new(config.events.channel_capacity);
        let permits = config
            .pipeline
            .max_concurrent_jobs
            .map(|limit| Arc::new(Semaphore::new(limit)));

        info!(
            "Media processor ready (max concurrent jobs: {})",
            config
                .pipeline
                .max_concurrent_jobs
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );

        Ok(Self {
            config,
            store,
            runner,
            broadcaster,
            permits,
            runtime,
        })
    }

    /// Processor backed by the time-delayed simulated collaborators.
    pub fn simulated(config: Config) -> Result<Self> {
        let collaborators = Collaborators::simulated(&config.simulation);
        Self::new(config, collaborators)
    }

    /// Validates the submission, creates a queued job and starts its runner.
    ///
    /// Returns as soon as the job exists; the returned snapshot is `queued`.
    pub fn process_media(
        &self,
        asset: AssetDescriptor,
        options: ProcessingOptions,
    ) -> std::result::Result<Job, ValidationError> {
        validate_asset(&asset, &self.config.validation)?;
        validate_options(&options)?;

        let job = self.store.create_job(asset, options);
        let tracker = self.broadcaster.start_job(&job.id);
        let reporter: Arc<dyn ProgressReporter> = Arc::new(BroadcastProgress::new(tracker));

        info!(
            "Queued job {} ({}, {} bytes)",
            job.id, job.asset.mime_type, job.asset.size_bytes
        );
        self.spawn_runner(job.id.clone(), reporter);

        Ok(job)
    }

    fn spawn_runner(&self, job_id: String, reporter: Arc<dyn ProgressReporter>) {
        let task = {
            let runner = Arc::clone(&self.runner);
            let reporter = Arc::clone(&reporter);
            let permits = self.permits.clone();
            let job_id = job_id.clone();

            self.runtime.spawn(async move {
                // Held for the whole run; the job stays queued until granted.
                let _permit = match permits {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                runner.run(&job_id, reporter).await
            })
        };

        let runner = Arc::clone(&self.runner);
        self.runtime.spawn(async move {
            match task.await {
                Ok(Ok(status)) => debug!("Job {} finished as {}", job_id, status),
                Ok(Err(e)) => warn!("Job {} runner stopped early: {}", job_id, e),
                Err(e) => {
                    error!("Job {} runner aborted: {}", job_id, e);
                    let message = format!("Pipeline runner aborted: {}", e);
                    if let Err(e) = runner.abandon(&job_id, &message, reporter.as_ref()) {
                        warn!("Could not mark job {} failed: {}", job_id, e);
                    }
                }
            }
        });
    }

    pub fn get_job(&self, job_id: &str) -> Option<Job> {
        self.store.get(job_id)
    }

    /// All jobs, newest first.
    pub fn list_jobs(&self) -> Vec<Job> {
        self.store.get_all()
    }

    pub fn counts(&self) -> JobCounts {
        self.store.counts()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.broadcaster.subscribe()
    }

    /// Drops finished jobs older than `older_than`. Returns how many went.
    pub fn evict_finished(&self, older_than: chrono::Duration) -> usize {
        self.store.evict_finished(older_than)
    }

    /// Polls until the job is finished or `timeout` elapses and returns the
    /// last snapshot seen. `None` if the id is unknown.
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Option<Job> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let job = self.store.get(job_id)?;
            if job.is_finished() || tokio::time::Instant::now() >= deadline {
                return Some(job);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    pub fn store(&self) -> Arc<JobStore> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
