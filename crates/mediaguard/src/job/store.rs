//! In-memory job registry shared by the runner and polling consumers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::job::model::{AssetDescriptor, Job, JobStatus, ProcessingOptions};

// ─── Helpers ────────────────────────────────────────────────────────────────

fn read_guard<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Job store {} lock was poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

fn write_guard<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Job store {} lock was poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

// ─── Counts ─────────────────────────────────────────────────────────────────

/// Number of jobs per status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCounts {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

// ─── JobStore ───────────────────────────────────────────────────────────────

/// Concurrent job registry.
///
/// The outer lock only guards the map structure (insert, evict). Each job
/// sits behind its own lock, so a runner updating one job never blocks
/// readers or writers of another. Readers always receive a cloned snapshot.
pub struct JobStore {
    jobs: RwLock<HashMap<String, Arc<RwLock<Job>>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Allocates a queued job and returns its snapshot.
    pub fn create_job(&self, asset: AssetDescriptor, options: ProcessingOptions) -> Job {
        let job = Job::new(asset, options);
        let snapshot = job.clone();

        write_guard(&self.jobs, "map").insert(job.id.clone(), Arc::new(RwLock::new(job)));
        log::debug!("Created job {}", snapshot.id);

        snapshot
    }

    fn entry(&self, job_id: &str) -> Option<Arc<RwLock<Job>>> {
        read_guard(&self.jobs, "map").get(job_id).cloned()
    }

    /// Returns the current snapshot, or `None` for an unknown id.
    pub fn get(&self, job_id: &str) -> Option<Job> {
        let entry = self.entry(job_id)?;
        let job = read_guard(&entry, "job");
        Some(job.clone())
    }

    /// Returns all jobs, newest first.
    pub fn get_all(&self) -> Vec<Job> {
        let entries: Vec<Arc<RwLock<Job>>> =
            read_guard(&self.jobs, "map").values().cloned().collect();

        let mut result: Vec<Job> = entries
            .iter()
            .map(|entry| read_guard(entry, "job").clone())
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Applies a single state transition to a job.
    ///
    /// Rejects updates to finished jobs. `overall_progress` is clamped so it
    /// never moves backwards, and `finished_at` is stamped when the mutation
    /// makes the job terminal.
    pub(crate) fn update<F, R>(&self, job_id: &str, mutator: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Job) -> R,
    {
        let entry = self
            .entry(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;
        let mut job = write_guard(&entry, "job");

        if job.status.is_terminal() {
            return Err(StoreError::Terminal(job_id.to_string()));
        }

        let previous_progress = job.overall_progress;
        let result = mutator(&mut job);

        if job.overall_progress < previous_progress {
            job.overall_progress = previous_progress;
        }
        if job.status.is_terminal() && job.finished_at.is_none() {
            job.finished_at = Some(Utc::now());
        }

        Ok(result)
    }

    /// Returns the number of jobs per status.
    pub fn counts(&self) -> JobCounts {
        let entries: Vec<Arc<RwLock<Job>>> =
            read_guard(&self.jobs, "map").values().cloned().collect();

        let mut counts = JobCounts::default();
        for entry in &entries {
            match read_guard(entry, "job").status {
                JobStatus::Queued => counts.queued += 1,
                JobStatus::Processing => counts.processing += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// Removes finished jobs that finished more than `older_than` ago.
    ///
    /// Never called automatically. Queued and running jobs are kept.
    pub fn evict_finished(&self, older_than: Duration) -> usize {
        let cutoff = Utc::now() - older_than;
        let mut jobs = write_guard(&self.jobs, "map");
        let before = jobs.len();

        jobs.retain(|_, entry| {
            let job = read_guard(entry, "job");
            match job.finished_at {
                Some(finished_at) if job.status.is_terminal() => finished_at > cutoff,
                _ => true,
            }
        });

        let removed = before - jobs.len();
        if removed > 0 {
            log::info!("Evicted {} finished jobs", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        read_guard(&self.jobs, "map").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
