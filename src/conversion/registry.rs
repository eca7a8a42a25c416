use super::job::{JobHandle, JobId, JobStatus};
use super::runner::ConversionJob;
use crate::utils::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Tracks the jobs of one process so they can be polled or cancelled by id.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, JobHandle>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job. Fails when an unfinished job already writes the same output.
    pub fn register(&self, handle: JobHandle) -> Result<JobId> {
        let mut jobs = self.lock();

        if let Some(existing) = claimant(&jobs, handle.output()) {
            return Err(Error::path(format!(
                "Output {} is already being written by job {}",
                handle.output().display(),
                existing.id()
            )));
        }

        let id = handle.id();
        debug!("Registered job {} for {}", id, handle.input().display());
        jobs.insert(id, handle);
        Ok(id)
    }

    /// Builds a job and registers it under one lock, so the output name it picks
    /// is never one an unfinished job is already writing.
    pub fn register_with<F>(&self, build: F) -> Result<ConversionJob>
    where
        F: FnOnce(&dyn Fn(&Path) -> bool) -> Result<ConversionJob>,
    {
        let mut jobs = self.lock();
        let job = {
            let is_claimed = |path: &Path| claimant(&jobs, path).is_some();
            build(&is_claimed)?
        };

        let handle = job.handle();
        debug!(
            "Registered job {} for {} -> {}",
            handle.id(),
            handle.input().display(),
            handle.output().display()
        );
        jobs.insert(handle.id(), handle);
        Ok(job)
    }

    pub fn get(&self, id: JobId) -> Option<JobHandle> {
        self.lock().get(&id).cloned()
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.lock().get(&id).map(JobHandle::status)
    }

    /// Snapshots of every registered job, in input path order.
    pub fn statuses(&self) -> Vec<JobStatus> {
        let mut statuses: Vec<JobStatus> = self.lock().values().map(JobHandle::status).collect();
        statuses.sort_by(|a, b| a.input.cmp(&b.input).then(a.id.cmp(&b.id)));
        statuses
    }

    /// Returns `None` for an unknown id, otherwise whether the request was accepted.
    pub fn cancel(&self, id: JobId) -> Option<bool> {
        let handle = self.get(id)?;
        Some(handle.cancel())
    }

    /// Cancels every unfinished job and returns how many accepted the request.
    pub fn cancel_all(&self) -> usize {
        let handles: Vec<JobHandle> = self.lock().values().cloned().collect();
        handles.iter().filter(|handle| handle.cancel()).count()
    }

    pub fn remove(&self, id: JobId) -> Option<JobHandle> {
        self.lock().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, JobHandle>> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The unfinished job writing `output`, if any.
fn claimant<'a>(jobs: &'a HashMap<JobId, JobHandle>, output: &Path) -> Option<&'a JobHandle> {
    jobs.values()
        .find(|job| job.output() == output && !job.state().is_terminal())
}
