//! Lifecycle state shared between a running job and its observers.

use super::progress::{ConversionProgress, ProgressPhase};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub type JobId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// How a job ended, as seen by the runner before the guarded transition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Completion {
    Succeeded { output_size: u64 },
    Failed { error: String },
    Cancelled,
}

/// Point-in-time view of a job for status polling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatus {
    pub id: JobId,
    pub input: PathBuf,
    pub output: PathBuf,
    pub state: JobState,
    pub phase: Option<ProgressPhase>,
    pub fraction: Option<f64>,
    pub output_size: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct JobInner {
    state: JobState,
    cancel_requested: bool,
    progress: Option<ConversionProgress>,
    output_size: Option<u64>,
    error: Option<String>,
}

#[derive(Debug)]
struct JobShared {
    id: JobId,
    input: PathBuf,
    output: PathBuf,
    cancel: CancellationToken,
    inner: Mutex<JobInner>,
}

/// Cloneable handle for observing and cancelling one job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    shared: Arc<JobShared>,
}

impl JobHandle {
    pub(crate) fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            shared: Arc::new(JobShared {
                id: Uuid::new_v4(),
                input,
                output,
                cancel: CancellationToken::new(),
                inner: Mutex::new(JobInner {
                    state: JobState::Created,
                    cancel_requested: false,
                    progress: None,
                    output_size: None,
                    error: None,
                }),
            }),
        }
    }

    pub fn id(&self) -> JobId {
        self.shared.id
    }

    pub fn input(&self) -> &Path {
        &self.shared.input
    }

    pub fn output(&self) -> &Path {
        &self.shared.output
    }

    pub fn state(&self) -> JobState {
        self.lock().state
    }

    /// Requests cancellation. Returns `false` when the job already finished or
    /// a cancellation was already accepted.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.is_terminal() || inner.cancel_requested {
            return false;
        }
        inner.cancel_requested = true;
        self.shared.cancel.cancel();
        true
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.lock().cancel_requested
    }

    pub fn status(&self) -> JobStatus {
        let inner = self.lock();
        JobStatus {
            id: self.shared.id,
            input: self.shared.input.clone(),
            output: self.shared.output.clone(),
            state: inner.state,
            phase: inner.progress.as_ref().map(|p| p.phase),
            fraction: inner.progress.as_ref().and_then(|p| p.fraction),
            output_size: inner.output_size,
            error: inner.error.clone(),
        }
    }

    pub(crate) fn cancellation(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// Created -> Running. Refused once cancellation has been accepted.
    pub(crate) fn mark_running(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != JobState::Created || inner.cancel_requested {
            return false;
        }
        inner.state = JobState::Running;
        true
    }

    pub(crate) fn record_progress(&self, progress: &ConversionProgress) {
        let mut inner = self.lock();
        if !inner.state.is_terminal() {
            inner.progress = Some(progress.clone());
        }
    }

    /// Records the terminal state exactly once. An accepted cancellation
    /// overrides whatever the process reported. Returns the recorded state.
    pub(crate) fn complete(&self, completion: Completion) -> JobState {
        let mut inner = self.lock();
        if inner.state.is_terminal() {
            return inner.state;
        }

        let completion = if inner.cancel_requested {
            Completion::Cancelled
        } else {
            completion
        };

        inner.state = match completion {
            Completion::Succeeded { output_size } => {
                inner.output_size = Some(output_size);
                JobState::Succeeded
            }
            Completion::Failed { error } => {
                inner.error = Some(error);
                JobState::Failed
            }
            Completion::Cancelled => JobState::Cancelled,
        };
        inner.state
    }

    fn lock(&self) -> MutexGuard<'_, JobInner> {
        // State stays consistent even if an observer panicked mid-update
        self.shared
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
