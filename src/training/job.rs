//! Training job record and its shared handle

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, agents::AgentSelector, error::Error};

/// How a TD agent gathers its training games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMethod {
    /// Against the scripted teacher
    Teacher,
    /// Against itself
    SelfPlay,
}

impl TrainingMethod {
    /// Parse the optional wire value; a missing method means self-play.
    pub fn from_wire(method: Option<&str>) -> Result<Self> {
        match method.map(str::trim) {
            None | Some("self_play" | "self-play" | "selfplay") => Ok(TrainingMethod::SelfPlay),
            Some("teacher") => Ok(TrainingMethod::Teacher),
            Some(other) => Err(Error::InvalidTrainingRequest {
                message: format!("unknown training method '{other}' (expected 'teacher' or 'self_play')"),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrainingMethod::Teacher => "teacher",
            TrainingMethod::SelfPlay => "self_play",
        }
    }
}

/// Validated `start_training` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub agent_type: AgentSelector,
    pub method: TrainingMethod,
    /// Number of games; `None` uses the configured default
    pub episodes: Option<u64>,
    /// Continue from the saved agent instead of a fresh one
    pub load_existing: bool,
}

/// Why a job ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Cancelled,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed(FailureReason),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed(_))
    }
}

/// Snapshot of a training job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingJob {
    pub id: Uuid,
    pub request: TrainingRequest,
    pub status: JobStatus,
    /// Percent complete, 0 to 100, never decreasing
    pub progress: f64,
}

#[derive(Debug)]
struct JobShared {
    job: Mutex<TrainingJob>,
    cancelled: AtomicBool,
}

/// Shared handle to a job, held by the session and the worker.
///
/// Every transition goes through the handle so the lifecycle rules hold no
/// matter which side observes an event first: `Pending -> Running ->
/// {Completed, Failed}`, terminal states are final, and progress only grows.
#[derive(Debug, Clone)]
pub struct JobHandle {
    shared: Arc<JobShared>,
}

impl JobHandle {
    pub fn new(request: TrainingRequest) -> Self {
        Self {
            shared: Arc::new(JobShared {
                job: Mutex::new(TrainingJob {
                    id: Uuid::new_v4(),
                    request,
                    status: JobStatus::Pending,
                    progress: 0.0,
                }),
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    fn job(&self) -> MutexGuard<'_, TrainingJob> {
        self.shared.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> Uuid {
        self.job().id
    }

    pub fn snapshot(&self) -> TrainingJob {
        self.job().clone()
    }

    pub fn status(&self) -> JobStatus {
        self.job().status.clone()
    }

    pub fn progress(&self) -> f64 {
        self.job().progress
    }

    /// `Pending` or `Running`
    pub fn is_active(&self) -> bool {
        !self.job().status.is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// `Pending -> Running`. Returns false if the job is no longer pending.
    pub fn mark_running(&self) -> bool {
        let mut job = self.job();
        if job.status == JobStatus::Pending && !self.is_cancelled() {
            job.status = JobStatus::Running;
            true
        } else {
            false
        }
    }

    /// Record progress while running.
    ///
    /// The value is clamped to `[0, 100]` and never moves backwards. Returns
    /// the stored progress, or `None` if the job is not running.
    pub fn advance(&self, percent: f64) -> Option<f64> {
        let mut job = self.job();
        if job.status != JobStatus::Running || self.is_cancelled() {
            return None;
        }
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        job.progress = job.progress.max(percent);
        Some(job.progress)
    }

    /// Move to `Completed`. Returns false if the job had already ended.
    pub fn complete(&self) -> bool {
        let mut job = self.job();
        if job.status.is_terminal() || self.is_cancelled() {
            return false;
        }
        job.status = JobStatus::Completed;
        job.progress = 100.0;
        true
    }

    /// Move to `Failed`. Returns false if the job had already ended.
    pub fn fail(&self, reason: FailureReason) -> bool {
        let mut job = self.job();
        if job.status.is_terminal() {
            return false;
        }
        job.status = JobStatus::Failed(reason);
        true
    }

    /// Best-effort cancellation; later progress and completion are ignored.
    ///
    /// Returns true if this call ended the job.
    pub fn cancel(&self) -> bool {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        self.fail(FailureReason::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TrainingRequest {
        TrainingRequest {
            agent_type: AgentSelector::QLearning,
            method: TrainingMethod::Teacher,
            episodes: Some(10),
            load_existing: false,
        }
    }

    #[test]
    fn test_method_from_wire() {
        assert_eq!(TrainingMethod::from_wire(None).unwrap(), TrainingMethod::SelfPlay);
        assert_eq!(
            TrainingMethod::from_wire(Some("teacher")).unwrap(),
            TrainingMethod::Teacher
        );
        assert_eq!(
            TrainingMethod::from_wire(Some("self-play")).unwrap(),
            TrainingMethod::SelfPlay
        );
        assert!(matches!(
            TrainingMethod::from_wire(Some("random")),
            Err(Error::InvalidTrainingRequest { .. })
        ));
    }

    #[test]
    fn test_lifecycle() {
        let job = JobHandle::new(request());
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.advance(10.0), None);

        assert!(job.mark_running());
        assert!(!job.mark_running());
        assert_eq!(job.advance(10.0), Some(10.0));
        assert_eq!(job.advance(5.0), Some(10.0));
        assert_eq!(job.advance(250.0), Some(100.0));

        assert!(job.complete());
        assert!(!job.complete());
        assert!(!job.fail(FailureReason::Error("late".into())));
        assert_eq!(job.status(), JobStatus::Completed);
        assert!(!job.is_active());
    }

    #[test]
    fn test_cancel_wins_over_late_completion() {
        let job = JobHandle::new(request());
        job.mark_running();
        assert!(job.cancel());

        assert_eq!(job.advance(50.0), None);
        assert!(!job.complete());
        assert_eq!(job.status(), JobStatus::Failed(FailureReason::Cancelled));
        assert!(!job.cancel());
    }

    #[test]
    fn test_clones_share_state() {
        let job = JobHandle::new(request());
        let other = job.clone();
        job.mark_running();
        other.advance(42.0);
        assert_eq!(job.progress(), 42.0);
        assert_eq!(job.id(), other.id());
    }
}
