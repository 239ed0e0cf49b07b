//! Background execution of training jobs

use std::sync::Arc;

use super::job::{FailureReason, JobHandle, TrainingRequest};
use crate::{
    Result,
    error::Error,
    ports::{ProgressReporter, TrainingTask},
    protocol::{EventSink, OutboundEvent},
};

/// Starts training tasks off the async runtime and streams their progress.
///
/// Each job runs its task on the blocking pool. Progress reports become
/// `training_progress` events; the end of the task becomes exactly one of
/// `training_complete` or `training_error`, unless the job was cancelled,
/// in which case nothing more is sent.
#[derive(Clone)]
pub struct TrainingJobRunner {
    task: Arc<dyn TrainingTask>,
}

impl TrainingJobRunner {
    pub fn new(task: Arc<dyn TrainingTask>) -> Self {
        Self { task }
    }

    /// Start a job in `slot`, the connection's single job slot.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobAlreadyRunning`] if the slot holds a job that has
    /// not finished; the running job is left alone.
    pub fn start(
        &self,
        slot: &mut Option<JobHandle>,
        request: TrainingRequest,
        sink: EventSink,
    ) -> Result<JobHandle> {
        if slot.as_ref().is_some_and(JobHandle::is_active) {
            return Err(Error::JobAlreadyRunning);
        }

        let job = JobHandle::new(request);
        *slot = Some(job.clone());
        tracing::info!(
            job = %job.id(),
            agent = %job.snapshot().request.agent_type,
            "training job accepted"
        );

        tokio::spawn(drive(Arc::clone(&self.task), job.clone(), sink));
        Ok(job)
    }

    /// Best-effort cancellation. Returns true if this call ended the job.
    pub fn cancel(job: &JobHandle) -> bool {
        let cancelled = job.cancel();
        if cancelled {
            tracing::info!(job = %job.id(), "training job cancelled");
        }
        cancelled
    }
}

async fn drive(task: Arc<dyn TrainingTask>, job: JobHandle, sink: EventSink) {
    if !job.mark_running() {
        return;
    }
    let request = job.snapshot().request;

    let mut reporter = JobReporter {
        job: job.clone(),
        sink: sink.clone(),
    };
    let outcome =
        tokio::task::spawn_blocking(move || task.run(&request, &mut reporter)).await;

    let terminal = match outcome {
        Ok(Ok(())) => job.complete().then_some(OutboundEvent::TrainingComplete {}),
        Ok(Err(Error::Cancelled)) => {
            job.cancel();
            None
        }
        Ok(Err(err)) => {
            tracing::warn!(job = %job.id(), error = %err, "training job failed");
            job.fail(FailureReason::Error(err.to_string()))
                .then(|| OutboundEvent::TrainingError {
                    message: err.public_message(),
                })
        }
        Err(join_err) => {
            tracing::error!(job = %job.id(), error = %join_err, "training task panicked");
            job.fail(FailureReason::Error("training task panicked".to_string()))
                .then(|| OutboundEvent::TrainingError {
                    message: "training task panicked".to_string(),
                })
        }
    };

    match terminal {
        Some(event) => {
            tracing::info!(job = %job.id(), status = ?job.status(), "training job finished");
            // The connection may already be gone; nothing left to tell it then.
            let _ = sink.send(event);
        }
        None => tracing::debug!(job = %job.id(), "training job ended after cancellation"),
    }
}

/// Bridges a task's progress into the job and out to the connection.
struct JobReporter {
    job: JobHandle,
    sink: EventSink,
}

impl ProgressReporter for JobReporter {
    fn report(&mut self, percent: f64, message: &str) -> Result<()> {
        let progress = self.job.advance(percent).ok_or(Error::Cancelled)?;
        let event = OutboundEvent::TrainingProgress {
            progress,
            message: message.to_string(),
        };
        if self.sink.send(event).is_err() {
            // Receiver dropped: the connection is closing.
            self.job.cancel();
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
