//! Training task port - the long-running job behind `start_training`.

use crate::{Result, training::TrainingRequest};

/// Receives fractional progress from a running training task.
pub trait ProgressReporter: Send {
    /// Report `percent` complete (0-100) with a status message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Cancelled`] once the job has been cancelled;
    /// tasks should propagate it and stop.
    fn report(&mut self, percent: f64, message: &str) -> Result<()>;
}

/// A training run executed on a background worker.
///
/// Implementations block; the job runner moves them off the async runtime.
pub trait TrainingTask: Send + Sync {
    /// Run the task to completion, reporting progress along the way.
    ///
    /// # Errors
    ///
    /// Any error fails the job; [`crate::Error::Cancelled`] marks it cancelled.
    fn run(&self, request: &TrainingRequest, reporter: &mut dyn ProgressReporter) -> Result<()>;
}
