//! Background training jobs
//!
//! A `start_training` request becomes a [`JobHandle`] stored in the
//! connection's session. The [`TrainingJobRunner`] executes the
//! [`TrainingTask`](crate::ports::TrainingTask) on the blocking pool and
//! streams progress back as events; [`AgentTrainer`] is the task used in
//! production.

pub mod job;
pub mod runner;
pub mod trainer;

pub use job::{FailureReason, JobHandle, JobStatus, TrainingJob, TrainingMethod, TrainingRequest};
pub use runner::TrainingJobRunner;
pub use trainer::{AgentTrainer, TrainerSettings, TrainingSummary};
