//! Training pipeline abstractions
//!
//! This module provides a composable pipeline for training a learner against
//! the teacher or itself, running the planners, and observing progress.

pub mod observers;
pub mod training;

pub use observers::{ProgressObserver, ReporterObserver};
pub use training::{Opponent, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::{Learner, Observer};
