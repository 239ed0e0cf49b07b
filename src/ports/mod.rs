//! Ports (trait boundaries) for external collaborators.
//!
//! The session core talks to agents, training, persistence and chart
//! rendering only through these traits; adapters and agent modules provide
//! the implementations.

pub mod learner;
pub mod observer;
pub mod policy;
pub mod repository;
pub mod rewards;
pub mod training;

pub use learner::{Episode, Learner};
pub use observer::Observer;
pub use policy::AgentPolicy;
pub use repository::AgentRepository;
pub use rewards::RewardsChart;
pub use training::{ProgressReporter, TrainingTask};
