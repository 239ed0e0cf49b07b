//! Agent selection, persistence envelope and the live agent catalog

pub mod catalog;
pub mod selector;
pub mod serialization;

pub use catalog::{AgentCatalog, AgentFactory};
pub use selector::AgentSelector;
pub use serialization::{SavedAgent, TrainingMetadata};
