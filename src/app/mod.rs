//! Application layer with dependency injection container.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            Application Layer (app)           │
//! │   App ── owns ──> adapters                   │
//! │    │               - MsgPackRepository       │
//! │    │               - InMemoryRepository      │
//! │    │               - PngRewardsChart         │
//! │    │               - AgentTrainer            │
//! │    │                   │ implements          │
//! │    │                   ▼                     │
//! │    │              ports                      │
//! │    │               - AgentRepository         │
//! │    │               - RewardsChart            │
//! │    │               - TrainingTask            │
//! │    │               - AgentPolicy             │
//! │    ▼                                         │
//! │   services: EventRouter, RewardsQuery,       │
//! │             AgentCatalog, SessionRegistry    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use tictactoe_live::app::{App, AppConfig};
//!
//! let config = AppConfig::load(Path::new("tictactoe.toml"))?;
//! let app = App::new(config);
//! let rewards = app.rewards();
//! # Ok::<(), tictactoe_live::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::{AgentsConfig, AppConfig, ServerConfig};
pub use container::{App, AppBuilder};
