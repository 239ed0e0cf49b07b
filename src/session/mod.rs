//! Per-connection game sessions
//!
//! A connection owns exactly one [`Session`]: a lazily created game and at
//! most one training job. The [`SessionRegistry`] hands sessions out by
//! [`ConnectionId`] and tears them down on disconnect.

pub mod game;
pub mod registry;

pub use game::{GameStateMachine, MachineState, MoveReport};
pub use registry::{ConnectionId, Session, SessionRegistry, SharedSession};
