//! Live tic-tac-toe against reinforcement-learning agents
//!
//! This crate provides:
//! - Tic-tac-toe rules and a per-connection game state machine
//! - Q-learning and SARSA agents, value and policy iteration planners
//! - Background training jobs with progress reporting and cancellation
//! - A WebSocket event protocol and a cumulative-rewards chart endpoint
//! - A CLI for serving, offline training and terminal play

pub mod adapters;
pub mod agents;
pub mod app;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod planning;
pub mod ports;
pub mod protocol;
pub mod q_learning;
pub mod rewards;
pub mod server;
pub mod session;
pub mod tictactoe;
pub mod training;

pub use error::{Error, ErrorKind, Result};
