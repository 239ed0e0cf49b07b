//! Q-learning and SARSA temporal difference learning
//!
//! Tabular agents keyed by the raw board state key. The agent always learns
//! online from its own moves: every decision is pulled toward the value of
//! the state at its next decision, and the last one toward the final reward.
//!
//! ## Key Differences
//!
//! | Aspect | Q-learning | SARSA |
//! |--------|------------|-------|
//! | Policy | Off-policy (learns Q*) | On-policy (learns Q^π) |
//! | Update | Uses max_a Q(s',a') | Uses actual Q(s',a') |
//!
//! ## Usage Example
//!
//! ```no_run
//! use tictactoe_live::q_learning::{TdAgent, TdParams};
//!
//! let q_agent = TdAgent::q_learning(TdParams::default()).with_seed(7);
//! let sarsa_agent = TdAgent::sarsa(TdParams {
//!     epsilon: 0.2,
//!     ..TdParams::default()
//! });
//! ```

pub mod agent;
pub mod q_table;

pub use agent::{TdAgent, TdAlgorithm, TdParams};
pub(crate) use agent::TdAgentState;
pub use q_table::QTable;
