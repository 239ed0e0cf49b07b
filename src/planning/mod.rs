//! Model-based agents and the scripted teacher
//!
//! The planners solve the agent's side of the game exactly against a player
//! who moves uniformly at random:
//!
//! - **Value iteration** sweeps Bellman optimality backups until the values
//!   stop changing, then reads the policy off greedily.
//! - **Policy iteration** alternates policy evaluation and greedy
//!   improvement until no state changes its action.

pub mod agent;
pub mod mdp;
pub mod policy_iteration;
pub mod teacher;
pub mod value_iteration;

pub use agent::{PlannedAgent, PlanningMethod};
pub(crate) use agent::PlannedAgentState;
pub use mdp::{AgentMdp, ValueTable};
pub use policy_iteration::PolicyTable;
pub use teacher::{DEFAULT_TEACHER_LEVEL, Teacher};
