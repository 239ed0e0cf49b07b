//! Repository port for agent persistence.

use crate::{Result, agents::AgentSelector, agents::SavedAgent};

/// Port for persisting and loading trained agents, one slot per agent type.
///
/// # Examples
///
/// ```no_run
/// use tictactoe_live::ports::AgentRepository;
/// use tictactoe_live::agents::AgentSelector;
///
/// fn has_trained_q_agent(repo: &dyn AgentRepository) -> bool {
///     repo.exists(AgentSelector::QLearning)
/// }
/// ```
pub trait AgentRepository: Send + Sync {
    /// Save an agent into the slot of `agent.selector`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    fn save(&self, agent: &SavedAgent) -> Result<()>;

    /// Load the saved agent for `selector`, or `None` when nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read or decoded.
    fn load(&self, selector: AgentSelector) -> Result<Option<SavedAgent>>;

    /// Whether an agent is saved for `selector`.
    fn exists(&self, selector: AgentSelector) -> bool;

    /// Human-readable location of the slot, used in error messages.
    fn describe(&self, selector: AgentSelector) -> String;
}
