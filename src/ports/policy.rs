//! Agent policy port used by live game sessions.

use crate::{Result, agents::AgentSelector, tictactoe::Board};

/// Picks the agent's reply in a live game.
///
/// Contract: given a non-terminal board, return the `(row, col)` of an empty
/// cell. Sessions verify the reply and treat anything else as a policy
/// violation.
pub trait AgentPolicy: Send + Sync {
    /// Choose the agent's move on `board` for the configured agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the agent cannot be loaded or has no move.
    fn choose_move(&self, board: &Board, agent: AgentSelector) -> Result<(usize, usize)>;
}
