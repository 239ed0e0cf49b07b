//! Learner port - abstraction over every agent that can pick a move
//!
//! Tabular learners (Q-learning, SARSA), planners (value and policy
//! iteration) and the scripted teacher all implement this trait, so the
//! training pipeline and live sessions can drive any of them.

use crate::{
    Result,
    tictactoe::{Board, GameOutcome, Mark, Move},
};

/// A finished training game, replayed by learners at the end of the episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Mark that made the first move
    pub first: Mark,
    /// Placements in play order
    pub moves: Vec<Move>,
    /// Final outcome
    pub outcome: GameOutcome,
}

impl Episode {
    /// Boards seen before each move, paired with the move played from them.
    pub fn transitions(&self) -> Result<Vec<(Board, Move)>> {
        let mut board = Board::new();
        let mut steps = Vec::with_capacity(self.moves.len());
        for mv in &self.moves {
            steps.push((board, *mv));
            board.place(mv.row, mv.col, mv.mark)?;
        }
        Ok(steps)
    }
}

/// Learner trait - unified interface for all agents
///
/// # Examples
///
/// ```no_run
/// use tictactoe_live::{
///     ports::Learner,
///     tictactoe::{Board, Mark},
/// };
///
/// fn opening_move(agent: &mut dyn Learner) -> tictactoe_live::Result<(usize, usize)> {
///     agent.select_move(&Board::new(), Mark::O)
/// }
/// ```
pub trait Learner: Send {
    /// Select an empty cell for `mark` on the given board.
    ///
    /// # Errors
    ///
    /// Returns an error if no empty cell is available.
    fn select_move(&mut self, board: &Board, mark: Mark) -> Result<(usize, usize)>;

    /// Update the learner after a training game in which it played `role`.
    ///
    /// Non-adaptive agents keep the default no-op.
    fn learn(&mut self, _episode: &Episode, _role: Mark) -> Result<()> {
        Ok(())
    }

    /// Get the learner's name, used in logs and summaries.
    fn name(&self) -> &str;

    /// Reward history recorded while learning, oldest first.
    fn rewards(&self) -> &[f64] {
        &[]
    }

    /// Seed the learner's internal random number generator.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }

    /// Enable downcasting to concrete types (used for persistence).
    fn as_any(&self) -> &dyn std::any::Any;
}
