//! Observer port - training event hooks
//!
//! Observers are composed onto a training pipeline to collect metrics,
//! draw progress bars or forward job progress without coupling the training
//! loop to any of them.

use crate::{Result, tictactoe::GameOutcome};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total)` - once, with the number of work units
/// 2. For each game: `on_game_end(game_num, outcome)`; planners instead call
///    `on_iteration(iteration, limit)` once per sweep
/// 3. `on_training_end()` - once, only when training ran to completion
///
/// Returning an error from any hook aborts training with that error.
pub trait Observer: Send {
    fn on_training_start(&mut self, _total: usize) -> Result<()> {
        Ok(())
    }

    /// Called after game `game_num` (0-based) finished and the agent learned.
    fn on_game_end(&mut self, _game_num: usize, _outcome: GameOutcome) -> Result<()> {
        Ok(())
    }

    /// Called after planning iteration `iteration` (1-based) of at most `limit`.
    fn on_iteration(&mut self, _iteration: usize, _limit: usize) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
