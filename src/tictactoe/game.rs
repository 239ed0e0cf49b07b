//! Turn, status and outcome vocabulary shared by sessions and training

use serde::{Deserialize, Serialize};

use super::board::{Board, Mark};

/// Whose turn it is in a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Player,
    Agent,
}

impl Turn {
    pub fn mark(self) -> Mark {
        match self {
            Turn::Player => Mark::PLAYER,
            Turn::Agent => Mark::AGENT,
        }
    }
}

/// A single placement.
///
/// Ephemeral: moves are validated and applied, never stored by sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub mark: Mark,
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Mark),
    Draw,
}

impl GameOutcome {
    /// Outcome of a board, or `None` while the game continues
    pub fn of(board: &Board) -> Option<GameOutcome> {
        if let Some(mark) = board.winner() {
            Some(GameOutcome::Win(mark))
        } else if board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }

    pub fn winner(self) -> Option<Mark> {
        match self {
            GameOutcome::Win(mark) => Some(mark),
            GameOutcome::Draw => None,
        }
    }

    /// Terminal reward from the point of view of `mark`: +1 win, -1 loss, 0 draw
    pub fn reward_for(self, mark: Mark) -> f64 {
        match self {
            GameOutcome::Win(winner) if winner == mark => 1.0,
            GameOutcome::Win(_) => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }
}

/// Status of a live game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    PlayerWon,
    AgentWon,
    Draw,
}

impl From<GameOutcome> for GameStatus {
    fn from(outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::Win(Mark::X) => GameStatus::PlayerWon,
            GameOutcome::Win(Mark::O) => GameStatus::AgentWon,
            GameOutcome::Draw => GameStatus::Draw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_of_open_board_is_none() {
        assert_eq!(GameOutcome::of(&Board::new()), None);
    }

    #[test]
    fn rewards_are_symmetric() {
        let win = GameOutcome::Win(Mark::O);
        assert_eq!(win.reward_for(Mark::O), 1.0);
        assert_eq!(win.reward_for(Mark::X), -1.0);
        assert_eq!(GameOutcome::Draw.reward_for(Mark::O), 0.0);
    }

    #[test]
    fn status_from_outcome() {
        assert_eq!(
            GameStatus::from(GameOutcome::Win(Mark::X)),
            GameStatus::PlayerWon
        );
        assert_eq!(GameStatus::from(GameOutcome::Draw), GameStatus::Draw);
    }
}
