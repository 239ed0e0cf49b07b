//! Per-connection game state machine
//!
//! ```text
//! InProgress(Player) --player move--> InProgress(Agent) --agent move--> InProgress(Player)
//!         |                                   |
//!         +--- win / full board ---> Terminal <--- win / full board
//! ```
//!
//! A player move and the agent's reply form one step: the agent's move is
//! requested from the policy before [`GameStateMachine::apply_player_move`]
//! returns.

use crate::{
    Result,
    agents::AgentSelector,
    error::Error,
    ports::AgentPolicy,
    tictactoe::{BOARD_SIZE, Board, GameOutcome, GameStatus, Mark, Move, Turn, checked_coords},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    InProgress(Turn),
    Terminal(GameOutcome),
}

/// What one successful player step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub player_move: Move,
    /// Absent when the player's move ended the game
    pub agent_move: Option<Move>,
    /// Set once the game is over
    pub outcome: Option<GameOutcome>,
}

#[derive(Debug, Clone)]
pub struct GameStateMachine {
    board: Board,
    state: MachineState,
    agent: AgentSelector,
}

impl GameStateMachine {
    pub fn new(agent: AgentSelector) -> Self {
        Self {
            board: Board::new(),
            state: MachineState::InProgress(Turn::Player),
            agent,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn agent(&self) -> AgentSelector {
        self.agent
    }

    pub fn status(&self) -> GameStatus {
        match self.state {
            MachineState::InProgress(_) => GameStatus::InProgress,
            MachineState::Terminal(outcome) => outcome.into(),
        }
    }

    /// Whose turn it is, or `None` once the game is over
    pub fn turn(&self) -> Option<Turn> {
        match self.state {
            MachineState::InProgress(turn) => Some(turn),
            MachineState::Terminal(_) => None,
        }
    }

    /// Start over with an empty board and the given agent.
    pub fn reset(&mut self, agent: AgentSelector) {
        self.board = Board::new();
        self.state = MachineState::InProgress(Turn::Player);
        self.agent = agent;
    }

    /// Place the player's `X` and, unless that ends the game, the agent's reply.
    ///
    /// # Errors
    ///
    /// - [`Error::GameOver`] once the game has ended
    /// - [`Error::NotPlayerTurn`] while the agent is to move
    /// - [`Error::InvalidCell`] / [`Error::CellOccupied`] for a bad target
    ///
    /// These leave the machine untouched. A failing or misbehaving policy
    /// resets the game (same agent) and returns [`Error::AgentPolicyFailed`]
    /// or [`Error::AgentPolicyViolation`].
    pub fn apply_player_move(
        &mut self,
        row: i64,
        col: i64,
        policy: &dyn AgentPolicy,
    ) -> Result<MoveReport> {
        match self.state {
            MachineState::Terminal(_) => return Err(Error::GameOver),
            MachineState::InProgress(Turn::Agent) => return Err(Error::NotPlayerTurn),
            MachineState::InProgress(Turn::Player) => {}
        }

        let (row, col) = checked_coords(row, col)?;
        self.board.place(row, col, Mark::PLAYER)?;
        let player_move = Move {
            row,
            col,
            mark: Mark::PLAYER,
        };

        if let Some(outcome) = GameOutcome::of(&self.board) {
            self.state = MachineState::Terminal(outcome);
            return Ok(MoveReport {
                player_move,
                agent_move: None,
                outcome: Some(outcome),
            });
        }

        self.state = MachineState::InProgress(Turn::Agent);
        let choice = match policy.choose_move(&self.board, self.agent) {
            Ok(choice) => choice,
            Err(err) => {
                let agent = self.agent;
                tracing::error!(%agent, error = %err, "agent policy failed, resetting game");
                self.reset(agent);
                return Err(Error::AgentPolicyFailed {
                    agent: agent.to_string(),
                    message: err.to_string(),
                });
            }
        };

        let (agent_move, outcome) = self.apply_agent_move(choice.0, choice.1)?;
        Ok(MoveReport {
            player_move,
            agent_move: Some(agent_move),
            outcome,
        })
    }

    fn apply_agent_move(&mut self, row: usize, col: usize) -> Result<(Move, Option<GameOutcome>)> {
        let legal = row < BOARD_SIZE && col < BOARD_SIZE && self.board.place(row, col, Mark::AGENT).is_ok();
        if !legal {
            let agent = self.agent;
            tracing::error!(%agent, row, col, "agent policy chose an illegal cell, resetting game");
            self.reset(agent);
            return Err(Error::AgentPolicyViolation {
                agent: agent.to_string(),
                row: i64::try_from(row).unwrap_or(i64::MAX),
                col: i64::try_from(col).unwrap_or(i64::MAX),
            });
        }

        let agent_move = Move {
            row,
            col,
            mark: Mark::AGENT,
        };
        let outcome = GameOutcome::of(&self.board);
        self.state = match outcome {
            Some(outcome) => MachineState::Terminal(outcome),
            None => MachineState::InProgress(Turn::Player),
        };
        Ok((agent_move, outcome))
    }
}
