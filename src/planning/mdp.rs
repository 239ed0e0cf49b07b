//! The agent's decision problem as a finite MDP.
//!
//! States are the non-terminal boards on which `O` is to move, whichever side
//! opened. After the agent's move the player answers uniformly at random, so
//! each action leads to a small distribution of successor states.

use std::collections::{HashMap, HashSet};

use crate::tictactoe::{Board, GameOutcome, Mark};

/// State values keyed by board state key
pub type ValueTable = HashMap<String, f64>;

/// Convergence threshold on the largest value change of a sweep
pub const THETA: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct AgentMdp {
    gamma: f64,
    states: Vec<Board>,
}

impl AgentMdp {
    /// Enumerate every reachable board with `O` to move.
    pub fn new(gamma: f64) -> Self {
        let mut seen = HashSet::new();
        let mut states = Vec::new();
        for opener in [Mark::X, Mark::O] {
            collect_agent_states(Board::new(), opener, &mut seen, &mut states);
        }
        Self { gamma, states }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn states(&self) -> &[Board] {
        &self.states
    }

    /// Expected return of placing `O` at `action` on `board`.
    ///
    /// Immediate rewards are +1 for an agent win, −1 for a player win and 0
    /// otherwise; continuing states are discounted by γ.
    pub fn action_value(&self, board: &Board, action: usize, values: &ValueTable) -> f64 {
        let Ok(after_agent) = board.with_mark(action, Mark::AGENT) else {
            return f64::NEG_INFINITY;
        };
        if let Some(outcome) = GameOutcome::of(&after_agent) {
            return outcome.reward_for(Mark::AGENT);
        }

        let replies = after_agent.empty_indices();
        let total: f64 = replies
            .iter()
            .filter_map(|&reply| after_agent.with_mark(reply, Mark::PLAYER).ok())
            .map(|next| match GameOutcome::of(&next) {
                Some(outcome) => outcome.reward_for(Mark::AGENT),
                None => self.gamma * values.get(&next.state_key()).copied().unwrap_or(0.0),
            })
            .sum();
        total / replies.len() as f64
    }

    /// Best action and its value; ties go to the lowest cell index.
    pub fn greedy(&self, board: &Board, values: &ValueTable) -> Option<(usize, f64)> {
        board
            .empty_indices()
            .into_iter()
            .map(|action| (action, self.action_value(board, action, values)))
            .fold(None, |best, (action, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((action, value)),
            })
    }
}

fn collect_agent_states(
    board: Board,
    to_move: Mark,
    seen: &mut HashSet<(Board, Mark)>,
    states: &mut Vec<Board>,
) {
    if board.is_terminal() || !seen.insert((board, to_move)) {
        return;
    }
    if to_move == Mark::AGENT {
        states.push(board);
    }
    for index in board.empty_indices() {
        if let Ok(next) = board.with_mark(index, to_move) {
            collect_agent_states(next, to_move.opponent(), seen, states);
        }
    }
}
