//! Q-learning and SARSA agents
//!
//! Both algorithms share one tabular agent; they differ only in the
//! bootstrap target used when an episode is replayed.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    ports::{Episode, Learner},
    q_learning::q_table::QTable,
    tictactoe::{Board, Mark, coords_of, index_of},
};

/// Temporal difference update rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TdAlgorithm {
    /// Off-policy: bootstraps from max_a' Q(s', a')
    QLearning,
    /// On-policy: bootstraps from the action actually taken next
    Sarsa,
}

impl TdAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            TdAlgorithm::QLearning => "Q-Learning",
            TdAlgorithm::Sarsa => "SARSA",
        }
    }
}

/// Hyper-parameters of a TD agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdParams {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Fractional decay of ε applied after every move selection
    pub epsilon_decay: f64,
}

impl Default for TdParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.1,
            epsilon_decay: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TdAgentState {
    pub algorithm: TdAlgorithm,
    pub q_table: QTable,
    pub params: TdParams,
    pub epsilon: f64,
    pub rewards: Vec<f64>,
    pub rng_seed: Option<u64>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// One decision the learning side made during an episode
struct Decision {
    state: String,
    action: usize,
    /// Board right before the move, used for legal successor actions
    board: Board,
}

/// Tabular TD agent (Q-learning or SARSA)
#[derive(Debug, Clone)]
pub struct TdAgent {
    algorithm: TdAlgorithm,
    q_table: QTable,
    params: TdParams,
    epsilon: f64,
    rewards: Vec<f64>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl TdAgent {
    pub fn new(algorithm: TdAlgorithm, params: TdParams) -> Self {
        Self {
            algorithm,
            q_table: QTable::new(params.alpha, params.gamma, 0.0),
            params,
            epsilon: params.epsilon,
            rewards: Vec::new(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn q_learning(params: TdParams) -> Self {
        Self::new(TdAlgorithm::QLearning, params)
    }

    pub fn sarsa(params: TdParams) -> Self {
        Self::new(TdAlgorithm::Sarsa, params)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn algorithm(&self) -> TdAlgorithm {
        self.algorithm
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub(crate) fn export_state(&self) -> TdAgentState {
        TdAgentState {
            algorithm: self.algorithm,
            q_table: self.q_table.clone(),
            params: self.params,
            epsilon: self.epsilon,
            rewards: self.rewards.clone(),
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: TdAgentState) -> Self {
        Self {
            algorithm: state.algorithm,
            q_table: state.q_table,
            params: state.params,
            epsilon: state.epsilon,
            rewards: state.rewards,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }

    /// ε-greedy action selection with uniform tie breaking among maximal actions
    fn select_action(&mut self, state: &str, legal: &[usize]) -> Result<usize> {
        let pool = if self.rng.random::<f64>() < self.epsilon {
            legal.to_vec()
        } else {
            self.q_table.greedy_actions(state, legal)
        };
        pool.choose(&mut self.rng).copied().ok_or(Error::NoValidMoves)
    }

    fn update(&mut self, current: &Decision, next: Option<&Decision>, reward: f64) {
        match self.algorithm {
            TdAlgorithm::QLearning => {
                let legal = next.map(|d| d.board.empty_indices()).unwrap_or_default();
                let successor = next.map(|d| (d.state.as_str(), legal.as_slice()));
                self.q_table
                    .q_learning_update(&current.state, current.action, reward, successor);
            }
            TdAlgorithm::Sarsa => {
                let successor = next.map(|d| (d.state.as_str(), d.action));
                self.q_table
                    .sarsa_update(&current.state, current.action, reward, successor);
            }
        }
        self.rewards.push(reward);
    }
}

impl Learner for TdAgent {
    fn select_move(&mut self, board: &Board, _mark: Mark) -> Result<(usize, usize)> {
        let legal = board.empty_indices();
        if legal.is_empty() {
            return Err(Error::NoValidMoves);
        }

        let action = self.select_action(&board.state_key(), &legal)?;
        self.epsilon *= 1.0 - self.params.epsilon_decay;
        Ok(coords_of(action))
    }

    /// Replay the episode from `role`'s side.
    ///
    /// Every decision is updated toward the state at the learner's next
    /// decision with reward 0; the last decision gets the terminal reward.
    fn learn(&mut self, episode: &Episode, role: Mark) -> Result<()> {
        let decisions: Vec<Decision> = episode
            .transitions()?
            .into_iter()
            .filter(|(_, mv)| mv.mark == role)
            .map(|(board, mv)| Decision {
                state: board.state_key(),
                action: index_of(mv.row, mv.col),
                board,
            })
            .collect();

        for pair in decisions.windows(2) {
            self.update(&pair[0], Some(&pair[1]), 0.0);
        }
        if let Some(last) = decisions.last() {
            self.update(last, None, episode.outcome.reward_for(role));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.algorithm.name()
    }

    fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
