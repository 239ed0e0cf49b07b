//! Q-table implementation for temporal difference learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Q-table mapping (state, action) pairs to Q-values
///
/// States are board state keys (see [`crate::tictactoe::Board::state_key`]),
/// actions are row-major cell indices. Unseen pairs read as `q_init`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values: (state_key, cell_index) -> Q-value
    q_values: HashMap<(String, usize), f64>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
    /// Initial Q-value for unseen state-action pairs
    q_init: f64,
}

impl QTable {
    /// Create a new Q-table
    pub fn new(learning_rate: f64, discount_factor: f64, q_init: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
            q_init,
        }
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: &str, action: usize) -> f64 {
        self.q_values
            .get(&(state.to_string(), action))
            .copied()
            .unwrap_or(self.q_init)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: &str, action: usize, value: f64) {
        self.q_values.insert((state.to_string(), action), value);
    }

    /// Get maximum Q-value over legal actions in a state
    pub fn max_q(&self, state: &str, legal_actions: &[usize]) -> f64 {
        legal_actions
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// All legal actions sharing the maximal Q-value, in the order given.
    pub fn greedy_actions(&self, state: &str, legal_actions: &[usize]) -> Vec<usize> {
        let best = self.max_q(state, legal_actions);
        legal_actions
            .iter()
            .copied()
            .filter(|&action| self.get(state, action) == best)
            .collect()
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// A terminal transition (`next` is `None`) uses Q(s,a) ← Q(s,a) + α[r - Q(s,a)].
    pub fn q_learning_update(
        &mut self,
        state: &str,
        action: usize,
        reward: f64,
        next: Option<(&str, &[usize])>,
    ) {
        let current_q = self.get(state, action);
        let bootstrap = match next {
            Some((next_state, legal)) if !legal.is_empty() => {
                self.discount_factor * self.max_q(next_state, legal)
            }
            _ => 0.0,
        };
        let td_error = reward + bootstrap - current_q;
        self.set(state, action, current_q + self.learning_rate * td_error);
    }

    /// SARSA update: on-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') - Q(s,a)]
    pub fn sarsa_update(
        &mut self,
        state: &str,
        action: usize,
        reward: f64,
        next: Option<(&str, usize)>,
    ) {
        let current_q = self.get(state, action);
        let bootstrap = match next {
            Some((next_state, next_action)) => {
                self.discount_factor * self.get(next_state, next_action)
            }
            None => 0.0,
        };
        let td_error = reward + bootstrap - current_q;
        self.set(state, action, current_q + self.learning_rate * td_error);
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }
}
