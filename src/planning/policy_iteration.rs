//! Policy iteration over the agent MDP

use std::collections::HashMap;

use super::mdp::{AgentMdp, THETA, ValueTable};
use crate::Result;

/// Chosen cell index per board state key
pub type PolicyTable = HashMap<String, usize>;

/// Upper bound on evaluate/improve rounds.
pub const MAX_IMPROVEMENTS: usize = crate::tictactoe::CELL_COUNT + 1;

const MAX_EVALUATION_SWEEPS: usize = crate::tictactoe::CELL_COUNT + 1;

/// Iterative evaluation of a fixed policy, in place.
fn evaluate(mdp: &AgentMdp, policy: &PolicyTable, values: &mut ValueTable) {
    for _ in 0..MAX_EVALUATION_SWEEPS {
        let mut delta: f64 = 0.0;
        for board in mdp.states() {
            let key = board.state_key();
            let Some(&action) = policy.get(&key) else {
                continue;
            };
            let value = mdp.action_value(board, action, values);
            let old = values.get(&key).copied().unwrap_or(0.0);
            delta = delta.max((value - old).abs());
            values.insert(key, value);
        }
        if delta < THETA {
            return;
        }
    }
}

/// Run policy iteration, continuing from `policy` and `values` when non-empty.
///
/// States missing from `policy` start at their lowest empty cell. A state's
/// action only changes when another one is strictly better, so the loop ends
/// once the policy is stable. `on_round(round, MAX_IMPROVEMENTS)` is called
/// after every improvement step. Returns the number of rounds.
pub fn policy_iteration<F>(
    mdp: &AgentMdp,
    policy: &mut PolicyTable,
    values: &mut ValueTable,
    mut on_round: F,
) -> Result<usize>
where
    F: FnMut(usize, usize) -> Result<()>,
{
    for board in mdp.states() {
        if let Some(&first) = board.empty_indices().first() {
            policy.entry(board.state_key()).or_insert(first);
        }
    }

    for round in 1..=MAX_IMPROVEMENTS {
        evaluate(mdp, policy, values);

        let mut stable = true;
        for board in mdp.states() {
            let key = board.state_key();
            let (Some(&current), Some((best, best_value))) =
                (policy.get(&key), mdp.greedy(board, values))
            else {
                continue;
            };
            if best != current && best_value > mdp.action_value(board, current, values) + THETA {
                policy.insert(key, best);
                stable = false;
            }
        }

        on_round(round, MAX_IMPROVEMENTS)?;
        if stable {
            return Ok(round);
        }
    }
    Ok(MAX_IMPROVEMENTS)
}
