//! Value iteration over the agent MDP

use super::mdp::{AgentMdp, THETA, ValueTable};
use crate::Result;

/// Upper bound on sweeps; the game tree is shallow enough to converge well before it.
pub const MAX_SWEEPS: usize = crate::tictactoe::CELL_COUNT + 1;

/// Run in-place value iteration starting from `values`.
///
/// `on_sweep(sweep, MAX_SWEEPS)` is called after every sweep; an error from
/// it aborts the run. Returns the number of sweeps performed.
pub fn value_iteration<F>(mdp: &AgentMdp, values: &mut ValueTable, mut on_sweep: F) -> Result<usize>
where
    F: FnMut(usize, usize) -> Result<()>,
{
    for sweep in 1..=MAX_SWEEPS {
        let mut delta: f64 = 0.0;
        for board in mdp.states() {
            let Some((_, best)) = mdp.greedy(board, values) else {
                continue;
            };
            let key = board.state_key();
            let old = values.get(&key).copied().unwrap_or(0.0);
            delta = delta.max((best - old).abs());
            values.insert(key, best);
        }
        on_sweep(sweep, MAX_SWEEPS)?;
        if delta < THETA {
            return Ok(sweep);
        }
    }
    Ok(MAX_SWEEPS)
}
