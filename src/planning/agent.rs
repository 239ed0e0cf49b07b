//! Agents that act from a precomputed plan

use serde::{Deserialize, Serialize};

use super::{
    mdp::{AgentMdp, ValueTable},
    policy_iteration::{PolicyTable, policy_iteration},
    value_iteration::value_iteration,
};
use crate::{
    Result,
    error::Error,
    ports::Learner,
    tictactoe::{Board, Mark, coords_of},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningMethod {
    ValueIteration,
    PolicyIteration,
}

impl PlanningMethod {
    pub fn name(self) -> &'static str {
        match self {
            PlanningMethod::ValueIteration => "Value Iteration",
            PlanningMethod::PolicyIteration => "Policy Iteration",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PlannedAgentState {
    pub method: PlanningMethod,
    pub gamma: f64,
    pub values: ValueTable,
    pub policy: PolicyTable,
}

/// Deterministic agent backed by a value table and, after policy iteration,
/// an explicit policy.
///
/// Boards outside the planned state space (for example when asked to move
/// for `X`) fall back to a one-step greedy lookahead over the value table.
#[derive(Debug, Clone)]
pub struct PlannedAgent {
    method: PlanningMethod,
    mdp: AgentMdp,
    values: ValueTable,
    policy: PolicyTable,
}

impl PlannedAgent {
    /// Create an agent with an empty plan. Call [`PlannedAgent::plan`] before use.
    pub fn new(method: PlanningMethod, gamma: f64) -> Self {
        Self {
            method,
            mdp: AgentMdp::new(gamma),
            values: ValueTable::new(),
            policy: PolicyTable::new(),
        }
    }

    /// Create and fully plan an agent.
    pub fn planned(method: PlanningMethod, gamma: f64) -> Result<Self> {
        let mut agent = Self::new(method, gamma);
        agent.plan(|_, _| Ok(()))?;
        Ok(agent)
    }

    pub fn method(&self) -> PlanningMethod {
        self.method
    }

    pub fn is_planned(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn value_of(&self, board: &Board) -> Option<f64> {
        self.values.get(&board.state_key()).copied()
    }

    /// Compute (or refine) the plan. Existing values and policy warm-start it.
    ///
    /// `on_step(step, limit)` is forwarded from the planner after every sweep
    /// or improvement round.
    pub fn plan<F>(&mut self, on_step: F) -> Result<usize>
    where
        F: FnMut(usize, usize) -> Result<()>,
    {
        let steps = match self.method {
            PlanningMethod::ValueIteration => {
                let steps = value_iteration(&self.mdp, &mut self.values, on_step)?;
                self.policy = self
                    .mdp
                    .states()
                    .iter()
                    .filter_map(|board| {
                        self.mdp
                            .greedy(board, &self.values)
                            .map(|(action, _)| (board.state_key(), action))
                    })
                    .collect();
                steps
            }
            PlanningMethod::PolicyIteration => {
                policy_iteration(&self.mdp, &mut self.policy, &mut self.values, on_step)?
            }
        };
        tracing::debug!(
            method = self.method.name(),
            steps,
            states = self.policy.len(),
            "planning finished"
        );
        Ok(steps)
    }

    pub(crate) fn export_state(&self) -> PlannedAgentState {
        PlannedAgentState {
            method: self.method,
            gamma: self.mdp.gamma(),
            values: self.values.clone(),
            policy: self.policy.clone(),
        }
    }

    pub(crate) fn from_state(state: PlannedAgentState) -> Self {
        Self {
            method: state.method,
            mdp: AgentMdp::new(state.gamma),
            values: state.values,
            policy: state.policy,
        }
    }
}

impl Learner for PlannedAgent {
    fn select_move(&mut self, board: &Board, _mark: Mark) -> Result<(usize, usize)> {
        let planned = self
            .policy
            .get(&board.state_key())
            .copied()
            .filter(|&action| board.empty_indices().contains(&action));
        let action = match planned {
            Some(action) => action,
            None => self
                .mdp
                .greedy(board, &self.values)
                .map(|(action, _)| action)
                .ok_or(Error::NoValidMoves)?,
        };
        Ok(coords_of(action))
    }

    fn name(&self) -> &str {
        self.method.name()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
