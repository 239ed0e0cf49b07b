//! Agent serialization support
//!
//! A [`SavedAgent`] is the versioned envelope written by the repositories.

use serde::{Deserialize, Serialize};

use super::selector::AgentSelector;
use crate::{
    Result,
    error::Error,
    planning::{PlannedAgent, PlannedAgentState},
    ports::Learner,
    q_learning::{TdAgent, TdAgentState},
};

/// Serializable representation of a trained agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    /// Version of the save format
    pub version: u32,
    /// Slot the agent belongs to
    pub selector: AgentSelector,
    /// Learned state
    state: AgentState,
    /// Training metadata
    pub metadata: TrainingMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AgentState {
    Td(TdAgentState),
    Planned(PlannedAgentState),
}

/// Metadata about the training process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of games (or planning steps) in the last run
    pub games_trained: Option<u64>,
    /// Opponent(s) trained against
    pub opponents: Vec<String>,
    /// RFC 3339 timestamp when saved
    pub saved_at: Option<String>,
}

impl TrainingMetadata {
    pub fn new(games_trained: u64, opponent: impl Into<String>) -> Self {
        Self {
            games_trained: Some(games_trained),
            opponents: vec![opponent.into()],
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

impl SavedAgent {
    /// Current save format version
    pub const VERSION: u32 = 1;

    /// Snapshot a learner for the given slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SavedAgentMismatch`] if the learner is not the kind of
    /// agent `selector` stores.
    pub fn from_learner(
        selector: AgentSelector,
        learner: &dyn Learner,
        metadata: TrainingMetadata,
    ) -> Result<Self> {
        let any = learner.as_any();
        let state = match selector {
            AgentSelector::QLearning | AgentSelector::Sarsa => any
                .downcast_ref::<TdAgent>()
                .map(|agent| AgentState::Td(agent.export_state())),
            AgentSelector::ValueIteration | AgentSelector::PolicyIteration => any
                .downcast_ref::<PlannedAgent>()
                .map(|agent| AgentState::Planned(agent.export_state())),
        }
        .ok_or_else(|| Error::SavedAgentMismatch {
            found: learner.name().to_string(),
            expected: selector.to_string(),
        })?;

        Ok(Self {
            version: Self::VERSION,
            selector,
            state,
            metadata,
        })
    }

    fn check_version(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedSaveVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(())
    }

    fn mismatch(&self) -> Error {
        Error::SavedAgentMismatch {
            found: self.state.kind().to_string(),
            expected: self.selector.to_string(),
        }
    }

    /// Reconstruct a Q-learning or SARSA agent.
    pub fn into_td_agent(self) -> Result<TdAgent> {
        self.check_version()?;
        if !self.selector.is_tabular() {
            return Err(self.mismatch());
        }
        match self.state {
            AgentState::Td(state) => Ok(TdAgent::from_state(state)),
            AgentState::Planned(_) => Err(Error::SavedAgentMismatch {
                found: "planned".to_string(),
                expected: self.selector.to_string(),
            }),
        }
    }

    /// Reconstruct a value- or policy-iteration agent.
    pub fn into_planned_agent(self) -> Result<PlannedAgent> {
        self.check_version()?;
        if self.selector.is_tabular() {
            return Err(self.mismatch());
        }
        match self.state {
            AgentState::Planned(state) => Ok(PlannedAgent::from_state(state)),
            AgentState::Td(_) => Err(Error::SavedAgentMismatch {
                found: "td".to_string(),
                expected: self.selector.to_string(),
            }),
        }
    }

    /// Reconstruct the learner.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown format version or a state that does
    /// not match the slot.
    pub fn into_learner(self) -> Result<Box<dyn Learner>> {
        if self.selector.is_tabular() {
            Ok(Box::new(self.into_td_agent()?))
        } else {
            Ok(Box::new(self.into_planned_agent()?))
        }
    }
}

impl AgentState {
    fn kind(&self) -> &'static str {
        match self {
            AgentState::Td(_) => "td",
            AgentState::Planned(_) => "planned",
        }
    }
}
