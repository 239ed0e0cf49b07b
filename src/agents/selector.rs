//! Agent type selector shared by the wire protocol, CLI and persistence

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which agent plays `O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentSelector {
    /// `q`
    QLearning,
    /// `s`
    Sarsa,
    /// `v`
    ValueIteration,
    /// `p`
    PolicyIteration,
}

impl AgentSelector {
    pub const ALL: [AgentSelector; 4] = [
        AgentSelector::QLearning,
        AgentSelector::Sarsa,
        AgentSelector::ValueIteration,
        AgentSelector::PolicyIteration,
    ];

    /// Wire identifier
    pub fn as_str(self) -> &'static str {
        match self {
            AgentSelector::QLearning => "q",
            AgentSelector::Sarsa => "s",
            AgentSelector::ValueIteration => "v",
            AgentSelector::PolicyIteration => "p",
        }
    }

    /// File stem of the default save location (`{stem}_agent.msgpack`)
    pub fn file_stem(self) -> &'static str {
        match self {
            AgentSelector::QLearning => "q",
            AgentSelector::Sarsa => "sarsa",
            AgentSelector::ValueIteration => "v",
            AgentSelector::PolicyIteration => "p",
        }
    }

    /// Whether the agent learns from played games (as opposed to planning)
    pub fn is_tabular(self) -> bool {
        matches!(self, AgentSelector::QLearning | AgentSelector::Sarsa)
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AgentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "q" => Ok(AgentSelector::QLearning),
            "s" => Ok(AgentSelector::Sarsa),
            "v" => Ok(AgentSelector::ValueIteration),
            "p" => Ok(AgentSelector::PolicyIteration),
            other => Err(Error::UnknownAgent {
                input: other.to_string(),
                expected: Self::expected(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_wire_ids() {
        for selector in AgentSelector::ALL {
            assert_eq!(selector.as_str().parse::<AgentSelector>().unwrap(), selector);
        }
    }

    #[test]
    fn test_unknown_agent_lists_choices() {
        let err = "x".parse::<AgentSelector>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown agent type 'x'. Expected one of: q, s, v, p"
        );
    }

    #[test]
    fn test_sarsa_keeps_legacy_file_stem() {
        assert_eq!(AgentSelector::Sarsa.file_stem(), "sarsa");
        assert!(AgentSelector::Sarsa.is_tabular());
        assert!(!AgentSelector::PolicyIteration.is_tabular());
    }
}
