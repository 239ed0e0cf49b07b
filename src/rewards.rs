//! Read-only rewards projection behind `GET /get_rewards/{agent}`

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    agents::{AgentSelector, SavedAgent},
    ports::{AgentRepository, RewardsChart},
};

/// Body returned when the agent has no recorded rewards
pub const NO_REWARDS_MESSAGE: &str = "No rewards data available";

/// JSON error body, `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RewardsResponse {
    /// Rendered chart of the cumulative reward
    Chart {
        content_type: &'static str,
        body: Vec<u8>,
    },
    /// Nothing to plot: no saved agent, or one without a reward history
    NoData,
}

impl RewardsResponse {
    pub fn no_data_body() -> ErrorBody {
        ErrorBody {
            error: NO_REWARDS_MESSAGE.to_string(),
        }
    }
}

/// Running total of `rewards`.
pub fn cumulative_sum(rewards: &[f64]) -> Vec<f64> {
    rewards
        .iter()
        .scan(0.0, |total, reward| {
            *total += reward;
            Some(*total)
        })
        .collect()
}

/// Resolves an agent id to its cumulative reward chart.
///
/// Stateless: each call reads the saved agent afresh.
#[derive(Clone)]
pub struct RewardsQuery {
    repository: Arc<dyn AgentRepository>,
    chart: Arc<dyn RewardsChart>,
}

impl RewardsQuery {
    pub fn new(repository: Arc<dyn AgentRepository>, chart: Arc<dyn RewardsChart>) -> Self {
        Self { repository, chart }
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownAgent`] for an unknown id and a render
    /// error if the chart cannot be produced. A save that cannot be read is
    /// treated like a fresh agent: no data.
    pub fn resolve(&self, agent_id: &str) -> Result<RewardsResponse> {
        let selector: AgentSelector = agent_id.parse()?;

        let loaded = self
            .repository
            .load(selector)
            .and_then(|saved| saved.map(SavedAgent::into_learner).transpose());
        let learner = match loaded {
            Ok(Some(learner)) => learner,
            Ok(None) => return Ok(RewardsResponse::NoData),
            Err(err) => {
                tracing::warn!(agent = %selector, error = %err, "could not load agent for rewards");
                return Ok(RewardsResponse::NoData);
            }
        };

        let rewards = learner.rewards();
        if rewards.is_empty() {
            return Ok(RewardsResponse::NoData);
        }
        tracing::debug!(agent = %selector, points = rewards.len(), "rendering rewards chart");
        Ok(RewardsResponse::Chart {
            content_type: self.chart.content_type(),
            body: self.chart.render(&cumulative_sum(rewards))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        Error,
        adapters::InMemoryRepository,
        agents::TrainingMetadata,
        ports::{Episode, Learner},
        q_learning::{TdAgent, TdParams},
        tictactoe::{GameOutcome, Mark, Move},
    };

    /// Captures the series instead of drawing it
    #[derive(Default)]
    struct CaptureChart(Mutex<Vec<f64>>);

    impl RewardsChart for CaptureChart {
        fn render(&self, cumulative: &[f64]) -> Result<Vec<u8>> {
            *self.0.lock().unwrap() = cumulative.to_vec();
            Ok(b"chart".to_vec())
        }
    }

    fn query(repo: &InMemoryRepository) -> (RewardsQuery, Arc<CaptureChart>) {
        let chart = Arc::new(CaptureChart::default());
        let query = RewardsQuery::new(Arc::new(repo.clone()), chart.clone());
        (query, chart)
    }

    #[test]
    fn test_cumulative_sum() {
        assert_eq!(cumulative_sum(&[0.0, 1.0, -1.0, 1.0]), vec![0.0, 1.0, 0.0, 1.0]);
        assert!(cumulative_sum(&[]).is_empty());
    }

    #[test]
    fn test_unknown_agent_is_validation_error() {
        let (query, _) = query(&InMemoryRepository::new());
        let err = query.resolve("z").unwrap_err();
        assert!(matches!(err, Error::UnknownAgent { .. }));
    }

    #[test]
    fn test_missing_or_corrupt_agent_has_no_data() {
        let repo = InMemoryRepository::new();
        let (query, _) = query(&repo);
        assert_eq!(query.resolve("q").unwrap(), RewardsResponse::NoData);

        repo.insert_raw(AgentSelector::Sarsa, vec![0x00, 0x01]);
        assert_eq!(query.resolve("s").unwrap(), RewardsResponse::NoData);
    }

    #[test]
    fn test_chart_gets_cumulative_rewards() {
        let repo = InMemoryRepository::new();
        let mut agent = TdAgent::q_learning(TdParams::default());
        let episode = Episode {
            first: Mark::X,
            moves: vec![
                Move { row: 0, col: 0, mark: Mark::X },
                Move { row: 1, col: 1, mark: Mark::O },
                Move { row: 0, col: 1, mark: Mark::X },
                Move { row: 2, col: 2, mark: Mark::O },
                Move { row: 0, col: 2, mark: Mark::X },
            ],
            outcome: GameOutcome::Win(Mark::X),
        };
        agent.learn(&episode, Mark::O).unwrap();
        let saved =
            SavedAgent::from_learner(AgentSelector::QLearning, &agent, TrainingMetadata::default())
                .unwrap();
        repo.save(&saved).unwrap();

        let (query, chart) = query(&repo);
        let response = query.resolve("q").unwrap();

        assert_eq!(
            response,
            RewardsResponse::Chart {
                content_type: "image/png",
                body: b"chart".to_vec()
            }
        );
        // One intermediate update, then the loss
        assert_eq!(*chart.0.lock().unwrap(), vec![0.0, -1.0]);
    }
}
