//! The production training task

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::job::{TrainingMethod, TrainingRequest};
use crate::{
    Result,
    agents::{AgentCatalog, AgentSelector, SavedAgent, TrainingMetadata},
    error::Error,
    pipeline::{Opponent, ReporterObserver, TrainingConfig, TrainingPipeline, TrainingResult},
    planning::{DEFAULT_TEACHER_LEVEL, Teacher},
    ports::{AgentRepository, Observer, ProgressReporter, TrainingTask},
};

/// Knobs for [`AgentTrainer`], filled from the `[training]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerSettings {
    /// Games played when a request does not say
    pub default_episodes: u64,
    /// Minimum progress step, in percent, between two reports
    pub progress_every: f64,
    /// Probability that the teacher plays its strategic move
    pub teacher_level: f64,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            default_episodes: 1000,
            progress_every: 1.0,
            teacher_level: DEFAULT_TEACHER_LEVEL,
            seed: None,
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub agent: AgentSelector,
    /// Who the agent trained against, or the planner that solved it
    pub opponent: String,
    /// Games played; zero for planners
    pub games: u64,
    /// Sweeps or improvement rounds; zero for tabular learners
    pub planning_steps: usize,
    /// Outcome tally, tabular learners only
    pub result: Option<TrainingResult>,
    /// Where the agent was saved
    pub saved_to: String,
}

/// Trains an agent, saves it and swaps it into the live catalog.
///
/// - `q`/`s` play `episodes` games against the [`Teacher`] or themselves.
/// - `v`/`p` run their planner; a loaded agent warm-starts it.
pub struct AgentTrainer {
    catalog: Arc<AgentCatalog>,
    settings: TrainerSettings,
}

impl AgentTrainer {
    pub fn new(catalog: Arc<AgentCatalog>, settings: TrainerSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    fn episodes(&self, request: &TrainingRequest) -> Result<u64> {
        match request.episodes.unwrap_or(self.settings.default_episodes) {
            0 => Err(Error::InvalidTrainingRequest {
                message: "episodes must be positive".to_string(),
            }),
            n => Ok(n),
        }
    }

    /// The saved agent to continue from, when the request asks for one.
    fn starting_point(&self, request: &TrainingRequest) -> Result<Option<SavedAgent>> {
        if !request.load_existing {
            return Ok(None);
        }
        let repository = self.catalog.repository();
        match repository.load(request.agent_type)? {
            Some(saved) => Ok(Some(saved)),
            None => Err(Error::MissingSavedAgent {
                agent: request.agent_type.to_string(),
                path: repository.describe(request.agent_type),
            }),
        }
    }

    /// Run `request` with the given observers, then save the agent.
    pub fn train_with<'a>(
        &self,
        request: &TrainingRequest,
        observers: Vec<Box<dyn Observer + 'a>>,
    ) -> Result<TrainingSummary> {
        let selector = request.agent_type;
        let episodes = self.episodes(request)?;
        let saved = self.starting_point(request)?;
        let config = TrainingConfig {
            num_games: usize::try_from(episodes).map_err(|_| Error::InvalidTrainingRequest {
                message: format!("episodes out of range: {episodes}"),
            })?,
            seed: self.settings.seed,
        };
        let mut pipeline = observers
            .into_iter()
            .fold(TrainingPipeline::new(config), TrainingPipeline::with_observer);
        let factory = self.catalog.factory();

        tracing::info!(
            agent = %selector,
            method = request.method.as_str(),
            episodes,
            load_existing = request.load_existing,
            "training started"
        );

        let (saved, summary) = if let Some(fresh) = factory.td_agent(selector) {
            let mut agent = match saved {
                Some(saved) => saved.into_td_agent()?,
                None => fresh,
            };
            let mut teacher = Teacher::new(self.settings.teacher_level);
            let opponent = match request.method {
                TrainingMethod::Teacher => Opponent::Scripted(&mut teacher),
                TrainingMethod::SelfPlay => Opponent::SelfPlay,
            };
            let opponent_name = opponent.name();
            let result = pipeline.run(&mut agent, opponent)?;

            let saved = SavedAgent::from_learner(
                selector,
                &agent,
                TrainingMetadata::new(episodes, opponent_name.clone()),
            )?;
            self.catalog.refresh(selector, Box::new(agent))?;
            (
                saved,
                TrainingSummary {
                    agent: selector,
                    opponent: opponent_name,
                    games: episodes,
                    planning_steps: 0,
                    result: Some(result),
                    saved_to: String::new(),
                },
            )
        } else {
            let mut agent = match saved {
                Some(saved) => saved.into_planned_agent()?,
                None => factory
                    .planned_agent(selector)
                    .ok_or_else(|| Error::TrainingFailed {
                        message: format!("no planner for agent '{selector}'"),
                    })?,
            };
            let steps = pipeline.plan(&mut agent)?;
            let planner = agent.method().name().to_string();

            let saved = SavedAgent::from_learner(
                selector,
                &agent,
                TrainingMetadata::new(steps as u64, planner.clone()),
            )?;
            self.catalog.refresh(selector, Box::new(agent))?;
            (
                saved,
                TrainingSummary {
                    agent: selector,
                    opponent: planner,
                    games: 0,
                    planning_steps: steps,
                    result: None,
                    saved_to: String::new(),
                },
            )
        };

        let repository = self.catalog.repository();
        repository.save(&saved)?;
        let summary = TrainingSummary {
            saved_to: repository.describe(selector),
            ..summary
        };
        tracing::info!(agent = %selector, saved_to = %summary.saved_to, "training finished");
        Ok(summary)
    }
}

impl TrainingTask for AgentTrainer {
    fn run(&self, request: &TrainingRequest, reporter: &mut dyn ProgressReporter) -> Result<()> {
        let observer = ReporterObserver::new(reporter, self.settings.progress_every);
        self.train_with(request, vec![Box::new(observer)])?;
        Ok(())
    }
}
