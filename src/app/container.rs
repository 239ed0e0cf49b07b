//! Dependency injection container
//!
//! The [`App`] owns the infrastructure (agent repository, chart renderer,
//! training task) and hands out the services built on top of it: the agent
//! catalog, the event router and the rewards query.

use std::sync::Arc;

use super::config::AppConfig;
use crate::{
    adapters::{MsgPackRepository, PngRewardsChart},
    agents::AgentCatalog,
    ports::{AgentPolicy, AgentRepository, RewardsChart, TrainingTask},
    protocol::EventRouter,
    rewards::RewardsQuery,
    session::SessionRegistry,
    training::{AgentTrainer, TrainingJobRunner},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use tictactoe_live::app::{App, AppConfig};
///
/// let app = App::new(AppConfig::default());
/// let router = app.router();
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use tictactoe_live::adapters::InMemoryRepository;
/// use tictactoe_live::app::App;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// assert_eq!(app.config().training.seed, Some(42));
/// ```
pub struct App {
    config: AppConfig,
    repository: Arc<dyn AgentRepository>,
    chart: Arc<dyn RewardsChart>,
    catalog: Arc<AgentCatalog>,
    registry: Arc<SessionRegistry>,
    task: Arc<dyn TrainingTask>,
}

impl App {
    /// Create an app with production adapters: MessagePack files under
    /// `config.agents.directory` and PNG charts.
    pub fn new(config: AppConfig) -> Self {
        AppBuilder::new().with_config(config).build()
    }

    /// Create a builder for constructing the app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> Arc<dyn AgentRepository> {
        Arc::clone(&self.repository)
    }

    pub fn catalog(&self) -> Arc<AgentCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Trainer sharing this app's catalog, for the CLI.
    pub fn trainer(&self) -> AgentTrainer {
        AgentTrainer::new(self.catalog(), self.config.training)
    }

    /// Router for live connections.
    pub fn router(&self) -> EventRouter {
        let policy: Arc<dyn AgentPolicy> = self.catalog();
        EventRouter::new(
            self.registry(),
            policy,
            TrainingJobRunner::new(Arc::clone(&self.task)),
        )
    }

    pub fn rewards(&self) -> RewardsQuery {
        RewardsQuery::new(self.repository(), Arc::clone(&self.chart))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// Anything not set falls back to the production adapter.
#[derive(Default)]
pub struct AppBuilder {
    config: AppConfig,
    repository: Option<Arc<dyn AgentRepository>>,
    chart: Option<Arc<dyn RewardsChart>>,
    task: Option<Arc<dyn TrainingTask>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_repository<R>(mut self, repository: R) -> Self
    where
        R: AgentRepository + 'static,
    {
        self.repository = Some(Arc::new(repository));
        self
    }

    pub fn with_chart<C>(mut self, chart: C) -> Self
    where
        C: RewardsChart + 'static,
    {
        self.chart = Some(Arc::new(chart));
        self
    }

    /// Replace the training task run behind `start_training`.
    pub fn with_training_task<T>(mut self, task: T) -> Self
    where
        T: TrainingTask + 'static,
    {
        self.task = Some(Arc::new(task));
        self
    }

    /// Seed training runs for reproducibility.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.config.training.seed = Some(seed);
        self
    }

    pub fn build(self) -> App {
        let config = self.config;
        let repository = self.repository.unwrap_or_else(|| {
            Arc::new(MsgPackRepository::new(config.agents.directory.clone()))
        });
        let chart = self
            .chart
            .unwrap_or_else(|| Arc::new(PngRewardsChart::default()));
        let catalog = Arc::new(AgentCatalog::new(
            Arc::clone(&repository),
            config.agents.factory(),
        ));
        let task = self.task.unwrap_or_else(|| {
            Arc::new(AgentTrainer::new(Arc::clone(&catalog), config.training))
        });

        App {
            config,
            repository,
            chart,
            catalog,
            registry: Arc::new(SessionRegistry::new()),
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InMemoryRepository, agents::AgentSelector};

    #[test]
    fn test_services_share_the_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing().with_repository(repo.clone()).build();

        app.trainer()
            .train_with(
                &crate::training::TrainingRequest {
                    agent_type: AgentSelector::QLearning,
                    method: crate::training::TrainingMethod::Teacher,
                    episodes: Some(5),
                    load_existing: false,
                },
                Vec::new(),
            )
            .unwrap();

        assert_eq!(repo.count(), 1);
        assert!(app.catalog().is_cached(AgentSelector::QLearning));
    }

    #[test]
    fn test_default_repository_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.agents.directory = dir.path().to_path_buf();

        let app = App::new(config);
        assert!(
            app.repository()
                .describe(AgentSelector::Sarsa)
                .ends_with("sarsa_agent.msgpack")
        );
    }
}
