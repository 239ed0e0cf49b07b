//! Live agent lookup for game sessions
//!
//! The catalog owns one learner per agent type, loaded lazily from the
//! repository (or created fresh when nothing is saved), and answers the
//! sessions' move requests through the [`AgentPolicy`] port.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::{selector::AgentSelector, serialization::SavedAgent};
use crate::{
    Result,
    error::Error,
    planning::{PlannedAgent, PlanningMethod},
    ports::{AgentPolicy, AgentRepository, Learner},
    q_learning::{TdAgent, TdParams},
    tictactoe::{Board, Mark},
};

/// Builds fresh agents from the configured hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentFactory {
    pub td: TdParams,
    /// Discount factor used by the planners
    pub gamma: f64,
}

impl Default for AgentFactory {
    fn default() -> Self {
        Self {
            td: TdParams::default(),
            gamma: 0.9,
        }
    }
}

impl AgentFactory {
    /// Fresh Q-learning or SARSA agent; `None` for the planners.
    pub fn td_agent(&self, selector: AgentSelector) -> Option<TdAgent> {
        match selector {
            AgentSelector::QLearning => Some(TdAgent::q_learning(self.td)),
            AgentSelector::Sarsa => Some(TdAgent::sarsa(self.td)),
            AgentSelector::ValueIteration | AgentSelector::PolicyIteration => None,
        }
    }

    /// Planner with an empty plan; `None` for the tabular learners.
    pub fn planned_agent(&self, selector: AgentSelector) -> Option<PlannedAgent> {
        match selector {
            AgentSelector::ValueIteration => {
                Some(PlannedAgent::new(PlanningMethod::ValueIteration, self.gamma))
            }
            AgentSelector::PolicyIteration => {
                Some(PlannedAgent::new(PlanningMethod::PolicyIteration, self.gamma))
            }
            AgentSelector::QLearning | AgentSelector::Sarsa => None,
        }
    }

    /// Create a ready-to-play agent. Planners are solved before returning.
    pub fn create(&self, selector: AgentSelector) -> Result<Box<dyn Learner>> {
        if let Some(agent) = self.td_agent(selector) {
            return Ok(Box::new(agent));
        }
        let mut agent = self
            .planned_agent(selector)
            .ok_or_else(|| Error::UnknownAgent {
                input: selector.to_string(),
                expected: "v, p".to_string(),
            })?;
        agent.plan(|_, _| Ok(()))?;
        Ok(Box::new(agent))
    }
}

/// Cache of live agents shared by every session
pub struct AgentCatalog {
    repository: Arc<dyn AgentRepository>,
    factory: AgentFactory,
    agents: Mutex<HashMap<AgentSelector, Box<dyn Learner>>>,
}

impl AgentCatalog {
    pub fn new(repository: Arc<dyn AgentRepository>, factory: AgentFactory) -> Self {
        Self {
            repository,
            factory,
            agents: Mutex::new(HashMap::new()),
        }
    }

    pub fn factory(&self) -> AgentFactory {
        self.factory
    }

    pub fn repository(&self) -> &Arc<dyn AgentRepository> {
        &self.repository
    }

    /// Load the saved agent for `selector`, or create a fresh one.
    ///
    /// A save that cannot be read is logged and replaced by a fresh agent.
    pub fn load_or_create(&self, selector: AgentSelector) -> Result<Box<dyn Learner>> {
        match self.repository.load(selector).and_then(|saved| {
            saved.map(SavedAgent::into_learner).transpose()
        }) {
            Ok(Some(learner)) => {
                tracing::debug!(agent = %selector, "loaded saved agent");
                return Ok(learner);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(agent = %selector, error = %err, "could not load agent");
            }
        }
        tracing::debug!(agent = %selector, "creating new agent");
        self.factory.create(selector)
    }

    /// Replace the cached agent, typically after training saved a new one.
    pub fn refresh(&self, selector: AgentSelector, learner: Box<dyn Learner>) -> Result<()> {
        self.agents().insert(selector, learner);
        Ok(())
    }

    /// Whether an agent for `selector` is currently cached.
    pub fn is_cached(&self, selector: AgentSelector) -> bool {
        self.agents().contains_key(&selector)
    }

    fn agents(&self) -> MutexGuard<'_, HashMap<AgentSelector, Box<dyn Learner>>> {
        self.agents.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AgentPolicy for AgentCatalog {
    fn choose_move(&self, board: &Board, agent: AgentSelector) -> Result<(usize, usize)> {
        if let Some(learner) = self.agents().get_mut(&agent) {
            return learner.select_move(board, Mark::AGENT);
        }

        // Loading may solve a whole plan; other agents stay playable meanwhile.
        let created = self.load_or_create(agent)?;
        let mut agents = self.agents();
        // First one in wins when two sessions raced on the same agent.
        let learner = agents.entry(agent).or_insert(created);
        learner.select_move(board, Mark::AGENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InMemoryRepository, agents::TrainingMetadata, tictactoe::Cell};

    fn catalog(repo: InMemoryRepository) -> AgentCatalog {
        AgentCatalog::new(Arc::new(repo), AgentFactory::default())
    }

    #[test]
    fn test_choose_move_returns_empty_cell() {
        let catalog = catalog(InMemoryRepository::new());
        let board = Board::from_state_key("X---O---X").unwrap();

        let (row, col) = catalog.choose_move(&board, AgentSelector::QLearning).unwrap();
        assert_eq!(board.get(row, col), Some(Cell::Empty));
        assert!(catalog.is_cached(AgentSelector::QLearning));
    }

    #[test]
    fn test_saved_agent_is_preferred() {
        let repo = InMemoryRepository::new();
        let mut agent = TdAgent::sarsa(TdParams {
            epsilon: 0.0,
            ..TdParams::default()
        });
        // One greedy decision toward the center, rewarded
        let episode = crate::ports::Episode {
            first: Mark::O,
            moves: vec![crate::tictactoe::Move {
                row: 1,
                col: 1,
                mark: Mark::O,
            }],
            outcome: crate::tictactoe::GameOutcome::Win(Mark::O),
        };
        agent.learn(&episode, Mark::O).unwrap();
        let saved =
            SavedAgent::from_learner(AgentSelector::Sarsa, &agent, TrainingMetadata::default())
                .unwrap();
        repo.save(&saved).unwrap();

        let catalog = catalog(repo);
        let learner = catalog.load_or_create(AgentSelector::Sarsa).unwrap();
        assert_eq!(learner.rewards(), &[1.0]);
    }

    /// Holds every `load` until released, so a test can park one caller
    /// inside `load_or_create`.
    struct ParkedRepository {
        inner: InMemoryRepository,
        entered: std::sync::mpsc::Sender<()>,
        release: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl AgentRepository for ParkedRepository {
        fn save(&self, agent: &SavedAgent) -> Result<()> {
            self.inner.save(agent)
        }

        fn load(&self, selector: AgentSelector) -> Result<Option<SavedAgent>> {
            let _ = self.entered.send(());
            let _ = self.release.lock().unwrap().recv();
            self.inner.load(selector)
        }

        fn exists(&self, selector: AgentSelector) -> bool {
            self.inner.exists(selector)
        }

        fn describe(&self, selector: AgentSelector) -> String {
            self.inner.describe(selector)
        }
    }

    #[test]
    fn test_cached_agent_plays_while_another_loads() {
        let (entered_tx, entered) = std::sync::mpsc::channel();
        let (release, release_rx) = std::sync::mpsc::channel();
        let repo = ParkedRepository {
            inner: InMemoryRepository::new(),
            entered: entered_tx,
            release: Mutex::new(release_rx),
        };
        let catalog = Arc::new(AgentCatalog::new(Arc::new(repo), AgentFactory::default()));
        catalog
            .refresh(
                AgentSelector::QLearning,
                Box::new(TdAgent::q_learning(TdParams::default())),
            )
            .unwrap();

        let loader = {
            let catalog = Arc::clone(&catalog);
            std::thread::spawn(move || catalog.choose_move(&Board::new(), AgentSelector::Sarsa))
        };
        entered.recv().unwrap();

        // The Sarsa load is parked; the cached agent must still answer.
        let (row, col) = catalog
            .choose_move(&Board::new(), AgentSelector::QLearning)
            .unwrap();
        assert!(row < 3 && col < 3);

        release.send(()).unwrap();
        assert!(loader.join().unwrap().is_ok());
        assert!(catalog.is_cached(AgentSelector::Sarsa));
    }

    #[test]
    fn test_poisoned_cache_still_serves_moves() {
        let catalog = Arc::new(catalog(InMemoryRepository::new()));
        let poisoner = Arc::clone(&catalog);
        let _ = std::thread::spawn(move || {
            let _agents = poisoner.agents.lock().unwrap();
            panic!("learner panicked mid-move");
        })
        .join();
        assert!(catalog.agents.is_poisoned());

        let board = Board::from_state_key("XO-------").unwrap();
        let (row, col) = catalog.choose_move(&board, AgentSelector::QLearning).unwrap();
        assert_eq!(board.get(row, col), Some(Cell::Empty));
    }

    #[test]
    fn test_corrupt_save_falls_back_to_fresh_agent() {
        let repo = InMemoryRepository::new();
        repo.insert_raw(AgentSelector::QLearning, vec![0xc1]);

        let learner = catalog(repo).load_or_create(AgentSelector::QLearning).unwrap();
        assert!(learner.rewards().is_empty());
    }
}
