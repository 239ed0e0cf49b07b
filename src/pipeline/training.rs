//! Training pipeline for learnable agents

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    planning::{
        PlannedAgent, PlanningMethod, policy_iteration::MAX_IMPROVEMENTS,
        value_iteration::MAX_SWEEPS,
    },
    ports::{Episode, Learner, Observer},
    tictactoe::{Board, GameOutcome, Mark, Move},
};

/// Training configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training games
    pub num_games: usize,

    /// Random seed for the agents and the opening coin flip
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn new(num_games: usize) -> Self {
        Self {
            num_games,
            seed: None,
        }
    }
}

/// Result of a training run, from the agent's (`O`) point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total games played
    pub total_games: usize,

    /// Number of wins
    pub wins: usize,

    /// Number of draws
    pub draws: usize,

    /// Number of losses
    pub losses: usize,

    /// Win rate
    pub win_rate: f64,

    /// Draw rate
    pub draw_rate: f64,

    /// Loss rate
    pub loss_rate: f64,
}

impl TrainingResult {
    /// Create a new training result
    pub fn new(total_games: usize, wins: usize, draws: usize, losses: usize) -> Self {
        let rate = |count: usize| {
            if total_games > 0 {
                count as f64 / total_games as f64
            } else {
                0.0
            }
        };

        Self {
            total_games,
            wins,
            draws,
            losses,
            win_rate: rate(wins),
            draw_rate: rate(draws),
            loss_rate: rate(losses),
        }
    }
}

/// Who plays `X` against the learning agent
pub enum Opponent<'a> {
    /// A separate, usually non-learning, player such as the teacher
    Scripted(&'a mut dyn Learner),
    /// The agent picks the moves for both sides; only its `O` moves learn
    SelfPlay,
}

impl Opponent<'_> {
    pub fn name(&self) -> String {
        match self {
            Opponent::Scripted(learner) => learner.name().to_string(),
            Opponent::SelfPlay => "self-play".to_string(),
        }
    }
}

/// Training pipeline for a single learner playing `O`
///
/// Observers may borrow from the caller (for example a job's progress
/// reporter), hence the lifetime.
pub struct TrainingPipeline<'a> {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer + 'a>>,
    rng: StdRng,
}

impl<'a> TrainingPipeline<'a> {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            config,
            observers: Vec::new(),
            rng,
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer + 'a>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Play `num_games` training games.
    ///
    /// Each game opens with a fair coin flip between the agent and the
    /// opponent. The agent learns after every game.
    pub fn run(
        &mut self,
        agent: &mut dyn Learner,
        mut opponent: Opponent<'_>,
    ) -> Result<TrainingResult> {
        if let Some(seed) = self.config.seed {
            agent.set_rng_seed(seed)?;
            if let Opponent::Scripted(learner) = &mut opponent {
                learner.set_rng_seed(seed.wrapping_add(1))?;
            }
        }

        let (mut wins, mut draws, mut losses) = (0, 0, 0);

        for observer in &mut self.observers {
            observer.on_training_start(self.config.num_games)?;
        }

        for game_num in 0..self.config.num_games {
            let outcome = self.play_game(agent, &mut opponent)?;

            match outcome {
                GameOutcome::Win(Mark::O) => wins += 1,
                GameOutcome::Win(Mark::X) => losses += 1,
                GameOutcome::Draw => draws += 1,
            }

            for observer in &mut self.observers {
                observer.on_game_end(game_num, outcome)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        tracing::debug!(
            agent = agent.name(),
            opponent = %opponent.name(),
            games = self.config.num_games,
            wins,
            draws,
            losses,
            "training run finished"
        );
        Ok(TrainingResult::new(
            self.config.num_games,
            wins,
            draws,
            losses,
        ))
    }

    /// Run a planner to convergence, reporting every sweep or round.
    pub fn plan(&mut self, agent: &mut PlannedAgent) -> Result<usize> {
        let limit = match agent.method() {
            PlanningMethod::ValueIteration => MAX_SWEEPS,
            PlanningMethod::PolicyIteration => MAX_IMPROVEMENTS,
        };
        for observer in &mut self.observers {
            observer.on_training_start(limit)?;
        }

        let observers = &mut self.observers;
        let steps = agent.plan(|step, limit| {
            observers
                .iter_mut()
                .try_for_each(|observer| observer.on_iteration(step, limit))
        })?;

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }
        Ok(steps)
    }

    fn play_game(
        &mut self,
        agent: &mut dyn Learner,
        opponent: &mut Opponent<'_>,
    ) -> Result<GameOutcome> {
        let first = if self.rng.random_bool(0.5) {
            Mark::X
        } else {
            Mark::O
        };

        let mut board = Board::new();
        let mut moves = Vec::new();
        let mut to_move = first;

        let outcome = loop {
            if let Some(outcome) = GameOutcome::of(&board) {
                break outcome;
            }

            let (row, col) = match (to_move, &mut *opponent) {
                (Mark::X, Opponent::Scripted(learner)) => learner.select_move(&board, Mark::X)?,
                _ => agent.select_move(&board, to_move)?,
            };
            board.place(row, col, to_move)?;
            moves.push(Move {
                row,
                col,
                mark: to_move,
            });
            to_move = to_move.opponent();
        };

        let episode = Episode {
            first,
            moves,
            outcome,
        };
        agent.learn(&episode, Mark::O)?;
        if let Opponent::Scripted(learner) = opponent {
            learner.learn(&episode, Mark::X)?;
        }
        Ok(outcome)
    }
}
