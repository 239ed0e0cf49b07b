//! Training started over the event protocol, with the production trainer.

mod common;

use std::time::Duration;

use serde_json::json;
use tictactoe_live::{
    adapters::InMemoryRepository,
    agents::AgentSelector,
    app::App,
    ports::AgentRepository,
    protocol::{EventRouter, OutboundEvent},
    rewards::RewardsResponse,
};
use tokio::sync::mpsc;

fn app(repo: &InMemoryRepository) -> App {
    App::for_testing()
        .with_repository(repo.clone())
        .with_default_seed(7)
        .build()
}

struct Wire {
    router: EventRouter,
    connection: tictactoe_live::session::ConnectionId,
    sink: mpsc::UnboundedSender<OutboundEvent>,
    events: mpsc::UnboundedReceiver<OutboundEvent>,
}

impl Wire {
    fn new(app: &App) -> Self {
        let router = app.router();
        let connection = router.registry().connect();
        let (sink, events) = mpsc::unbounded_channel();
        Self {
            router,
            connection,
            sink,
            events,
        }
    }

    async fn send(&self, event: &str, data: serde_json::Value) {
        let text = json!({"event": event, "data": data}).to_string();
        self.router
            .handle_text(self.connection, &text, &self.sink)
            .await;
    }

    async fn until_training_ends(&mut self) -> Vec<OutboundEvent> {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(60), self.events.recv())
                .await
                .expect("training took too long")
                .expect("channel closed");
            let done = common::is_training_terminal(&event);
            seen.push(event);
            if done {
                return seen;
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_teacher_training_saves_agent_and_feeds_rewards() {
    let repo = InMemoryRepository::new();
    let app = app(&repo);
    let mut wire = Wire::new(&app);

    wire.send(
        "start_training",
        json!({"agent_type": "q", "method": "teacher", "episodes": 200, "load_existing": false}),
    )
    .await;
    let events = wire.until_training_ends().await;

    assert_eq!(events.last(), Some(&OutboundEvent::TrainingComplete {}));
    let progress = common::progress_values(&events);
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100.0));

    assert!(repo.exists(AgentSelector::QLearning));
    assert!(app.catalog().is_cached(AgentSelector::QLearning));

    match app.rewards().resolve("q").unwrap() {
        RewardsResponse::Chart { content_type, body } => {
            assert_eq!(content_type, "image/png");
            assert!(body.starts_with(b"\x89PNG"));
        }
        RewardsResponse::NoData => panic!("trained agent should have rewards"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_self_play_is_the_fallback_method() {
    let repo = InMemoryRepository::new();
    let app = app(&repo);
    let mut wire = Wire::new(&app);

    wire.send(
        "start_training",
        json!({"agent_type": "s", "method": null, "episodes": 50}),
    )
    .await;
    let events = wire.until_training_ends().await;
    assert_eq!(events.last(), Some(&OutboundEvent::TrainingComplete {}));

    let saved = repo.load(AgentSelector::Sarsa).unwrap().unwrap();
    assert_eq!(saved.metadata.games_trained, Some(50));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_planner_training_without_episodes() {
    let repo = InMemoryRepository::new();
    let app = app(&repo);
    let mut wire = Wire::new(&app);

    wire.send(
        "start_training",
        json!({"agent_type": "v", "method": null, "episodes": null, "load_existing": false}),
    )
    .await;
    let events = wire.until_training_ends().await;

    assert_eq!(events.last(), Some(&OutboundEvent::TrainingComplete {}));
    assert!(repo.exists(AgentSelector::ValueIteration));
    assert_eq!(
        app.rewards().resolve("v").unwrap(),
        RewardsResponse::NoData
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_load_existing_without_save_fails_the_job() {
    let repo = InMemoryRepository::new();
    let app = app(&repo);
    let mut wire = Wire::new(&app);

    wire.send(
        "start_training",
        json!({"agent_type": "q", "method": "teacher", "episodes": 10, "load_existing": true}),
    )
    .await;
    let events = wire.until_training_ends().await;

    match events.last() {
        Some(OutboundEvent::TrainingError { message }) => {
            assert!(message.starts_with("cannot load agent"), "{message}")
        }
        other => panic!("expected a training error, got {other:?}"),
    }
    assert!(common::progress_values(&events).is_empty());
    assert_eq!(repo.count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_trained_agent_plays_live_games() {
    let repo = InMemoryRepository::new();
    let app = app(&repo);
    let mut wire = Wire::new(&app);

    wire.send(
        "start_training",
        json!({"agent_type": "p", "episodes": null}),
    )
    .await;
    wire.until_training_ends().await;

    wire.send("new_game", json!({"agent": "p"})).await;
    assert_eq!(wire.events.recv().await, Some(OutboundEvent::GameReset {}));

    wire.send("player_move", json!({"row": 1, "col": 1})).await;
    match wire.events.recv().await {
        Some(OutboundEvent::AgentMove {
            row: Some(row),
            col: Some(col),
            game_over: false,
            ..
        }) => assert!((row, col) != (1, 1)),
        other => panic!("expected an agent move, got {other:?}"),
    }

    assert_eq!(app.registry().len(), 1);
}
