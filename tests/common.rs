//! Common test utilities for the integration suite.
//!
//! Deterministic stand-ins for the agent policy and the training task, plus
//! helpers for driving a router and collecting what it sends back.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Condvar, Mutex},
    time::Duration,
};

use serde_json::{Value, json};
use tictactoe_live::{
    Error, Result,
    agents::AgentSelector,
    ports::{AgentPolicy, ProgressReporter, TrainingTask},
    protocol::{EventRouter, EventSink, OutboundEvent},
    session::{ConnectionId, SessionRegistry},
    tictactoe::Board,
    training::{TrainingJobRunner, TrainingRequest},
};
use tokio::sync::mpsc;

/// Always takes the first empty cell in row-major order.
pub struct FirstEmpty;

impl AgentPolicy for FirstEmpty {
    fn choose_move(&self, board: &Board, _agent: AgentSelector) -> Result<(usize, usize)> {
        board
            .empty_cells()
            .first()
            .copied()
            .ok_or(Error::NoValidMoves)
    }
}

/// Replies with a fixed sequence of cells, then runs dry.
pub struct Scripted(Mutex<VecDeque<(usize, usize)>>);

impl Scripted {
    pub fn new(moves: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self(Mutex::new(moves.into_iter().collect()))
    }
}

impl AgentPolicy for Scripted {
    fn choose_move(&self, _board: &Board, _agent: AgentSelector) -> Result<(usize, usize)> {
        self.0.lock().unwrap().pop_front().ok_or(Error::NoValidMoves)
    }
}

/// Reports `steps` evenly spaced progress values and succeeds.
pub struct StepTask {
    pub steps: usize,
}

impl TrainingTask for StepTask {
    fn run(&self, _request: &TrainingRequest, reporter: &mut dyn ProgressReporter) -> Result<()> {
        for step in 1..=self.steps {
            let percent = step as f64 * 100.0 / self.steps as f64;
            reporter.report(percent, &format!("step {step}/{}", self.steps))?;
        }
        Ok(())
    }
}

/// Reports `before` progress values, then fails.
pub struct FailingTask {
    pub before: usize,
}

impl TrainingTask for FailingTask {
    fn run(&self, _request: &TrainingRequest, reporter: &mut dyn ProgressReporter) -> Result<()> {
        for step in 1..=self.before {
            reporter.report(step as f64, "working")?;
        }
        Err(Error::TrainingFailed {
            message: "simulated failure".to_string(),
        })
    }
}

/// Reports 10%, blocks until [`Gate::open`], then reports 100%.
#[derive(Clone, Default)]
pub struct Gate {
    open: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn open(&self) {
        let (lock, cvar) = &*self.open;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }
}

impl TrainingTask for Gate {
    fn run(&self, _request: &TrainingRequest, reporter: &mut dyn ProgressReporter) -> Result<()> {
        reporter.report(10.0, "waiting at the gate")?;
        let (lock, cvar) = &*self.open;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
        drop(open);
        reporter.report(100.0, "through the gate")
    }
}

/// A router over a fresh registry, plus one connected client.
pub struct Client {
    pub router: EventRouter,
    pub connection: ConnectionId,
    pub sink: EventSink,
    pub events: mpsc::UnboundedReceiver<OutboundEvent>,
}

impl Client {
    pub fn new<P, T>(policy: P, task: T) -> Self
    where
        P: AgentPolicy + 'static,
        T: TrainingTask + 'static,
    {
        let router = EventRouter::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(policy),
            TrainingJobRunner::new(Arc::new(task)),
        );
        let connection = router.registry().connect();
        let (sink, events) = mpsc::unbounded_channel();
        Self {
            router,
            connection,
            sink,
            events,
        }
    }

    pub async fn send(&self, event: &str, data: Value) {
        let text = json!({ "event": event, "data": data }).to_string();
        self.router
            .handle_text(self.connection, &text, &self.sink)
            .await;
    }

    pub async fn send_raw(&self, text: &str) {
        self.router
            .handle_text(self.connection, text, &self.sink)
            .await;
    }

    /// Next event, failing the test if none arrives within a few seconds.
    pub async fn next(&mut self) -> OutboundEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("timed out waiting for an event")
            .expect("event channel closed")
    }

    /// Events up to and including the first training terminal event.
    pub async fn until_training_ends(&mut self) -> Vec<OutboundEvent> {
        let mut seen = Vec::new();
        loop {
            let event = self.next().await;
            let terminal = is_training_terminal(&event);
            seen.push(event);
            if terminal {
                return seen;
            }
        }
    }

    /// Whatever else shows up within `window`.
    pub async fn drain_for(&mut self, window: Duration) -> Vec<OutboundEvent> {
        let mut seen = Vec::new();
        while let Ok(Some(event)) = tokio::time::timeout(window, self.events.recv()).await {
            seen.push(event);
        }
        seen
    }
}

pub fn is_training_terminal(event: &OutboundEvent) -> bool {
    matches!(
        event,
        OutboundEvent::TrainingComplete {} | OutboundEvent::TrainingError { .. }
    )
}

pub fn progress_values(events: &[OutboundEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|event| match event {
            OutboundEvent::TrainingProgress { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect()
}

pub fn training_request(agent: &str) -> Value {
    json!({
        "agent_type": agent,
        "method": "teacher",
        "episodes": 1000,
        "load_existing": false,
    })
}
