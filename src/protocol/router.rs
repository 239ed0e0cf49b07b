//! Event dispatch between the transport and the sessions

use std::sync::Arc;

use tracing::Instrument;

use super::events::{EventSink, InboundEvent, OutboundEvent};
use crate::{
    Result,
    agents::AgentSelector,
    error::{Error, ErrorKind},
    ports::AgentPolicy,
    session::{ConnectionId, Session, SessionRegistry},
    training::TrainingJobRunner,
};

/// Decodes inbound frames, drives the session and answers on the sink.
///
/// Every failure ends here: it is logged and turned into an `error` event,
/// and the connection stays open.
#[derive(Clone)]
pub struct EventRouter {
    registry: Arc<SessionRegistry>,
    policy: Arc<dyn AgentPolicy>,
    runner: TrainingJobRunner,
    default_agent: AgentSelector,
}

impl EventRouter {
    pub fn new(
        registry: Arc<SessionRegistry>,
        policy: Arc<dyn AgentPolicy>,
        runner: TrainingJobRunner,
    ) -> Self {
        Self {
            registry,
            policy,
            runner,
            default_agent: AgentSelector::QLearning,
        }
    }

    /// Agent used when a `player_move` creates a game without naming one.
    pub fn with_default_agent(mut self, agent: AgentSelector) -> Self {
        self.default_agent = agent;
        self
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Handle one inbound text frame.
    pub async fn handle_text(&self, connection: ConnectionId, text: &str, sink: &EventSink) {
        match InboundEvent::decode(text) {
            Ok(event) => self.dispatch(connection, event, sink).await,
            Err(err) => {
                tracing::debug!(%connection, error = %err, "rejected inbound frame");
                send(sink, OutboundEvent::error(&err));
            }
        }
    }

    /// Apply a decoded event to the connection's session.
    pub async fn dispatch(&self, connection: ConnectionId, event: InboundEvent, sink: &EventSink) {
        let span = tracing::debug_span!("dispatch", %connection, event = event.name());
        async {
            let session = self.registry.session(connection);
            let mut session = session.lock().await;
            match self.apply(&mut session, event, sink).await {
                Ok(Some(reply)) => send(sink, reply),
                Ok(None) => {}
                Err(err) => {
                    report(&err);
                    send(sink, OutboundEvent::error(&err));
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn apply(
        &self,
        session: &mut Session,
        event: InboundEvent,
        sink: &EventSink,
    ) -> Result<Option<OutboundEvent>> {
        match event {
            InboundEvent::PlayerMove { row, col, agent } => {
                let slot = session.game_mut(agent.unwrap_or(self.default_agent));
                let mut game = slot.clone();
                let policy = Arc::clone(&self.policy);
                // The policy may load or plan an agent; keep that off the reactor.
                let (game, result) = tokio::task::spawn_blocking(move || {
                    let result = game.apply_player_move(row, col, policy.as_ref());
                    (game, result)
                })
                .await
                .map_err(|e| Error::TaskFailed {
                    message: e.to_string(),
                })?;
                *slot = game;
                let report = result?;
                tracing::debug!(
                    row,
                    col,
                    agent_move = ?report.agent_move.map(|m| (m.row, m.col)),
                    outcome = ?report.outcome,
                    "move applied"
                );
                Ok(Some(OutboundEvent::agent_move(&report)))
            }
            InboundEvent::NewGame { agent } => {
                session.reset_game(agent);
                tracing::debug!(%agent, "game reset");
                Ok(Some(OutboundEvent::GameReset {}))
            }
            InboundEvent::StartTraining(request) => {
                self.runner.start(&mut session.job, request, sink.clone())?;
                Ok(None)
            }
        }
    }
}

fn report(err: &Error) {
    match err.kind() {
        ErrorKind::Internal | ErrorKind::AgentPolicy => {
            tracing::error!(error = %err, "event failed");
        }
        ErrorKind::JobExecution => tracing::warn!(error = %err, "event failed"),
        _ => tracing::debug!(error = %err, "event rejected"),
    }
}

fn send(sink: &EventSink, event: OutboundEvent) {
    if sink.send(event).is_err() {
        tracing::debug!("connection closed, dropping outbound event");
    }
}
