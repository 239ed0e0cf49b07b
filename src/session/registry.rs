//! Connection-scoped session ownership

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::game::GameStateMachine;
use crate::{agents::AgentSelector, training::JobHandle};

/// Identifies one live transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything one connection owns: at most one game and one training job.
#[derive(Debug, Default)]
pub struct Session {
    game: Option<GameStateMachine>,
    /// Latest training job; kept after it ends so its status stays readable
    pub(crate) job: Option<JobHandle>,
}

impl Session {
    pub fn game(&self) -> Option<&GameStateMachine> {
        self.game.as_ref()
    }

    /// The current game, created for `agent` on first use.
    ///
    /// An existing game keeps its agent; switching agents goes through
    /// [`Session::reset_game`].
    pub fn game_mut(&mut self, agent: AgentSelector) -> &mut GameStateMachine {
        self.game.get_or_insert_with(|| GameStateMachine::new(agent))
    }

    /// Fresh board with `agent`, creating the game if needed.
    pub fn reset_game(&mut self, agent: AgentSelector) -> &mut GameStateMachine {
        let game = self.game.get_or_insert_with(|| GameStateMachine::new(agent));
        game.reset(agent);
        game
    }

    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    /// Cancel the running job, if any. Returns true if one was cancelled.
    pub fn cancel_job(&mut self) -> bool {
        self.job.as_ref().is_some_and(JobHandle::cancel)
    }
}

pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

/// Maps each live connection to its session.
///
/// The map lock is only held to look up or remove an entry; every operation
/// on a session goes through that session's own async mutex, so one
/// connection never waits on another.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ConnectionId, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<ConnectionId, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new connection with an empty session.
    pub fn connect(&self) -> ConnectionId {
        let id = ConnectionId::new();
        self.sessions().insert(id, SharedSession::default());
        tracing::debug!(connection = %id, "session opened");
        id
    }

    /// Session for `id`, created if the connection has none yet.
    pub fn session(&self, id: ConnectionId) -> SharedSession {
        Arc::clone(self.sessions().entry(id).or_default())
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.sessions().contains_key(&id)
    }

    /// Drop the session for `id` and cancel its training job.
    pub async fn disconnect(&self, id: ConnectionId) {
        let removed = self.sessions().remove(&id);
        let Some(session) = removed else {
            return;
        };
        let cancelled = session.lock().await.cancel_job();
        tracing::debug!(connection = %id, cancelled_job = cancelled, "session closed");
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{FailureReason, JobStatus, TrainingMethod, TrainingRequest};

    fn job() -> JobHandle {
        JobHandle::new(TrainingRequest {
            agent_type: AgentSelector::Sarsa,
            method: TrainingMethod::SelfPlay,
            episodes: None,
            load_existing: false,
        })
    }

    #[test]
    fn test_session_is_lazy_and_stable() {
        let registry = SessionRegistry::new();
        let id = ConnectionId::new();
        assert!(!registry.contains(id));

        let first = registry.session(id);
        let second = registry.session(id);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_game_created_once() {
        let mut session = Session::default();
        assert!(session.game().is_none());

        session.game_mut(AgentSelector::ValueIteration);
        let agent = session.game_mut(AgentSelector::QLearning).agent();
        assert_eq!(agent, AgentSelector::ValueIteration);

        let agent = session.reset_game(AgentSelector::QLearning).agent();
        assert_eq!(agent, AgentSelector::QLearning);
    }

    #[tokio::test]
    async fn test_disconnect_cancels_job_and_forgets_session() {
        let registry = SessionRegistry::new();
        let id = registry.connect();
        let handle = job();
        handle.mark_running();
        registry.session(id).lock().await.job = Some(handle.clone());

        registry.disconnect(id).await;

        assert!(registry.is_empty());
        assert_eq!(handle.status(), JobStatus::Failed(FailureReason::Cancelled));

        // A reconnect starts from nothing
        let session = registry.session(id);
        assert!(session.lock().await.game().is_none());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_connection_is_noop() {
        let registry = SessionRegistry::new();
        registry.connect();
        registry.disconnect(ConnectionId::new()).await;
        assert_eq!(registry.len(), 1);
    }
}
