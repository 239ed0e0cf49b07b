//! Route table

use axum::{Router, routing::get};

use super::{http, ws};
use crate::{app::App, protocol::EventRouter, rewards::RewardsQuery};

/// Shared handles every request handler gets
#[derive(Clone)]
pub struct ServerState {
    pub events: EventRouter,
    pub rewards: RewardsQuery,
}

impl ServerState {
    pub fn from_app(app: &App) -> Self {
        Self {
            events: app.router(),
            rewards: app.rewards(),
        }
    }
}

/// `/socket` (and `/`) upgrade to the event channel; rewards are plain GET.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/get_rewards/{agent}", get(http::get_rewards))
        .route("/socket", get(ws::upgrade))
        .route("/", get(ws::upgrade))
        .with_state(state)
}
