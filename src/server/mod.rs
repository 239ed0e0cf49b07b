//! Network transport
//!
//! One axum server carries the `/socket` WebSocket and the
//! `GET /get_rewards/{agent}` route.

pub mod http;
pub mod listener;
pub mod router;
pub mod ws;

pub use http::HttpResponse;
pub use listener::Server;
pub use router::{ServerState, build_router};
