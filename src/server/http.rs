//! `GET /get_rewards/{agent}`

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::router::ServerState;
use crate::{
    Result,
    error::{Error, ErrorKind},
    rewards::{ErrorBody, RewardsResponse},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// 200 with the chart or the "no data" body, 400 for an unknown agent,
    /// 500 for anything else.
    pub fn from_resolution(resolved: Result<RewardsResponse>) -> Self {
        match resolved {
            Ok(RewardsResponse::Chart { content_type, body }) => Self {
                status: StatusCode::OK,
                content_type,
                body,
            },
            Ok(RewardsResponse::NoData) => Self::json(StatusCode::OK, &RewardsResponse::no_data_body()),
            Err(err) => {
                let status = if err.kind() == ErrorKind::Validation {
                    StatusCode::BAD_REQUEST
                } else {
                    tracing::error!(error = %err, "rewards query failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                Self::json(
                    status,
                    &ErrorBody {
                        error: err.public_message(),
                    },
                )
            }
        }
    }

    fn json(status: StatusCode, body: &ErrorBody) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec()),
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [
                (header::CONTENT_TYPE, self.content_type),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Chart rendering reads a save file, so it runs on the blocking pool.
pub async fn get_rewards(
    State(state): State<ServerState>,
    Path(agent): Path<String>,
) -> HttpResponse {
    let rewards = state.rewards.clone();
    let id = agent.clone();
    let resolved = tokio::task::spawn_blocking(move || rewards.resolve(&id))
        .await
        .map_err(|e| Error::TaskFailed {
            message: e.to_string(),
        })
        .and_then(|resolved| resolved);
    let response = HttpResponse::from_resolution(resolved);
    tracing::debug!(%agent, status = %response.status, "rewards request");
    response
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{adapters::InMemoryRepository, app::App, server::build_router};

    fn routes() -> Router {
        let app = App::for_testing()
            .with_repository(InMemoryRepository::new())
            .with_default_seed(3)
            .build();
        build_router(ServerState::from_app(&app))
    }

    async fn request(method: Method, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = routes()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    #[test]
    fn test_no_data_is_200_json() {
        let response = HttpResponse::from_resolution(Ok(RewardsResponse::NoData));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, br#"{"error":"No rewards data available"}"#.to_vec());
    }

    #[test]
    fn test_unknown_agent_is_400() {
        let err = "z".parse::<crate::agents::AgentSelector>().unwrap_err();
        let response = HttpResponse::from_resolution(Err(err));
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.content_type, "application/json");
    }

    #[test]
    fn test_internal_error_is_500_without_details() {
        let err = Error::ChartRender {
            message: "encoder exploded at /srv".to_string(),
        };
        let response = HttpResponse::from_resolution(Err(err));
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, br#"{"error":"internal server error"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_percent_encoded_agent_id_is_decoded() {
        let (status, content_type, body) = request(Method::GET, "/get_rewards/%71").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, br#"{"error":"No rewards data available"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let (status, _, _) = request(Method::GET, "/get_rewards/s?ts=1").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_gets_an_http_answer() {
        let (status, content_type, body) = request(Method::HEAD, "/get_rewards/q").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_agent_route_is_400() {
        let (status, _, body) = request(Method::GET, "/get_rewards/nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert!(body.error.contains("nope"));
    }

    #[tokio::test]
    async fn test_other_methods_are_refused() {
        let (status, _, _) = request(Method::POST, "/get_rewards/q").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
