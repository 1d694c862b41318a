pub mod game;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::application::game_service::StoreError;

pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded")]
    TooManyRequests,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Action {
    State,
    Mutation(&'static str),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::State => "state",
            Action::Mutation(name) => name,
        }
    }
}

/// The caller's session id, or a freshly minted one. Ids that would not
/// survive a round trip through a header are replaced.
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| is_valid_session_id(s))
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

fn is_valid_session_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 128
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next().map(str::trim) {
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string())
}

pub fn enforce_rate_limit(
    state: &AppState,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    game: &str,
    action: Action,
) -> Result<(), ApiError> {
    let limits = state.config.rate_limit;
    let limit = match action {
        Action::State => limits.state_limit,
        Action::Mutation(_) => limits.mutation_limit,
    };
    let bucket = format!("{}:{}_{}", client_ip(headers, peer), game, action.name());
    if state
        .limiter
        .allow(&bucket, limit, Duration::from_secs(limits.window_secs))
    {
        Ok(())
    } else {
        warn!(%bucket, "rate limit exceeded");
        Err(ApiError::TooManyRequests)
    }
}

/// Runs a store operation off the async workers; the store does synchronous
/// disk I/O while holding its lock.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
