use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::api::handlers::{Action, ApiError, SESSION_HEADER, enforce_rate_limit, run_blocking, session_id};
use crate::api::models::{ModeQuery, MoveRequest, ResetRequest, player_number};
use crate::api::state::AppState;
use crate::domain::models::{GameKind, Selector};

fn with_session<T: serde::Serialize>(session_id: String, body: T) -> Response {
    ([(SESSION_HEADER, session_id)], Json(body)).into_response()
}

pub async fn get_state(
    State(state): State<AppState>,
    Path(game): Path<GameKind>,
    Query(query): Query<ModeQuery>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state, &headers, peer.map(|c| c.0), game.as_str(), Action::State)?;
    let session = session_id(&headers);
    let selector = query.selector();

    let service = state.service.clone();
    let sid = session.clone();
    let snapshot = run_blocking(move || service.get_state(game, selector, Some(&sid))).await?;
    Ok(with_session(session, snapshot))
}

pub async fn claim_seat(
    State(state): State<AppState>,
    Path(game): Path<GameKind>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    enforce_rate_limit(
        &state,
        &headers,
        peer.map(|c| c.0),
        game.as_str(),
        Action::Mutation("seat"),
    )?;
    let session = session_id(&headers);

    let service = state.service.clone();
    let sid = session.clone();
    let claim = run_blocking(move || service.claim_seat(game, Some(&sid))).await?;
    let session = claim.session_id.clone().unwrap_or(session);
    Ok(with_session(session, claim))
}

pub async fn submit_move(
    State(state): State<AppState>,
    Path(game): Path<GameKind>,
    Query(query): Query<ModeQuery>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(payload): Json<MoveRequest>,
) -> Result<Response, ApiError> {
    enforce_rate_limit(
        &state,
        &headers,
        peer.map(|c| c.0),
        game.as_str(),
        Action::Mutation("move"),
    )?;
    let session = session_id(&headers);
    let selector: Selector = query.selector();

    let service = state.service.clone();
    let sid = session.clone();
    let result = run_blocking(move || {
        service.submit_move(
            game,
            selector,
            Some(&sid),
            player_number(payload.player),
            &payload.from,
            &payload.to,
        )
    })
    .await?;
    Ok(with_session(session, result))
}

pub async fn reset_game(
    State(state): State<AppState>,
    Path(game): Path<GameKind>,
    Query(query): Query<ModeQuery>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(payload): Json<ResetRequest>,
) -> Result<Response, ApiError> {
    enforce_rate_limit(
        &state,
        &headers,
        peer.map(|c| c.0),
        game.as_str(),
        Action::Mutation("reset"),
    )?;
    let session = session_id(&headers);
    let selector = query.selector();

    let service = state.service.clone();
    let sid = session.clone();
    let result = run_blocking(move || {
        service.reset_game(game, selector, Some(&sid), player_number(payload.player))
    })
    .await?;
    Ok(with_session(session, result))
}
