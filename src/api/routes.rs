use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::game::{claim_seat, get_state, reset_game, submit_move};
use crate::api::state::AppState;

pub fn app_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/:game/state", get(get_state))
        .route("/:game/seat", post(claim_seat))
        .route("/:game/move", post(submit_move))
        .route("/:game/reset", post(reset_game));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
