pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::application::game_service::GameService;
use crate::config::AppConfig;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::limiter::RateLimiter;
use crate::infrastructure::persistence::StateFile;

pub async fn start_server() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;

    let storage = StateFile::new(config.storage.state_file.clone());
    let service = Arc::new(GameService::open(
        storage,
        Arc::new(SystemClock),
        config.session,
    ));
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.max_buckets));
    let addr = format!("{}:{}", config.api.host, config.api.port);

    let app_state = state::AppState {
        service,
        limiter,
        config: Arc::new(config),
    };
    let app = routes::app_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
