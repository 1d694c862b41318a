use std::sync::Arc;

use crate::application::game_service::GameService;
use crate::config::AppConfig;
use crate::infrastructure::limiter::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GameService>,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<AppConfig>,
}
