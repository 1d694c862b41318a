pub mod game_service;
pub mod snapshot;
