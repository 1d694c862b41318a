use serde::Deserialize;

use crate::domain::models::Selector;

#[derive(Deserialize, Debug, Default)]
pub struct ModeQuery {
    pub mode: Option<String>,
}

impl ModeQuery {
    pub fn selector(&self) -> Selector {
        Selector::from_mode(self.mode.as_deref())
    }
}

#[derive(Deserialize, Debug)]
pub struct MoveRequest {
    pub player: i64,
    pub from: String,
    pub to: String,
}

#[derive(Deserialize, Debug)]
pub struct ResetRequest {
    pub player: i64,
}

/// Player numbers that do not fit a `u8` are simply invalid players.
pub fn player_number(player: i64) -> u8 {
    u8::try_from(player).unwrap_or(0)
}
