use serde::Serialize;

use crate::domain::game::{GameState, MoveError, Stats};
use crate::domain::models::{GameOutcome, Player, Selector, seat_number};
use crate::domain::seats::seat_player_for_session;

/// Who sits where, from the caller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SeatInfo {
    pub p1: bool,
    pub p2: bool,
    pub player: u8,
}

/// Read-only view of one board handed back by every operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub game_id: Selector,
    pub board: Vec<String>,
    pub current_player: Player,
    pub move_history: Vec<String>,
    pub game_over: bool,
    pub result: Option<GameOutcome>,
    pub stats: Stats,
    pub started_at: Option<i64>,
    pub last_played_at: Option<i64>,
    pub version: u64,
    pub server_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_info: Option<SeatInfo>,
}

impl Snapshot {
    pub fn of(
        state: &GameState,
        selector: Selector,
        session_id: Option<&str>,
        server_time: i64,
    ) -> Self {
        let seat_info = match (selector, &state.seats) {
            (Selector::Seats, Some(seats)) => Some(SeatInfo {
                p1: seats.p1.is_some(),
                p2: seats.p2.is_some(),
                player: seat_number(seat_player_for_session(state, session_id)),
            }),
            (Selector::Seats, None) => Some(SeatInfo {
                p1: false,
                p2: false,
                player: 0,
            }),
            (Selector::Public, _) => None,
        };

        Self {
            game_id: selector,
            board: state.board.clone(),
            current_player: state.current_player,
            move_history: state.move_history.clone(),
            game_over: state.game_over,
            result: state.result.clone(),
            stats: state.stats,
            started_at: state.started_at,
            last_played_at: state.last_played_at,
            version: state.version,
            server_time,
            seat_info,
        }
    }
}

/// Outcome of a move or reset. Rule violations set `ok: false` and `error`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MoveError>,
    pub state: Snapshot,
}

impl ActionResult {
    pub fn accepted(state: Snapshot) -> Self {
        Self {
            ok: true,
            error: None,
            state,
        }
    }

    pub fn rejected(error: MoveError, state: Snapshot) -> Self {
        Self {
            ok: false,
            error: Some(error),
            state,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeatClaimResult {
    pub ok: bool,
    /// `0` for a spectator.
    pub player: u8,
    #[serde(skip)]
    pub session_id: Option<String>,
    pub state: Snapshot,
}
