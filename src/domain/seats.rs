use serde::{Deserialize, Serialize};

use crate::domain::game::GameState;
use crate::domain::models::Player;

pub const SEAT_TIMEOUT_SECS: i64 = 5 * 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub session_id: String,
    pub assigned_at: i64,
    #[serde(default)]
    pub last_active: Option<i64>,
}

impl Seat {
    pub fn new(session_id: String, assigned_at: i64) -> Self {
        Self {
            session_id,
            assigned_at,
            last_active: None,
        }
    }

    fn last_seen(&self) -> i64 {
        self.last_active.unwrap_or(self.assigned_at)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seats {
    pub p1: Option<Seat>,
    pub p2: Option<Seat>,
}

impl Seats {
    pub fn slot(&self, player: Player) -> Option<&Seat> {
        match player {
            Player::One => self.p1.as_ref(),
            Player::Two => self.p2.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, player: Player) -> &mut Option<Seat> {
        match player {
            Player::One => &mut self.p1,
            Player::Two => &mut self.p2,
        }
    }

    pub fn player_for_session(&self, session_id: Option<&str>) -> Option<Player> {
        let session_id = session_id.filter(|s| !s.is_empty())?;
        [Player::One, Player::Two]
            .into_iter()
            .find(|&p| self.slot(p).is_some_and(|seat| seat.session_id == session_id))
    }

    /// Records activity on the mover's seat.
    pub fn touch(&mut self, player: Player, now: i64) {
        if let Some(seat) = self.slot_mut(player).as_mut() {
            seat.last_active = Some(now);
        }
    }
}

/// Result of a seat claim. `player == None` means the caller is a spectator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatClaim {
    pub player: Option<Player>,
    pub session_id: Option<String>,
}

/// Frees the seat of the side to move when its owner has been idle longer
/// than `timeout` seconds. The waiting side's seat is never expired.
pub fn expire_seats(state: &mut GameState, now: i64, timeout: i64) -> bool {
    let current = state.current_player;
    let Some(seats) = state.seats.as_mut() else {
        return false;
    };
    let slot = seats.slot_mut(current);
    let stale = slot
        .as_ref()
        .is_some_and(|seat| now.saturating_sub(seat.last_seen()) > timeout);
    if stale {
        if let Some(seat) = slot.take() {
            tracing::info!(player = current.number(), session = %seat.session_id, "seat expired");
        }
    }
    stale
}

pub fn seat_player_for_session(state: &GameState, session_id: Option<&str>) -> Option<Player> {
    state
        .seats
        .as_ref()
        .and_then(|seats| seats.player_for_session(session_id))
}

/// Expires stale seats, then returns the caller's existing seat or assigns the
/// first free one (player 1 preferred). `mint_session_id` is only called when
/// a seat is assigned to a caller without a session.
pub fn claim_seat<F>(
    state: &mut GameState,
    session_id: Option<&str>,
    now: i64,
    timeout: i64,
    mint_session_id: F,
) -> SeatClaim
where
    F: FnOnce() -> String,
{
    expire_seats(state, now, timeout);
    let caller = session_id.filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(player) = seat_player_for_session(state, session_id) {
        return SeatClaim {
            player: Some(player),
            session_id: caller,
        };
    }

    let seats = state.seats.get_or_insert_with(Seats::default);
    let free = [Player::One, Player::Two]
        .into_iter()
        .find(|&p| seats.slot(p).is_none());

    match free {
        Some(player) => {
            let session_id = caller.unwrap_or_else(mint_session_id);
            *seats.slot_mut(player) = Some(Seat::new(session_id.clone(), now));
            tracing::info!(player = player.number(), session = %session_id, "seat claimed");
            SeatClaim {
                player: Some(player),
                session_id: Some(session_id),
            }
        }
        None => SeatClaim {
            player: None,
            session_id: caller,
        },
    }
}
