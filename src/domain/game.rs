use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::board::Board;
use crate::domain::models::{GameKind, GameOutcome, Player, Selector};
use crate::domain::rules::{Chess, Hnefatafl, RuleEngine};
use crate::domain::seats::Seats;

pub const MAX_HISTORY: usize = 200;

/// Rule and session violations. These are reported to the caller alongside
/// the current snapshot and never treated as faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum MoveError {
    #[error("Game over")]
    GameOver,
    #[error("Invalid player")]
    InvalidPlayer,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Invalid coordinates")]
    InvalidCoordinates,
    #[error("Not your piece")]
    NotYourPiece,
    #[error("Seat required")]
    SeatRequired,
    #[error("Seat mismatch")]
    SeatMismatch,
    #[error("Illegal move")]
    IllegalMove,
    #[error("Game still running")]
    GameStillRunning,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub p1_wins: u64,
    pub p2_wins: u64,
    pub draws: u64,
    pub total_games: u64,
}

impl Stats {
    pub fn record(&mut self, winner: Option<Player>) {
        match winner {
            Some(Player::One) => self.p1_wins += 1,
            Some(Player::Two) => self.p2_wins += 1,
            None => self.draws += 1,
        }
        self.total_games += 1;
    }
}

/// One board instance: a game title on a given selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Vec<String>,
    pub current_player: Player,
    pub move_history: Vec<String>,
    pub game_over: bool,
    pub result: Option<GameOutcome>,
    pub stats: Stats,
    pub started_at: Option<i64>,
    pub last_played_at: Option<i64>,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<Seats>,
}

impl GameState {
    pub fn fresh<E: RuleEngine, R: Rng + ?Sized>(rng: &mut R, selector: Selector) -> Self {
        Self {
            board: E::initial_board().to_rows(),
            current_player: E::opening_player(rng),
            move_history: Vec::new(),
            game_over: false,
            result: None,
            stats: Stats::default(),
            started_at: None,
            last_played_at: None,
            version: 0,
            seats: match selector {
                Selector::Seats => Some(Seats::default()),
                Selector::Public => None,
            },
        }
    }

    pub fn decode_board<E: RuleEngine>(&self) -> Result<Board<E::Piece>, crate::domain::board::BoardError> {
        Board::from_rows(&self.board, E::SIZE)
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn push_history(&mut self, entry: String, max_history: usize) {
        self.move_history.push(entry);
        if self.move_history.len() > max_history {
            let excess = self.move_history.len() - max_history;
            self.move_history.drain(..excess);
        }
    }

    /// Marks the game finished (or running) and counts a finished game in
    /// the statistics.
    pub fn conclude(&mut self, outcome: Option<GameOutcome>) {
        self.game_over = outcome.is_some();
        if let Some(result) = &outcome {
            self.stats.record(result.winner);
        }
        self.result = outcome;
    }

    /// Replaces the position with a fresh game while keeping statistics,
    /// seat occupancy and a monotonic version.
    pub fn reset_to(&mut self, mut fresh: GameState) {
        fresh.stats = self.stats;
        if fresh.seats.is_some() {
            fresh.seats = Some(self.seats.take().unwrap_or_default());
        }
        fresh.version = self.version + 1;
        *self = fresh;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePair {
    pub public: GameState,
    pub seats: GameState,
}

impl GamePair {
    pub fn fresh<E: RuleEngine, R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            public: GameState::fresh::<E, R>(rng, Selector::Public),
            seats: GameState::fresh::<E, R>(rng, Selector::Seats),
        }
    }

    pub fn get(&self, selector: Selector) -> &GameState {
        match selector {
            Selector::Public => &self.public,
            Selector::Seats => &self.seats,
        }
    }

    pub fn get_mut(&mut self, selector: Selector) -> &mut GameState {
        match selector {
            Selector::Public => &mut self.public,
            Selector::Seats => &mut self.seats,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Games {
    pub chess: GamePair,
    pub hnefatafl: GamePair,
}

/// Every board the server hosts: two games times two selectors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStates {
    pub games: Games,
}

impl GameStates {
    pub fn fresh<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            games: Games {
                chess: GamePair::fresh::<Chess, R>(rng),
                hnefatafl: GamePair::fresh::<Hnefatafl, R>(rng),
            },
        }
    }

    pub fn pair(&self, game: GameKind) -> &GamePair {
        match game {
            GameKind::Chess => &self.games.chess,
            GameKind::Hnefatafl => &self.games.hnefatafl,
        }
    }

    pub fn pair_mut(&mut self, game: GameKind) -> &mut GamePair {
        match game {
            GameKind::Chess => &mut self.games.chess,
            GameKind::Hnefatafl => &mut self.games.hnefatafl,
        }
    }

    pub fn get(&self, game: GameKind, selector: Selector) -> &GameState {
        self.pair(game).get(selector)
    }

    pub fn get_mut(&mut self, game: GameKind, selector: Selector) -> &mut GameState {
        self.pair_mut(game).get_mut(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::OutcomeKind;
    use crate::domain::seats::Seat;

    fn rng() -> rand::rngs::StdRng {
        use rand::SeedableRng;
        rand::rngs::StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_fresh_states_have_seats_only_on_seats_selector() {
        let states = GameStates::fresh(&mut rng());
        for game in [GameKind::Chess, GameKind::Hnefatafl] {
            assert!(states.get(game, Selector::Public).seats.is_none());
            assert!(states.get(game, Selector::Seats).seats.is_some());
        }
        assert_eq!(states.games.chess.public.current_player, Player::One);
        assert_eq!(states.games.hnefatafl.public.board.len(), 9);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = GameState::fresh::<Chess, _>(&mut rng(), Selector::Public);
        for i in 0..205 {
            state.push_history(format!("entry {i}"), MAX_HISTORY);
        }
        assert_eq!(state.move_history.len(), MAX_HISTORY);
        assert_eq!(state.move_history[0], "entry 5");
        assert_eq!(state.move_history.last().unwrap(), "entry 204");
    }

    #[test]
    fn test_conclude_updates_stats() {
        let mut state = GameState::fresh::<Chess, _>(&mut rng(), Selector::Public);
        state.conclude(Some(GameOutcome::stalemate()));
        assert!(state.game_over);
        assert_eq!(state.stats.draws, 1);
        assert_eq!(state.stats.total_games, 1);
        state.conclude(Some(GameOutcome::win(OutcomeKind::Checkmate, Player::Two)));
        assert_eq!(state.stats.p2_wins, 1);
        assert_eq!(state.stats.total_games, 2);
    }

    #[test]
    fn test_reset_keeps_stats_seats_and_version_order() {
        let mut state = GameState::fresh::<Chess, _>(&mut rng(), Selector::Seats);
        state.conclude(Some(GameOutcome::win(OutcomeKind::Checkmate, Player::One)));
        state.version = 41;
        state.board[0] = "........".to_string();
        if let Some(seats) = state.seats.as_mut() {
            seats.p2 = Some(Seat::new("abc".to_string(), 10));
        }
        let fresh = GameState::fresh::<Chess, _>(&mut rng(), Selector::Seats);
        state.reset_to(fresh);
        assert!(!state.game_over);
        assert_eq!(state.result, None);
        assert_eq!(state.version, 42);
        assert_eq!(state.stats.p1_wins, 1);
        assert_eq!(state.board[0], "rnbqkbnr");
        assert_eq!(state.seats.unwrap().p2.unwrap().session_id, "abc");
    }

    #[test]
    fn test_move_error_serializes_as_reason_name() {
        assert_eq!(serde_json::to_value(MoveError::NotYourTurn).unwrap(), "NotYourTurn");
        assert_eq!(MoveError::NotYourTurn.to_string(), "Not your turn");
    }
}
