use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use uuid::Uuid;

use crate::application::snapshot::{ActionResult, SeatClaimResult, Snapshot};
use crate::config::SessionConfig;
use crate::domain::board::BoardError;
use crate::domain::coordinate::Coordinate;
use crate::domain::game::{GameState, GameStates, MoveError};
use crate::domain::models::{GameKind, Move, Player, Selector, seat_number};
use crate::domain::rules::{Chess, Hnefatafl, RuleEngine};
use crate::domain::seats::{self, expire_seats, seat_player_for_session};
use crate::domain::services::Clock;
use crate::infrastructure::persistence::{PersistenceError, StateFile};

/// Infrastructure faults. Rule violations never end up here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("stored {game} board is corrupt: {source}")]
    CorruptBoard {
        game: GameKind,
        #[source]
        source: BoardError,
    },
}

enum MoveFailure {
    Rejected(MoveError),
    Corrupt(BoardError),
}

impl From<MoveError> for MoveFailure {
    fn from(e: MoveError) -> Self {
        MoveFailure::Rejected(e)
    }
}

impl From<BoardError> for MoveFailure {
    fn from(e: BoardError) -> Self {
        MoveFailure::Corrupt(e)
    }
}

/// The game session store.
///
/// Every board lives behind one store-wide lock. Each mutation is persisted
/// before the lock is released, so the order of lock acquisition is the order
/// of the durable history.
pub struct GameService {
    states: Mutex<GameStates>,
    storage: Option<StateFile>,
    clock: Arc<dyn Clock>,
    settings: SessionConfig,
}

impl GameService {
    pub fn new(
        states: GameStates,
        storage: Option<StateFile>,
        clock: Arc<dyn Clock>,
        settings: SessionConfig,
    ) -> Self {
        Self {
            states: Mutex::new(states),
            storage,
            clock,
            settings,
        }
    }

    /// Loads the saved boards from `storage` (or fresh ones) and persists
    /// every later change there.
    pub fn open(storage: StateFile, clock: Arc<dyn Clock>, settings: SessionConfig) -> Self {
        let states = storage.load(&mut rand::thread_rng());
        Self::new(states, Some(storage), clock, settings)
    }

    /// A store that never touches the disk.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            GameStates::fresh(&mut rand::thread_rng()),
            None,
            clock,
            SessionConfig::default(),
        )
    }

    /// Copy of every board, for inspection.
    pub fn states(&self) -> GameStates {
        self.lock().clone()
    }

    pub fn get_state(
        &self,
        game: GameKind,
        selector: Selector,
        session_id: Option<&str>,
    ) -> Result<Snapshot, StoreError> {
        let now = self.clock.now();
        let mut states = self.lock();
        if selector == Selector::Seats {
            let state = states.get_mut(game, selector);
            if expire_seats(state, now, self.settings.seat_timeout_secs) {
                state.bump_version();
                self.persist(&states)?;
            }
        }
        Ok(Snapshot::of(states.get(game, selector), selector, session_id, now))
    }

    pub fn claim_seat(
        &self,
        game: GameKind,
        session_id: Option<&str>,
    ) -> Result<SeatClaimResult, StoreError> {
        let now = self.clock.now();
        let mut states = self.lock();
        let state = states.get_mut(game, Selector::Seats);
        let claim = seats::claim_seat(
            state,
            session_id,
            now,
            self.settings.seat_timeout_secs,
            || Uuid::new_v4().simple().to_string(),
        );
        state.bump_version();
        self.persist(&states)?;

        let snapshot = Snapshot::of(
            states.get(game, Selector::Seats),
            Selector::Seats,
            claim.session_id.as_deref(),
            now,
        );
        Ok(SeatClaimResult {
            ok: true,
            player: seat_number(claim.player),
            session_id: claim.session_id,
            state: snapshot,
        })
    }

    pub fn submit_move(
        &self,
        game: GameKind,
        selector: Selector,
        session_id: Option<&str>,
        player: u8,
        from: &str,
        to: &str,
    ) -> Result<ActionResult, StoreError> {
        let now = self.clock.now();
        let mut states = self.lock();
        let state = states.get_mut(game, selector);
        let seat_changed = selector == Selector::Seats
            && expire_seats(state, now, self.settings.seat_timeout_secs);

        let request = MoveRequest {
            selector,
            session_id,
            player,
            from,
            to,
            now,
            max_history: self.settings.max_history,
        };
        let attempt = match game {
            GameKind::Chess => play_move::<Chess>(state, &request),
            GameKind::Hnefatafl => play_move::<Hnefatafl>(state, &request),
        };

        let error = match attempt {
            Ok(()) => {
                if let Some(result) = &state.result {
                    info!(%game, %selector, title = ?result.title, winner = ?result.winner, "game over");
                }
                info!(%game, %selector, player, from, to, version = state.version, "move played");
                self.persist(&states)?;
                None
            }
            Err(MoveFailure::Rejected(reason)) => {
                debug!(%game, %selector, player, from, to, %reason, "move rejected");
                if seat_changed {
                    state.bump_version();
                    self.persist(&states)?;
                }
                Some(reason)
            }
            Err(MoveFailure::Corrupt(source)) => {
                if seat_changed {
                    state.bump_version();
                    self.persist(&states)?;
                }
                return Err(StoreError::CorruptBoard { game, source });
            }
        };

        let snapshot = Snapshot::of(states.get(game, selector), selector, session_id, now);
        Ok(match error {
            None => ActionResult::accepted(snapshot),
            Some(reason) => ActionResult::rejected(reason, snapshot),
        })
    }

    pub fn reset_game(
        &self,
        game: GameKind,
        selector: Selector,
        session_id: Option<&str>,
        player: u8,
    ) -> Result<ActionResult, StoreError> {
        let now = self.clock.now();
        let mut states = self.lock();
        let state = states.get_mut(game, selector);

        let refusal = match Player::try_from(player) {
            Err(_) => Some(MoveError::InvalidPlayer),
            Ok(_) if !state.game_over => Some(MoveError::GameStillRunning),
            Ok(p)
                if selector == Selector::Seats
                    && seat_player_for_session(state, session_id) != Some(p) =>
            {
                Some(MoveError::SeatRequired)
            }
            Ok(_) => None,
        };
        if let Some(reason) = refusal {
            debug!(%game, %selector, player, %reason, "reset refused");
            let snapshot = Snapshot::of(state, selector, session_id, now);
            return Ok(ActionResult::rejected(reason, snapshot));
        }

        let mut rng = rand::thread_rng();
        let fresh = match game {
            GameKind::Chess => GameState::fresh::<Chess, _>(&mut rng, selector),
            GameKind::Hnefatafl => GameState::fresh::<Hnefatafl, _>(&mut rng, selector),
        };
        state.reset_to(fresh);
        info!(%game, %selector, version = state.version, "game reset");
        self.persist(&states)?;

        let snapshot = Snapshot::of(states.get(game, selector), selector, session_id, now);
        Ok(ActionResult::accepted(snapshot))
    }

    fn lock(&self) -> MutexGuard<'_, GameStates> {
        // Every mutation leaves the boards consistent, so a poisoned lock is
        // still safe to use.
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, states: &GameStates) -> Result<(), StoreError> {
        if let Some(storage) = &self.storage {
            storage.save(states)?;
        }
        Ok(())
    }
}

struct MoveRequest<'a> {
    selector: Selector,
    session_id: Option<&'a str>,
    player: u8,
    from: &'a str,
    to: &'a str,
    now: i64,
    max_history: usize,
}

/// Validates a move in the order callers observe the errors and, if it is
/// legal, applies it and advances the game.
fn play_move<E: RuleEngine>(state: &mut GameState, req: &MoveRequest<'_>) -> Result<(), MoveFailure> {
    if state.game_over {
        return Err(MoveError::GameOver.into());
    }
    let player = Player::try_from(req.player).map_err(|_| MoveError::InvalidPlayer)?;
    if player != state.current_player {
        return Err(MoveError::NotYourTurn.into());
    }
    let from = Coordinate::parse(&req.from.to_lowercase(), E::SIZE);
    let to = Coordinate::parse(&req.to.to_lowercase(), E::SIZE);
    let (Some(from), Some(to)) = (from, to) else {
        return Err(MoveError::InvalidCoordinates.into());
    };

    let mut board = state.decode_board::<E>()?;
    if board.owner_at(from) != Some(player) {
        return Err(MoveError::NotYourPiece.into());
    }
    if req.selector == Selector::Seats {
        match seat_player_for_session(state, req.session_id) {
            None => return Err(MoveError::SeatRequired.into()),
            Some(seated) if seated != player => return Err(MoveError::SeatMismatch.into()),
            Some(_) => {}
        }
    }
    let mv = Move::new(from, to);
    if !E::is_legal(&board, &mv, player) {
        return Err(MoveError::IllegalMove.into());
    }

    E::apply_move(&mut board, &mv, player);
    state.board = board.to_rows();
    state.started_at.get_or_insert(req.now);
    state.last_played_at = Some(req.now);
    if req.selector == Selector::Seats {
        if let Some(seats) = state.seats.as_mut() {
            seats.touch(player, req.now);
        }
    }
    state.push_history(
        format!("P{}: {}-{}", player.number(), req.from, req.to),
        req.max_history,
    );
    let next = player.opponent();
    state.current_player = next;
    state.conclude(E::check_for_game_end(&board, next));
    state.bump_version();
    Ok(())
}
