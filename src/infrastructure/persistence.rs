use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::game::{GamePair, GameState, GameStates};
use crate::domain::rules::{Chess, Hnefatafl, RuleEngine};
use crate::domain::seats::Seat;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to serialize game state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move {} over {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The durable JSON snapshot of every board.
///
/// Writes go to a `.tmp` sibling first and are then renamed over the live
/// file, so the live file always holds a complete snapshot.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub fn save(&self, states: &GameStates) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string_pretty(states)?;
        let temp_path = self.temp_path();

        let write = |path: &Path| -> io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(payload.as_bytes())?;
            file.sync_all()
        };
        write(&temp_path).map_err(|source| PersistenceError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| PersistenceError::Rename {
            from: temp_path.clone(),
            to: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), bytes = payload.len(), "game state saved");
        Ok(())
    }

    /// Loads the snapshot, falling back to fresh defaults when the file is
    /// missing, unreadable or malformed.
    pub fn load<R: Rng + ?Sized>(&self, rng: &mut R) -> GameStates {
        let defaults = GameStates::fresh(rng);
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no saved game state, starting fresh");
                return defaults;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read game state, starting fresh");
                return defaults;
            }
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => {
                let states = migrate(value, defaults);
                info!(path = %self.path.display(), "game state loaded");
                states
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt game state, starting fresh");
                defaults
            }
        }
    }
}

/// Brings any document shape this server has ever written up to the current
/// `GameStates` layout, merging what it finds into `defaults`.
pub fn migrate(value: Value, mut defaults: GameStates) -> GameStates {
    let Value::Object(data) = value else {
        warn!("game state is not an object, using defaults");
        return defaults;
    };

    if !data.contains_key("games") && data.contains_key("board") {
        info!("migrating single-board game state");
        let chess = &mut defaults.games.chess;
        chess.public = merge_game_state::<Chess>(&chess.public, &data);
        return defaults;
    }

    let Some(Value::Object(games)) = data.get("games") else {
        warn!("game state has no games table, using defaults");
        return defaults;
    };

    if games.contains_key("public") || games.contains_key("seats") {
        info!("migrating chess-only game state");
        merge_pair::<Chess>(&mut defaults.games.chess, games);
        return defaults;
    }

    if let Some(Value::Object(chess)) = games.get("chess") {
        merge_pair::<Chess>(&mut defaults.games.chess, chess);
    }
    if let Some(Value::Object(hnefatafl)) = games.get("hnefatafl") {
        merge_pair::<Hnefatafl>(&mut defaults.games.hnefatafl, hnefatafl);
    }
    defaults
}

fn merge_pair<E: RuleEngine>(pair: &mut GamePair, incoming: &Map<String, Value>) {
    if let Some(Value::Object(public)) = incoming.get("public") {
        pair.public = merge_game_state::<E>(&pair.public, public);
    }
    if let Some(Value::Object(seats)) = incoming.get("seats") {
        pair.seats = merge_game_state::<E>(&pair.seats, seats);
    }
}

/// Field-by-field merge of a stored board over its default. A field that
/// does not deserialize keeps its default value; the rest of the leaf
/// survives.
pub fn merge_game_state<E: RuleEngine>(
    defaults: &GameState,
    incoming: &Map<String, Value>,
) -> GameState {
    let Ok(Value::Object(mut merged)) = serde_json::to_value(defaults) else {
        return defaults.clone();
    };

    for (key, value) in incoming {
        match (key.as_str(), value) {
            ("stats", Value::Object(stats)) => {
                for (k, v) in stats {
                    let mut candidate = match merged.get("stats") {
                        Some(Value::Object(current)) => current.clone(),
                        _ => Map::new(),
                    };
                    candidate.insert(k.clone(), v.clone());
                    accept_field(&mut merged, "stats", Value::Object(candidate));
                }
            }
            ("seats", Value::Object(seats)) => {
                let mut normalized = Map::new();
                normalized.insert("p1".into(), normalize_seat(seats.get("p1")));
                normalized.insert("p2".into(), normalize_seat(seats.get("p2")));
                accept_field(&mut merged, "seats", Value::Object(normalized));
            }
            _ => accept_field(&mut merged, key, value.clone()),
        }
    }

    let mut state = match serde_json::from_value::<GameState>(Value::Object(merged)) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "stored board does not deserialize, using defaults");
            return defaults.clone();
        }
    };
    if let Err(e) = state.decode_board::<E>() {
        warn!(error = %e, "stored board rows are invalid, keeping the default layout");
        state.board = defaults.board.clone();
    }

    match &defaults.seats {
        Some(_) if state.seats.is_none() => state.seats = Some(Default::default()),
        None => state.seats = None,
        _ => {}
    }
    state
}

/// Stores `value` under `key` unless it makes the leaf undeserializable.
fn accept_field(merged: &mut Map<String, Value>, key: &str, value: Value) {
    let previous = merged.insert(key.to_string(), value);
    if serde_json::from_value::<GameState>(Value::Object(merged.clone())).is_ok() {
        return;
    }
    warn!(field = key, "stored field is invalid, keeping default");
    match previous {
        Some(previous) => merged.insert(key.to_string(), previous),
        None => merged.remove(key),
    };
}

/// Older snapshots stored the seat owner under `token`. A seat that still
/// does not describe a valid `Seat` is dropped.
fn normalize_seat(seat: Option<&Value>) -> Value {
    let Some(Value::Object(fields)) = seat else {
        return Value::Null;
    };
    let mut fields = fields.clone();
    if !fields.contains_key("session_id") {
        if let Some(token) = fields.remove("token") {
            fields.insert("session_id".into(), token);
        }
    }
    let value = Value::Object(fields);
    match serde_json::from_value::<Seat>(value.clone()) {
        Ok(_) => value,
        Err(e) => {
            warn!(error = %e, "stored seat is invalid, freeing it");
            Value::Null
        }
    }
}
