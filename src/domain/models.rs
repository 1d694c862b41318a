use crate::domain::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid player number {0}")]
pub struct InvalidPlayerNumber(pub u8);

/// A side of the board. Serialized as the player number (`1` or `2`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(&self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.number()
    }
}

impl TryFrom<u8> for Player {
    type Error = InvalidPlayerNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(InvalidPlayerNumber(other)),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Seat number as reported to callers: `0` is a spectator.
pub fn seat_number(player: Option<Player>) -> u8 {
    player.map_or(0, |p| p.number())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Chess,
    Hnefatafl,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Chess => "chess",
            GameKind::Hnefatafl => "hnefatafl",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chess" => Ok(GameKind::Chess),
            "hnefatafl" => Ok(GameKind::Hnefatafl),
            other => Err(format!("unknown game '{other}'")),
        }
    }
}

/// Which of the two boards of a game is addressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    #[default]
    Public,
    Seats,
}

impl Selector {
    /// Anything other than `seats` addresses the public board.
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode {
            Some(m) if m.eq_ignore_ascii_case("seats") => Selector::Seats,
            _ => Selector::Public,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Selector::Public => "public",
            Selector::Seats => "seats",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChessPiece {
    pub kind: PieceType,
    pub owner: Player,
}

impl ChessPiece {
    pub const fn new(kind: PieceType, owner: Player) -> Self {
        Self { kind, owner }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaflPiece {
    King,
    Defender,
    Attacker,
}

impl TaflPiece {
    pub fn owner(&self) -> Player {
        match self {
            TaflPiece::King | TaflPiece::Defender => Player::One,
            TaflPiece::Attacker => Player::Two,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Coordinate,
    pub to: Coordinate,
}

impl Move {
    pub fn new(from: Coordinate, to: Coordinate) -> Self {
        Self { from, to }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Checkmate,
    Draw,
    Escape,
    Capture,
}

/// Terminal result of a game as reported to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub title: OutcomeKind,
    pub message: String,
    pub winner: Option<Player>,
}

impl GameOutcome {
    pub fn win(title: OutcomeKind, winner: Player) -> Self {
        Self {
            title,
            message: format!("Winner: {winner}"),
            winner: Some(winner),
        }
    }

    pub fn stalemate() -> Self {
        Self {
            title: OutcomeKind::Draw,
            message: "Stalemate".to_string(),
            winner: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Player::Two).unwrap(), "2");
        let p: Player = serde_json::from_str("1").unwrap();
        assert_eq!(p, Player::One);
        assert!(serde_json::from_str::<Player>("3").is_err());
    }

    #[test]
    fn test_selector_from_mode() {
        assert_eq!(Selector::from_mode(Some("seats")), Selector::Seats);
        assert_eq!(Selector::from_mode(Some("SEATS")), Selector::Seats);
        assert_eq!(Selector::from_mode(Some("anything")), Selector::Public);
        assert_eq!(Selector::from_mode(None), Selector::Public);
    }

    #[test]
    fn test_outcome_messages() {
        let win = GameOutcome::win(OutcomeKind::Checkmate, Player::Two);
        assert_eq!(win.message, "Winner: Player 2");
        let json = serde_json::to_value(&win).unwrap();
        assert_eq!(json["title"], "Checkmate");
        assert_eq!(json["winner"], 2);
        assert_eq!(serde_json::to_value(GameOutcome::stalemate()).unwrap()["winner"], serde_json::Value::Null);
    }
}
