pub mod chess;
pub mod hnefatafl;

use rand::Rng;
use smallvec::SmallVec;

use crate::domain::board::{Board, PieceCode};
use crate::domain::models::{GameOutcome, Move, Player};

pub use chess::Chess;
pub use hnefatafl::Hnefatafl;

pub type MoveList = SmallVec<[Move; 64]>;

/// The capability the session layer needs from a game's rules.
///
/// Engines are stateless; every call works on the board it is given.
pub trait RuleEngine {
    type Piece: PieceCode;

    /// Board side length.
    const SIZE: usize;

    fn initial_board() -> Board<Self::Piece>;

    /// Side that moves first in a freshly created game.
    fn opening_player<R: Rng + ?Sized>(rng: &mut R) -> Player;

    fn legal_moves(board: &Board<Self::Piece>, player: Player) -> MoveList;

    fn is_legal(board: &Board<Self::Piece>, mv: &Move, player: Player) -> bool {
        Self::legal_moves(board, player).contains(mv)
    }

    /// Applies an already validated move, including any side effects
    /// (promotion, captures).
    fn apply_move(board: &mut Board<Self::Piece>, mv: &Move, player: Player);

    /// `None` while the game continues.
    fn check_for_game_end(board: &Board<Self::Piece>, side_to_move: Player) -> Option<GameOutcome>;
}
