pub mod attacks;
pub mod move_gen;

use rand::Rng;

use crate::domain::board::Board;
use crate::domain::coordinate::Coordinate;
use crate::domain::models::{ChessPiece, GameOutcome, Move, OutcomeKind, PieceType, Player};
use crate::domain::rules::{MoveList, RuleEngine};

pub use attacks::{is_in_check, is_square_attacked};
pub use move_gen::{generate_legal_moves, generate_pseudo_moves};

pub type ChessBoard = Board<ChessPiece>;

pub const SIDE: usize = 8;

pub const INITIAL_ROWS: [&str; SIDE] = [
    "rnbqkbnr",
    "pppppppp",
    "........",
    "........",
    "........",
    "........",
    "PPPPPPPP",
    "RNBQKBNR",
];

pub const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

pub const KING_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub const ROOK_DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Row delta of a pawn advance: player 1 moves up the board.
pub fn pawn_direction(player: Player) -> isize {
    match player {
        Player::One => -1,
        Player::Two => 1,
    }
}

fn pawn_start_row(player: Player) -> usize {
    match player {
        Player::One => SIDE - 2,
        Player::Two => 1,
    }
}

fn promotion_row(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => SIDE - 1,
    }
}

pub struct Chess;

impl Chess {
    /// Relocates the piece; a pawn reaching the far rank becomes a queen.
    pub fn make_move(board: &mut ChessBoard, mv: &Move) {
        let Some(mut piece) = board.take(mv.from) else {
            return;
        };
        if piece.kind == PieceType::Pawn && mv.to.row == promotion_row(piece.owner) {
            piece.kind = PieceType::Queen;
        }
        board.set(mv.to, Some(piece));
    }

    pub fn king_square(board: &ChessBoard, player: Player) -> Option<Coordinate> {
        board.find(ChessPiece::new(PieceType::King, player))
    }
}

impl RuleEngine for Chess {
    type Piece = ChessPiece;

    const SIZE: usize = SIDE;

    fn initial_board() -> ChessBoard {
        Board::from_rows(&INITIAL_ROWS, SIDE).unwrap_or_else(|_| Board::new_empty(SIDE))
    }

    fn opening_player<R: Rng + ?Sized>(_rng: &mut R) -> Player {
        Player::One
    }

    fn legal_moves(board: &ChessBoard, player: Player) -> MoveList {
        generate_legal_moves(board, player)
    }

    fn apply_move(board: &mut ChessBoard, mv: &Move, _player: Player) {
        Self::make_move(board, mv);
    }

    fn check_for_game_end(board: &ChessBoard, side_to_move: Player) -> Option<GameOutcome> {
        if !generate_legal_moves(board, side_to_move).is_empty() {
            return None;
        }
        if is_in_check(board, side_to_move) {
            Some(GameOutcome::win(
                OutcomeKind::Checkmate,
                side_to_move.opponent(),
            ))
        } else {
            Some(GameOutcome::stalemate())
        }
    }
}
