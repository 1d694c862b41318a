pub mod capture;

use rand::Rng;

use crate::domain::board::Board;
use crate::domain::coordinate::Coordinate;
use crate::domain::models::{GameOutcome, Move, OutcomeKind, Player, TaflPiece};
use crate::domain::rules::{MoveList, RuleEngine};

pub use capture::{all_castles_blocked, collect_captures, is_king_captured, is_king_on_castle};

pub type TaflBoard = Board<TaflPiece>;

pub const SIDE: usize = 9;

pub const THRONE: Coordinate = Coordinate::new(4, 4);

pub const CASTLES: [Coordinate; 4] = [
    Coordinate::new(0, 0),
    Coordinate::new(0, SIDE - 1),
    Coordinate::new(SIDE - 1, 0),
    Coordinate::new(SIDE - 1, SIDE - 1),
];

pub const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub const INITIAL_ROWS: [&str; SIDE] = [
    "...AAA...",
    "....A....",
    "....D....",
    "A...D...A",
    "AADDKDDAA",
    "A...D...A",
    "....D....",
    "....A....",
    "...AAA...",
];

pub fn is_special_square(coord: Coordinate) -> bool {
    coord == THRONE || CASTLES.contains(&coord)
}

/// In-bounds orthogonal neighbours of `coord`.
pub fn neighbours(coord: Coordinate) -> impl Iterator<Item = Coordinate> {
    ORTHOGONAL
        .into_iter()
        .filter_map(move |(dr, dc)| coord.offset(dr, dc, SIDE))
}

/// Rook-like slide over empty squares; only the king may cross or land on the
/// throne and the castles.
pub fn path_clear(board: &TaflBoard, mv: &Move, piece: TaflPiece) -> bool {
    let (from, to) = (mv.from, mv.to);
    if from == to || (from.row != to.row && from.col != to.col) {
        return false;
    }
    if !board.contains(to) || !board.is_empty_at(to) {
        return false;
    }
    let may_use_special = piece == TaflPiece::King;
    if !may_use_special && is_special_square(to) {
        return false;
    }

    let step_row = (to.row as isize - from.row as isize).signum();
    let step_col = (to.col as isize - from.col as isize).signum();
    let mut current = from;
    while let Some(next) = current.offset(step_row, step_col, SIDE) {
        if next == to {
            return true;
        }
        if !board.is_empty_at(next) || (!may_use_special && is_special_square(next)) {
            return false;
        }
        current = next;
    }
    false
}

pub struct Hnefatafl;

impl Hnefatafl {
    /// Moves the piece and removes every enemy it sandwiches.
    pub fn make_move(board: &mut TaflBoard, mv: &Move, player: Player) -> Vec<Coordinate> {
        let piece = board.take(mv.from);
        board.set(mv.to, piece);
        let captures = collect_captures(board, mv.to, player);
        for &square in &captures {
            board.set(square, None);
        }
        captures
    }
}

impl RuleEngine for Hnefatafl {
    type Piece = TaflPiece;

    const SIZE: usize = SIDE;

    fn initial_board() -> TaflBoard {
        Board::from_rows(&INITIAL_ROWS, SIDE).unwrap_or_else(|_| Board::new_empty(SIDE))
    }

    fn opening_player<R: Rng + ?Sized>(rng: &mut R) -> Player {
        if rng.gen_range(0..2) == 0 {
            Player::One
        } else {
            Player::Two
        }
    }

    fn legal_moves(board: &TaflBoard, player: Player) -> MoveList {
        let mut moves = MoveList::new();
        for (from, piece) in board.pieces() {
            if piece.owner() != player {
                continue;
            }
            for (dr, dc) in ORTHOGONAL {
                let mut current = from;
                while let Some(to) = current.offset(dr, dc, SIDE) {
                    if !board.is_empty_at(to) {
                        break;
                    }
                    let mv = Move::new(from, to);
                    if Self::is_legal(board, &mv, player) {
                        moves.push(mv);
                    }
                    current = to;
                }
            }
        }
        moves
    }

    fn is_legal(board: &TaflBoard, mv: &Move, player: Player) -> bool {
        let Some(piece) = board.get(mv.from) else {
            return false;
        };
        if piece.owner() != player || !path_clear(board, mv, piece) {
            return false;
        }
        if player == Player::Two {
            let mut scratch = board.clone();
            Self::make_move(&mut scratch, mv, player);
            if all_castles_blocked(&scratch) {
                return false;
            }
        }
        true
    }

    fn apply_move(board: &mut TaflBoard, mv: &Move, player: Player) {
        Self::make_move(board, mv, player);
    }

    fn check_for_game_end(board: &TaflBoard, _side_to_move: Player) -> Option<GameOutcome> {
        if is_king_on_castle(board) {
            return Some(GameOutcome::win(OutcomeKind::Escape, Player::One));
        }
        if is_king_captured(board) {
            return Some(GameOutcome::win(OutcomeKind::Capture, Player::Two));
        }
        None
    }
}
