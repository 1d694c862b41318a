use crate::domain::coordinate::Coordinate;
use crate::domain::models::{PieceType, Player};
use crate::domain::rules::chess::{
    BISHOP_DIRECTIONS, Chess, ChessBoard, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS,
    pawn_direction,
};

pub fn is_in_check(board: &ChessBoard, player: Player) -> bool {
    match Chess::king_square(board, player) {
        Some(king) => is_square_attacked(board, king, player.opponent()),
        None => false,
    }
}

pub fn is_square_attacked(board: &ChessBoard, square: Coordinate, by_player: Player) -> bool {
    let side = board.side();
    let enemy_on = |coord: Coordinate, kind: PieceType| {
        board
            .get(coord)
            .is_some_and(|p| p.owner == by_player && p.kind == kind)
    };

    for &(dr, dc) in &KNIGHT_OFFSETS {
        if let Some(target) = square.offset(dr, dc, side) {
            if enemy_on(target, PieceType::Knight) {
                return true;
            }
        }
    }

    for &(dr, dc) in &KING_OFFSETS {
        if let Some(target) = square.offset(dr, dc, side) {
            if enemy_on(target, PieceType::King) {
                return true;
            }
        }
    }

    for &dir in &ROOK_DIRECTIONS {
        if scan_ray_for_threat(board, square, dir, by_player, &[PieceType::Rook, PieceType::Queen]) {
            return true;
        }
    }

    for &dir in &BISHOP_DIRECTIONS {
        if scan_ray_for_threat(
            board,
            square,
            dir,
            by_player,
            &[PieceType::Bishop, PieceType::Queen],
        ) {
            return true;
        }
    }

    // An attacking pawn sits one step behind the square along its own advance.
    let back = -pawn_direction(by_player);
    for dc in [-1, 1] {
        if let Some(target) = square.offset(back, dc, side) {
            if enemy_on(target, PieceType::Pawn) {
                return true;
            }
        }
    }

    false
}

/// Walks from `origin` in `direction` and reports whether the first piece met
/// belongs to `attacker` and is one of `threat_types`.
pub fn scan_ray_for_threat(
    board: &ChessBoard,
    origin: Coordinate,
    direction: (isize, isize),
    attacker: Player,
    threat_types: &[PieceType],
) -> bool {
    let mut current = origin;
    while let Some(next) = current.offset(direction.0, direction.1, board.side()) {
        if let Some(piece) = board.get(next) {
            return piece.owner == attacker && threat_types.contains(&piece.kind);
        }
        current = next;
    }
    false
}
