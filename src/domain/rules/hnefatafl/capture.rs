use crate::domain::coordinate::Coordinate;
use crate::domain::models::{Player, TaflPiece};
use crate::domain::rules::hnefatafl::{CASTLES, ORTHOGONAL, SIDE, TaflBoard, neighbours};

/// Enemy soldiers sandwiched between the piece on `landing` and a friendly
/// piece beyond them. The king is never taken this way.
pub fn collect_captures(board: &TaflBoard, landing: Coordinate, player: Player) -> Vec<Coordinate> {
    let mut captures = Vec::new();
    for (dr, dc) in ORTHOGONAL {
        let Some(adjacent) = landing.offset(dr, dc, SIDE) else {
            continue;
        };
        match board.get(adjacent) {
            Some(piece) if piece.owner() != player && piece != TaflPiece::King => {}
            _ => continue,
        }
        let Some(beyond) = adjacent.offset(dr, dc, SIDE) else {
            continue;
        };
        if board.get(beyond).is_some_and(|p| p.owner() == player) {
            captures.push(adjacent);
        }
    }
    captures
}

/// True when every in-bounds neighbour of the king holds an attacker, or when
/// the king is gone.
pub fn is_king_captured(board: &TaflBoard) -> bool {
    let Some(king) = board.find(TaflPiece::King) else {
        return true;
    };
    neighbours(king).all(|n| board.get(n) == Some(TaflPiece::Attacker))
}

pub fn is_king_on_castle(board: &TaflBoard) -> bool {
    CASTLES
        .iter()
        .any(|&castle| board.get(castle) == Some(TaflPiece::King))
}

pub fn is_castle_blocked(board: &TaflBoard, castle: Coordinate) -> bool {
    let adjacent: Vec<Coordinate> = neighbours(castle).collect();
    adjacent.len() == 2
        && adjacent
            .iter()
            .all(|&n| board.get(n) == Some(TaflPiece::Attacker))
}

pub fn all_castles_blocked(board: &TaflBoard) -> bool {
    CASTLES
        .iter()
        .all(|&castle| is_castle_blocked(board, castle))
}
