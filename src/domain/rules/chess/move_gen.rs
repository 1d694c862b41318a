use crate::domain::coordinate::Coordinate;
use crate::domain::models::{Move, PieceType, Player};
use crate::domain::rules::MoveList;
use crate::domain::rules::chess::attacks::is_in_check;
use crate::domain::rules::chess::{
    BISHOP_DIRECTIONS, Chess, ChessBoard, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS,
    pawn_direction, pawn_start_row,
};

pub fn generate_legal_moves(board: &ChessBoard, player: Player) -> MoveList {
    let mut moves = MoveList::new();
    for (from, piece) in board.pieces() {
        if piece.owner != player {
            continue;
        }
        for mv in generate_pseudo_moves(board, from) {
            if !leaves_king_in_check(board, player, &mv) {
                moves.push(mv);
            }
        }
    }
    moves
}

pub fn leaves_king_in_check(board: &ChessBoard, player: Player, mv: &Move) -> bool {
    let mut scratch = board.clone();
    Chess::make_move(&mut scratch, mv);
    is_in_check(&scratch, player)
}

/// Candidate moves of the piece on `from`, ignoring self-check.
pub fn generate_pseudo_moves(board: &ChessBoard, from: Coordinate) -> MoveList {
    let mut moves = MoveList::new();
    let Some(piece) = board.get(from) else {
        return moves;
    };

    match piece.kind {
        PieceType::Pawn => generate_pawn_moves(board, from, piece.owner, &mut moves),
        PieceType::Knight => {
            generate_leaper_moves(board, from, piece.owner, &KNIGHT_OFFSETS, &mut moves)
        }
        PieceType::King => {
            generate_leaper_moves(board, from, piece.owner, &KING_OFFSETS, &mut moves)
        }
        PieceType::Rook => {
            generate_slider_moves(board, from, piece.owner, &ROOK_DIRECTIONS, &mut moves)
        }
        PieceType::Bishop => {
            generate_slider_moves(board, from, piece.owner, &BISHOP_DIRECTIONS, &mut moves)
        }
        PieceType::Queen => {
            generate_slider_moves(board, from, piece.owner, &ROOK_DIRECTIONS, &mut moves);
            generate_slider_moves(board, from, piece.owner, &BISHOP_DIRECTIONS, &mut moves);
        }
    }
    moves
}

fn generate_pawn_moves(board: &ChessBoard, from: Coordinate, player: Player, moves: &mut MoveList) {
    let side = board.side();
    let dir = pawn_direction(player);

    if let Some(one) = from.offset(dir, 0, side) {
        if board.is_empty_at(one) {
            moves.push(Move::new(from, one));
            if from.row == pawn_start_row(player) {
                if let Some(two) = from.offset(dir * 2, 0, side) {
                    if board.is_empty_at(two) {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(target) = from.offset(dir, dc, side) {
            if board.owner_at(target) == Some(player.opponent()) {
                moves.push(Move::new(from, target));
            }
        }
    }
}

fn generate_leaper_moves(
    board: &ChessBoard,
    from: Coordinate,
    player: Player,
    offsets: &[(isize, isize)],
    moves: &mut MoveList,
) {
    for &(dr, dc) in offsets {
        if let Some(target) = from.offset(dr, dc, board.side()) {
            if board.owner_at(target) != Some(player) {
                moves.push(Move::new(from, target));
            }
        }
    }
}

fn generate_slider_moves(
    board: &ChessBoard,
    from: Coordinate,
    player: Player,
    directions: &[(isize, isize)],
    moves: &mut MoveList,
) {
    for &(dr, dc) in directions {
        let mut current = from;
        while let Some(target) = current.offset(dr, dc, board.side()) {
            match board.owner_at(target) {
                None => moves.push(Move::new(from, target)),
                Some(owner) => {
                    if owner != player {
                        moves.push(Move::new(from, target));
                    }
                    break;
                }
            }
            current = target;
        }
    }
}
