use crate::domain::coordinate::Coordinate;
use crate::domain::models::{ChessPiece, PieceType, Player, TaflPiece};
use std::fmt;

pub const EMPTY_SYMBOL: char = '.';

/// A piece that can be written to and read from the row-string form.
pub trait PieceCode: Copy + Eq + fmt::Debug {
    fn symbol(self) -> char;
    fn from_symbol(symbol: char) -> Option<Self>;
    fn owner(self) -> Player;
}

impl PieceCode for ChessPiece {
    fn symbol(self) -> char {
        let lower = match self.kind {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match self.owner {
            Player::One => lower.to_ascii_uppercase(),
            Player::Two => lower,
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        let kind = match symbol.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        let owner = if symbol.is_ascii_uppercase() {
            Player::One
        } else {
            Player::Two
        };
        Some(ChessPiece::new(kind, owner))
    }

    fn owner(self) -> Player {
        self.owner
    }
}

impl PieceCode for TaflPiece {
    fn symbol(self) -> char {
        match self {
            TaflPiece::King => 'K',
            TaflPiece::Defender => 'D',
            TaflPiece::Attacker => 'A',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'K' => Some(TaflPiece::King),
            'D' => Some(TaflPiece::Defender),
            'A' => Some(TaflPiece::Attacker),
            _ => None,
        }
    }

    fn owner(self) -> Player {
        TaflPiece::owner(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown piece symbol '{0}'")]
    UnknownSymbol(char),
}

/// Square grid of cells, row-major, row 0 at the top.
#[derive(Clone, PartialEq, Eq)]
pub struct Board<P: PieceCode> {
    side: usize,
    cells: Vec<Option<P>>,
}

impl<P: PieceCode> Board<P> {
    pub fn new_empty(side: usize) -> Self {
        Self {
            side,
            cells: vec![None; side * side],
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn get(&self, coord: Coordinate) -> Option<P> {
        self.index(coord).and_then(|i| self.cells[i])
    }

    pub fn is_empty_at(&self, coord: Coordinate) -> bool {
        self.get(coord).is_none()
    }

    pub fn set(&mut self, coord: Coordinate, piece: Option<P>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = piece;
        }
    }

    pub fn take(&mut self, coord: Coordinate) -> Option<P> {
        self.index(coord).and_then(|i| self.cells[i].take())
    }

    /// Owner of the piece on `coord`, if any.
    pub fn owner_at(&self, coord: Coordinate) -> Option<Player> {
        self.get(coord).map(PieceCode::owner)
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.row < self.side && coord.col < self.side
    }

    /// Every occupied square with its piece, in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Coordinate, P)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|p| (Coordinate::new(i / self.side, i % self.side), p))
        })
    }

    pub fn find(&self, piece: P) -> Option<Coordinate> {
        self.pieces().find(|(_, p)| *p == piece).map(|(c, _)| c)
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S], side: usize) -> Result<Self, BoardError> {
        if rows.len() != side {
            return Err(BoardError::RowCount {
                expected: side,
                found: rows.len(),
            });
        }
        let mut board = Self::new_empty(side);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != side {
                return Err(BoardError::RowLength {
                    row: r,
                    expected: side,
                    found,
                });
            }
            for (c, symbol) in row.chars().enumerate() {
                if symbol == EMPTY_SYMBOL {
                    continue;
                }
                let piece = P::from_symbol(symbol).ok_or(BoardError::UnknownSymbol(symbol))?;
                board.cells[r * side + c] = Some(piece);
            }
        }
        Ok(board)
    }

    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.side)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(EMPTY_SYMBOL, PieceCode::symbol))
                    .collect()
            })
            .collect()
    }

    fn index(&self, coord: Coordinate) -> Option<usize> {
        self.contains(coord).then(|| coord.row * self.side + coord.col)
    }
}

impl<P: PieceCode> fmt::Debug for Board<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
