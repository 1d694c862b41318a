use serde::{Deserialize, Serialize};
use std::fmt;

/// A square on a square board. Row 0 is the top rank (rank `size`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parses a file letter followed by a rank digit, e.g. `e2`.
    pub fn parse(text: &str, size: usize) -> Option<Self> {
        let mut chars = text.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => (f, r),
            _ => return None,
        };
        if !file.is_ascii_lowercase() {
            return None;
        }
        let col = (file as u8 - b'a') as usize;
        if col >= size {
            return None;
        }
        let rank = rank.to_digit(10)? as usize;
        if rank == 0 || rank > size {
            return None;
        }
        Some(Self::new(size - rank, col))
    }

    /// Applies a signed offset, staying within a `size`×`size` board.
    pub fn offset(&self, d_row: isize, d_col: isize, size: usize) -> Option<Self> {
        let row = self.row as isize + d_row;
        let col = self.col as isize + d_col;
        if row < 0 || col < 0 || row >= size as isize || col >= size as isize {
            return None;
        }
        Some(Self::new(row as usize, col as usize))
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
