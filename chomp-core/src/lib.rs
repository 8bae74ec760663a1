//! Chomp game state with a bit-packed grid representation.
//!
//! # Grid Encoding
//!
//! ```text
//! Cell (row, col) lives at bit index  row * cols + col  (row-major).
//! Index i is stored in word i / 64, bit i % 64.
//! Bit set   = square still on the board
//! Bit clear = square eaten
//! Padding bits past rows * cols are always zero.
//!
//! 3x4 board, indices:
//!   (0,0)=0  (0,1)=1  (0,2)=2  (0,3)=3
//!   (1,0)=4  (1,1)=5  (1,2)=6  (1,3)=7
//!   (2,0)=8  (2,1)=9  (2,2)=10 (2,3)=11
//! ```
//!
//! Square (0,0) is the poison square. Eating (r, c) eats every square
//! (r', c') with r' >= r and c' >= c, so every reachable grid is a staircase:
//! the remaining squares form an order ideal anchored at (0,0).

pub mod fallback;

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WORD_BITS: usize = 64;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

/// A square on the grid, also used as a move ("eat this square").
///
/// The derived ordering is row-major, matching move enumeration order.
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Pos {
        Pos { row, col }
    }

    /// The poison square.
    pub const POISON: Pos = Pos::new(0, 0);

    /// Row-major bit index on a grid with `cols` columns.
    #[inline]
    pub const fn index(self, cols: usize) -> usize {
        self.row * cols + self.col
    }

    #[inline]
    pub fn is_poison(self) -> bool {
        self == Pos::POISON
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Errors reported by grid operations. All of them leave the grid untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChompError {
    #[error("square ({row}, {col}) is not in the {rows}x{cols} grid")]
    OutOfRange {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },

    #[error("square ({row}, {col}) has already been eaten")]
    IllegalMove { row: usize, col: usize },

    #[error("invalid board dimensions {rows}x{cols}: both must be positive")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("row lengths {lengths:?} do not form a staircase on a {rows}x{cols} grid")]
    InvalidShape {
        lengths: Vec<usize>,
        rows: usize,
        cols: usize,
    },

    #[error("the poison square has been eaten; the game is over")]
    GameOver,

    #[error("grid is {found:?} but this solver is bound to {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

#[inline]
fn signed(value: usize) -> isize {
    isize::try_from(value).unwrap_or(isize::MAX)
}

/// Structural memo key for a grid: the packed cell words.
///
/// Two grids of the same shape with identical cells produce equal keys no
/// matter which move sequence produced them. Keys from grids of different
/// shapes are not comparable in any meaningful way.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct StateKey(Box<[u64]>);

impl StateKey {
    /// Raw packed words.
    pub fn words(&self) -> &[u64] {
        &self.0
    }
}

/// Chomp board state.
///
/// See module documentation for encoding details.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    bits: Vec<u64>,
}

impl Grid {
    /// Create a full board with every square remaining.
    pub fn new(rows: usize, cols: usize) -> Result<Grid, ChompError> {
        let cells = match rows.checked_mul(cols) {
            Some(cells) if rows > 0 && cols > 0 => cells,
            _ => return Err(ChompError::InvalidDimensions { rows, cols }),
        };

        let mut bits = vec![u64::MAX; cells.div_ceil(WORD_BITS)];
        let tail = cells % WORD_BITS;
        if tail != 0 {
            if let Some(last) = bits.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }

        Ok(Grid { rows, cols, bits })
    }

    /// Build a staircase from per-row counts of remaining squares.
    ///
    /// Missing trailing rows are empty. Lengths must be non-increasing and
    /// fit within `cols`.
    pub fn from_row_lengths(
        rows: usize,
        cols: usize,
        lengths: &[usize],
    ) -> Result<Grid, ChompError> {
        let mut grid = Grid::new(rows, cols)?;
        let shape_error = || ChompError::InvalidShape {
            lengths: lengths.to_vec(),
            rows,
            cols,
        };

        if lengths.len() > rows {
            return Err(shape_error());
        }

        let mut prev = cols;
        for row in 0..rows {
            let len = lengths.get(row).copied().unwrap_or(0);
            if len > prev {
                return Err(shape_error());
            }
            grid.clear_row_from(row, len);
            prev = len;
        }

        Ok(grid)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols).
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    fn cells(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    fn bit(&self, idx: usize) -> bool {
        (self.bits[idx / WORD_BITS] >> (idx % WORD_BITS)) & 1 == 1
    }

    #[inline]
    fn clear_bit(&mut self, idx: usize) {
        self.bits[idx / WORD_BITS] &= !(1u64 << (idx % WORD_BITS));
    }

    fn clear_row_from(&mut self, row: usize, col: usize) {
        let start = row * self.cols;
        for idx in start + col..start + self.cols {
            self.clear_bit(idx);
        }
    }

    #[inline]
    fn pos_of(&self, idx: usize) -> Pos {
        Pos::new(idx / self.cols, idx % self.cols)
    }

    // ========== Queries ==========

    /// True iff `0 <= row < rows` and `0 <= col < cols`.
    pub fn is_in_grid(&self, row: isize, col: isize) -> bool {
        match (usize::try_from(row), usize::try_from(col)) {
            (Ok(row), Ok(col)) => row < self.rows && col < self.cols,
            _ => false,
        }
    }

    /// True iff the square is inside the grid and has not been eaten.
    /// Out-of-range queries are logged and answered with `false`.
    pub fn is_eatable(&self, row: isize, col: isize) -> bool {
        if !self.is_in_grid(row, col) {
            debug!(
                "square ({}, {}) is not in the {}x{} grid",
                row, col, self.rows, self.cols
            );
            return false;
        }
        self.contains(row as usize, col as usize)
    }

    /// True iff the square remains. Squares outside the grid count as eaten.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.bit(row * self.cols + col)
    }

    /// Checked form of [`Grid::is_eatable`].
    pub fn check_eatable(&self, row: isize, col: isize) -> Result<Pos, ChompError> {
        if !self.is_in_grid(row, col) {
            return Err(ChompError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.check_pos(Pos::new(row as usize, col as usize))
    }

    /// Validate a typed position against this grid.
    pub fn check_pos(&self, pos: Pos) -> Result<Pos, ChompError> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return Err(ChompError::OutOfRange {
                row: signed(pos.row),
                col: signed(pos.col),
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !self.contains(pos.row, pos.col) {
            return Err(ChompError::IllegalMove {
                row: pos.row,
                col: pos.col,
            });
        }
        Ok(pos)
    }

    /// Number of squares still on the board.
    pub fn remaining(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True once the poison square has been eaten.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.remaining() == self.cells()
    }

    /// Remaining squares in `row` (0 outside the grid).
    pub fn row_len(&self, row: usize) -> usize {
        if row >= self.rows {
            return 0;
        }
        (0..self.cols).filter(|&col| self.contains(row, col)).count()
    }

    /// Remaining squares in `col` (0 outside the grid).
    pub fn col_len(&self, col: usize) -> usize {
        if col >= self.cols {
            return 0;
        }
        (0..self.rows).filter(|&row| self.contains(row, col)).count()
    }

    pub fn row_lengths(&self) -> Vec<usize> {
        (0..self.rows).map(|row| self.row_len(row)).collect()
    }

    /// Check the order-ideal invariant: every remaining square has its upper
    /// and left neighbours remaining.
    pub fn is_staircase(&self) -> bool {
        self.legal_moves().all(|pos| {
            (pos.row == 0 || self.contains(pos.row - 1, pos.col))
                && (pos.col == 0 || self.contains(pos.row, pos.col - 1))
        })
    }

    // ========== Moves ==========

    /// First remaining square at or after row-major index `from`.
    pub fn next_remaining(&self, from: usize) -> Option<Pos> {
        let cells = self.cells();
        let mut idx = from;
        while idx < cells {
            let word = self.bits[idx / WORD_BITS] >> (idx % WORD_BITS);
            if word != 0 {
                let found = idx + word.trailing_zeros() as usize;
                return (found < cells).then(|| self.pos_of(found));
            }
            idx = (idx / WORD_BITS + 1) * WORD_BITS;
        }
        None
    }

    /// Every remaining square in row-major order. Each call starts fresh.
    pub fn legal_moves(&self) -> LegalMoves<'_> {
        LegalMoves {
            grid: self,
            cursor: 0,
        }
    }

    /// Eat `pos` and everything below-right of it, in place.
    fn eat(&mut self, pos: Pos) {
        for row in pos.row..self.rows {
            self.clear_row_from(row, pos.col);
        }
    }

    /// Copy of this grid with `pos` eaten.
    ///
    /// Total: on a staircase, eating a square that is already gone (or lies
    /// outside the grid) changes nothing. Search code feeds it positions
    /// from move enumeration.
    pub fn with_eaten(&self, pos: Pos) -> Grid {
        let mut next = self.clone();
        next.eat(pos);
        next
    }

    /// New grid with (row, col) eaten. The receiver is never modified.
    pub fn apply(&self, row: isize, col: isize) -> Result<Grid, ChompError> {
        let pos = self.check_eatable(row, col)?;
        Ok(self.with_eaten(pos))
    }

    /// Typed form of [`Grid::apply`].
    pub fn apply_move(&self, pos: Pos) -> Result<Grid, ChompError> {
        let pos = self.check_pos(pos)?;
        Ok(self.with_eaten(pos))
    }

    /// Eat (row, col) in place. Reserved for the committed game state.
    pub fn commit(&mut self, row: isize, col: isize) -> Result<(), ChompError> {
        let pos = self.check_eatable(row, col)?;
        self.eat(pos);
        Ok(())
    }

    /// Typed form of [`Grid::commit`].
    pub fn commit_move(&mut self, pos: Pos) -> Result<(), ChompError> {
        let pos = self.check_pos(pos)?;
        self.eat(pos);
        Ok(())
    }

    /// Structural memo key.
    pub fn key(&self) -> StateKey {
        StateKey(self.bits.clone().into_boxed_slice())
    }
}

impl fmt::Display for Grid {
    /// `O` for remaining squares, `X` for eaten ones.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let symbol = if self.contains(row, col) { 'O' } else { 'X' };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Lazy row-major iterator over remaining squares.
pub struct LegalMoves<'a> {
    grid: &'a Grid,
    cursor: usize,
}

impl Iterator for LegalMoves<'_> {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        let pos = self.grid.next_remaining(self.cursor)?;
        self.cursor = pos.index(self.grid.cols) + 1;
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent(), Player::One);
    }

    #[test]
    fn test_pos_index_row_major() {
        assert_eq!(Pos::new(0, 0).index(4), 0);
        assert_eq!(Pos::new(0, 3).index(4), 3);
        assert_eq!(Pos::new(1, 0).index(4), 4);
        assert_eq!(Pos::new(2, 3).index(4), 11);
        assert!(Pos::new(0, 3) < Pos::new(1, 0));
    }

    #[test]
    fn test_grid_new_is_full() {
        let grid = Grid::new(3, 4).unwrap();
        assert_eq!(grid.dims(), (3, 4));
        assert_eq!(grid.remaining(), 12);
        assert!(grid.is_full());
        assert!(!grid.is_empty());
        assert!(grid.is_staircase());
        assert_eq!(grid.row_lengths(), vec![4, 4, 4]);
    }

    #[test]
    fn test_grid_rejects_zero_dimensions() {
        assert_eq!(
            Grid::new(0, 4),
            Err(ChompError::InvalidDimensions { rows: 0, cols: 4 })
        );
        assert!(Grid::new(3, 0).is_err());
    }

    #[test]
    fn test_padding_bits_stay_clear() {
        // 9x9 = 81 cells spans two words; 47 padding bits in the second.
        let grid = Grid::new(9, 9).unwrap();
        assert_eq!(grid.remaining(), 81);
        assert_eq!(grid.key().words().len(), 2);
        assert_eq!(grid.key().words()[1], (1u64 << 17) - 1);
    }

    #[test]
    fn test_is_in_grid() {
        let grid = Grid::new(2, 3).unwrap();
        assert!(grid.is_in_grid(0, 0));
        assert!(grid.is_in_grid(1, 2));
        assert!(!grid.is_in_grid(2, 0));
        assert!(!grid.is_in_grid(0, 3));
        assert!(!grid.is_in_grid(-1, 0));
        assert!(!grid.is_in_grid(0, -1));
    }

    #[test]
    fn test_is_eatable_out_of_range_is_false() {
        let grid = Grid::new(2, 2).unwrap();
        assert!(!grid.is_eatable(-1, 0));
        assert!(!grid.is_eatable(5, 5));
        assert!(grid.is_eatable(1, 1));
    }

    #[test]
    fn test_check_eatable_errors() {
        let grid = Grid::new(2, 2).unwrap().apply(1, 1).unwrap();
        assert_eq!(
            grid.check_eatable(-1, 0),
            Err(ChompError::OutOfRange {
                row: -1,
                col: 0,
                rows: 2,
                cols: 2
            })
        );
        assert_eq!(
            grid.check_eatable(1, 1),
            Err(ChompError::IllegalMove { row: 1, col: 1 })
        );
        assert_eq!(grid.check_eatable(0, 1), Ok(Pos::new(0, 1)));
    }

    #[test]
    fn test_apply_eats_rectangle() {
        let grid = Grid::new(3, 4).unwrap();
        let next = grid.apply(1, 2).unwrap();

        assert_eq!(next.row_lengths(), vec![4, 2, 2]);
        assert!(next.contains(1, 1));
        assert!(!next.contains(1, 2));
        assert!(!next.contains(2, 3));
        assert!(next.contains(0, 3));

        // Parent untouched
        assert!(grid.is_full());
    }

    #[test]
    fn test_apply_illegal_move_leaves_grid_unchanged() {
        let grid = Grid::new(3, 3).unwrap().apply(1, 1).unwrap();
        let before = grid.clone();

        assert_eq!(
            grid.apply(2, 2),
            Err(ChompError::IllegalMove { row: 2, col: 2 })
        );
        assert!(matches!(
            grid.apply(3, 0),
            Err(ChompError::OutOfRange { .. })
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_commit_mutates_in_place() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.commit(1, 1).unwrap();
        assert_eq!(grid.row_lengths(), vec![3, 1]);

        let before = grid.clone();
        assert!(grid.commit(1, 2).is_err());
        assert_eq!(grid, before);

        grid.commit_move(Pos::POISON).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_legal_moves_row_major() {
        let grid = Grid::from_row_lengths(3, 3, &[3, 2, 1]).unwrap();
        let moves: Vec<Pos> = grid.legal_moves().collect();
        assert_eq!(
            moves,
            vec![
                Pos::new(0, 0),
                Pos::new(0, 1),
                Pos::new(0, 2),
                Pos::new(1, 0),
                Pos::new(1, 1),
                Pos::new(2, 0),
            ]
        );

        // Restartable
        assert_eq!(grid.legal_moves().count(), 6);
    }

    #[test]
    fn test_legal_moves_empty_grid() {
        let grid = Grid::new(2, 2).unwrap().apply(0, 0).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.legal_moves().next(), None);
    }

    #[test]
    fn test_next_remaining_crosses_words() {
        let grid = Grid::from_row_lengths(9, 9, &[9, 9, 9, 9, 9, 9, 9, 9, 1]).unwrap();
        // Index 72 = (8, 0) lives in the second word
        assert_eq!(grid.next_remaining(64), Some(Pos::new(7, 1)));
        assert_eq!(grid.next_remaining(72), Some(Pos::new(8, 0)));
        assert_eq!(grid.next_remaining(73), None);
    }

    #[test]
    fn test_key_is_structural() {
        let grid = Grid::new(3, 3).unwrap();
        let a = grid.apply(1, 1).unwrap().apply(0, 2).unwrap();
        let b = grid.apply(0, 2).unwrap().apply(1, 1).unwrap();
        let c = Grid::from_row_lengths(3, 3, &[2, 1, 1]).unwrap();

        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), c.key());
        assert_ne!(a.key(), grid.key());
    }

    #[test]
    fn test_from_row_lengths_validates_shape() {
        assert!(Grid::from_row_lengths(3, 3, &[2, 3]).is_err());
        assert!(Grid::from_row_lengths(3, 3, &[4]).is_err());
        assert!(Grid::from_row_lengths(2, 3, &[1, 1, 1]).is_err());

        let grid = Grid::from_row_lengths(3, 3, &[3, 1]).unwrap();
        assert_eq!(grid.row_lengths(), vec![3, 1, 0]);
        assert_eq!(grid.col_len(0), 2);
        assert_eq!(grid.col_len(2), 1);
        assert!(grid.is_staircase());
    }

    #[test]
    fn test_with_eaten_on_eaten_square_is_noop() {
        let grid = Grid::from_row_lengths(3, 3, &[3, 1]).unwrap();
        assert_eq!(grid.with_eaten(Pos::new(2, 2)), grid);
        assert_eq!(grid.with_eaten(Pos::new(1, 1)), grid);
    }

    #[test]
    fn test_contains_outside_grid_is_false() {
        let grid = Grid::new(2, 2).unwrap();
        assert!(!grid.contains(2, 0));
        assert!(!grid.contains(0, 2));
        assert_eq!(grid.row_len(5), 0);
        assert_eq!(grid.col_len(5), 0);
    }

    #[test]
    fn test_display() {
        let grid = Grid::from_row_lengths(2, 3, &[3, 1]).unwrap();
        assert_eq!(grid.to_string(), "OOO\nOXX\n");
    }

    #[test]
    fn test_pos_serializes_as_object() {
        let json = serde_json::to_string(&Pos::new(2, 1)).unwrap();
        assert_eq!(json, r#"{"row":2,"col":1}"#);
    }

    #[test]
    fn test_error_messages() {
        let err = ChompError::OutOfRange {
            row: -1,
            col: 0,
            rows: 2,
            cols: 3,
        };
        assert_eq!(err.to_string(), "square (-1, 0) is not in the 2x3 grid");
        assert_eq!(
            ChompError::IllegalMove { row: 1, col: 1 }.to_string(),
            "square (1, 1) has already been eaten"
        );
    }
}
