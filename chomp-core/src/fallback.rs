//! Non-optimal move choosers.
//!
//! Used when the solver is bypassed, or when the side to move is already lost
//! and any legal move is as good as another.

use rand::Rng;

use crate::{Grid, Pos};

/// Bottom-most remaining square of the right-most non-empty column.
///
/// Columns are scanned right to left, rows bottom to top. On a staircase
/// this is always a corner, so it eats exactly one square.
pub fn sequential_move(grid: &Grid) -> Option<Pos> {
    (0..grid.cols()).rev().find_map(|col| {
        (0..grid.rows())
            .rev()
            .find(|&row| grid.contains(row, col))
            .map(|row| Pos::new(row, col))
    })
}

/// Uniformly random remaining square.
pub fn random_move<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Pos> {
    let remaining = grid.remaining();
    if remaining == 0 {
        return None;
    }
    let pick = rng.random_range(0..remaining);
    grid.legal_moves().nth(pick)
}
