//! Closed-form verdicts for small and degenerate positions.
//!
//! Every rule assumes a staircase grid. Squares outside the grid count as
//! eaten, so the two-row and two-column rules also cover boards that only
//! have two rows or columns to begin with.

use chomp_core::Grid;

use crate::solver::Outcome;

#[inline]
fn loss_if(lost: bool) -> Outcome {
    if lost {
        Outcome::Loss
    } else {
        Outcome::Win
    }
}

/// Classify `grid` for the player to move without searching.
///
/// An empty grid is a win: the previous mover ate the poison square.
pub fn classify(grid: &Grid) -> Option<Outcome> {
    match grid.remaining() {
        0 => return Some(Outcome::Win),
        // Only the poison square is left
        1 => return Some(Outcome::Loss),
        // Eat the square next to the poison
        2 => return Some(Outcome::Win),
        _ => {}
    }

    // Single row or single column: eat down to the poison square
    if grid.row_len(0) == 1 || grid.col_len(0) == 1 {
        return Some(Outcome::Win);
    }

    // Strategy stealing
    if grid.is_full() {
        return Some(Outcome::Win);
    }

    // L shape: two Nim heaps, lost iff the arms are equal
    if !grid.contains(1, 1) {
        return Some(loss_if(grid.row_len(0) == grid.col_len(0)));
    }

    // Two rows: lost iff the first is exactly one longer
    if !grid.contains(2, 0) {
        return Some(loss_if(grid.row_len(0) == grid.row_len(1) + 1));
    }

    // Two columns, by symmetry
    if !grid.contains(0, 2) {
        return Some(loss_if(grid.col_len(0) == grid.col_len(1) + 1));
    }

    None
}
