//! Resumable move generator for the search stack.
//!
//! Each search frame owns its grid, so it cannot also hold a borrowing
//! iterator over it. The generator keeps only a cursor and is handed the grid
//! on every call, resuming where it left off.

use chomp_core::{Grid, Pos};

/// Row-major move generator over remaining squares.
pub struct MoveGenerator {
    /// Row-major index of the next square to examine
    cursor: usize,
    cols: usize,
}

impl MoveGenerator {
    pub fn new(grid: &Grid) -> Self {
        Self {
            cursor: 0,
            cols: grid.cols(),
        }
    }

    /// Get the next legal move, or None if exhausted.
    pub fn next(&mut self, grid: &Grid) -> Option<Pos> {
        let pos = grid.next_remaining(self.cursor)?;
        self.cursor = pos.index(self.cols) + 1;
        Some(pos)
    }
}
