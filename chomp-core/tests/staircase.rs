//! Random playout checks for the grid invariants.
//!
//! Plays seeded random games on a range of board shapes and verifies after
//! every move that the grid shrinks monotonically and stays an order ideal.

use chomp_core::fallback::{random_move, sequential_move};
use chomp_core::{ChompError, Grid, Pos};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SHAPES: [(usize, usize); 8] = [
    (1, 1),
    (1, 6),
    (6, 1),
    (2, 2),
    (3, 5),
    (7, 4),
    (9, 9),
    (12, 7),
];

fn is_subset(child: &Grid, parent: &Grid) -> bool {
    child
        .legal_moves()
        .all(|pos| parent.contains(pos.row, pos.col))
}

/// Every eaten square has all of its below-right neighbours eaten too.
fn eaten_region_is_closed(grid: &Grid) -> bool {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if grid.contains(row, col) {
                continue;
            }
            for r in row..grid.rows() {
                for c in col..grid.cols() {
                    if grid.contains(r, c) {
                        return false;
                    }
                }
            }
        }
    }
    true
}

#[test]
fn test_random_playouts_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0xC40B);

    for &(rows, cols) in &SHAPES {
        for _ in 0..25 {
            let mut grid = Grid::new(rows, cols).unwrap();

            while let Some(mov) = random_move(&grid, &mut rng) {
                let next = grid.apply_move(mov).unwrap();

                assert!(next.remaining() < grid.remaining());
                assert!(is_subset(&next, &grid));
                assert!(next.is_staircase(), "not a staircase:\n{}", next);
                assert!(eaten_region_is_closed(&next), "not closed:\n{}", next);

                grid = next;
            }

            assert!(grid.is_empty());
        }
    }
}

#[test]
fn test_apply_matches_commit() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut committed = Grid::new(6, 5).unwrap();

    while let Some(mov) = random_move(&committed, &mut rng) {
        let copied = committed.apply_move(mov).unwrap();
        committed.commit_move(mov).unwrap();
        assert_eq!(copied, committed);
        assert_eq!(copied.key(), committed.key());
    }
}

#[test]
fn test_sequential_playout_eats_one_square_per_move() {
    let mut grid = Grid::new(4, 5).unwrap();
    let mut moves = 0;

    while let Some(mov) = sequential_move(&grid) {
        let before = grid.remaining();
        grid.commit_move(mov).unwrap();
        assert_eq!(grid.remaining(), before - 1);
        moves += 1;
    }

    assert_eq!(moves, 20);
    assert!(grid.is_empty());
}

#[test]
fn test_moves_after_game_over_are_rejected() {
    let grid = Grid::new(3, 3).unwrap().apply(0, 0).unwrap();

    assert_eq!(grid.remaining(), 0);
    assert_eq!(
        grid.apply_move(Pos::POISON),
        Err(ChompError::IllegalMove { row: 0, col: 0 })
    );
    assert!(!grid.is_eatable(-1, 0));
}
