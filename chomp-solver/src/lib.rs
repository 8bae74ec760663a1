//! Chomp Solver
//!
//! Decides whether the player to move in a Chomp position can force a win,
//! using exhaustive search over memoized states with closed-form shortcuts
//! for small positions, and drives games turn by turn.
//!
//! ```
//! use chomp_solver::{Grid, Solver};
//!
//! let grid = Grid::new(3, 3).unwrap();
//! let mut solver = Solver::for_grid(&grid);
//! let mv = solver.best_move(&grid).unwrap().unwrap();
//! assert_eq!((mv.row, mv.col), (1, 1));
//! ```

pub mod config;
pub mod game;
pub mod movegen;
pub mod solver;
pub mod stats;
pub mod trivial;

pub use chomp_core::{ChompError, Grid, Player, Pos, StateKey};
pub use config::SolverConfig;
pub use game::{Fallback, Game, GameSummary, MoveSource, Turn};
pub use solver::{Outcome, Solver, Verdict};
