//! Turn-by-turn game driver.
//!
//! Holds the committed grid and lets the solver (or a human) move until the
//! poison square is eaten. A side that cannot force a win plays the
//! configured fallback move instead.

use chomp_core::fallback::{random_move, sequential_move};
use chomp_core::{ChompError, Grid, Player, Pos};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::solver::Solver;

/// Move chooser for a lost position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    #[default]
    Sequential,
    Random,
}

/// Who picked a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    Solver,
    Fallback,
    Human,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub player: Player,
    #[serde(rename = "move")]
    pub mv: Pos,
    pub source: MoveSource,
}

/// End-of-game report.
#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub rows: usize,
    pub cols: usize,
    pub turns: Vec<Turn>,
    pub winner: Option<Player>,
    pub loser: Option<Player>,
    pub winning_states: usize,
    pub losing_states: usize,
}

pub struct Game {
    grid: Grid,
    solver: Solver,
    to_move: Player,
    turns: Vec<Turn>,
    fallback: Fallback,
    rng: StdRng,
}

impl Game {
    pub fn new(rows: usize, cols: usize, config: SolverConfig) -> Result<Game, ChompError> {
        let grid = Grid::new(rows, cols)?;
        Ok(Game {
            grid,
            solver: Solver::with_config(rows, cols, config),
            to_move: Player::One,
            turns: Vec::new(),
            fallback: Fallback::default(),
            rng: StdRng::from_os_rng(),
        })
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Seed the random fallback for reproducible games.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.grid.is_empty()
    }

    /// The player who ate the poison square.
    pub fn loser(&self) -> Option<Player> {
        if !self.is_over() {
            return None;
        }
        self.turns.last().map(|turn| turn.player)
    }

    pub fn winner(&self) -> Option<Player> {
        self.loser().map(Player::opponent)
    }

    /// Let the solver move for the current player.
    pub fn play_solver_turn(&mut self) -> Result<Turn, ChompError> {
        if self.is_over() {
            return Err(ChompError::GameOver);
        }

        let (mv, source) = match self.solver.best_move(&self.grid)? {
            Some(mv) => (mv, MoveSource::Solver),
            None => {
                let mv = self.fallback_move().ok_or(ChompError::GameOver)?;
                (mv, MoveSource::Fallback)
            }
        };
        self.commit(mv, source)
    }

    /// Play a human-entered move. Rejected moves leave the game unchanged.
    pub fn play_human_turn(&mut self, row: isize, col: isize) -> Result<Turn, ChompError> {
        if self.is_over() {
            return Err(ChompError::GameOver);
        }
        let mv = self.grid.check_eatable(row, col)?;
        self.commit(mv, MoveSource::Human)
    }

    fn fallback_move(&mut self) -> Option<Pos> {
        match self.fallback {
            Fallback::Sequential => sequential_move(&self.grid),
            Fallback::Random => random_move(&self.grid, &mut self.rng),
        }
    }

    fn commit(&mut self, mv: Pos, source: MoveSource) -> Result<Turn, ChompError> {
        self.grid.commit_move(mv)?;
        let turn = Turn {
            player: self.to_move,
            mv,
            source,
        };
        self.turns.push(turn);
        self.to_move = self.to_move.opponent();
        Ok(turn)
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            turns: self.turns.clone(),
            winner: self.winner(),
            loser: self.loser(),
            winning_states: self.solver.winning_states(),
            losing_states: self.solver.losing_states(),
        }
    }
}
