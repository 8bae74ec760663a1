//! Iterative win/loss solver with memo tables.
//!
//! A position is a win for the player to move iff some move leads to a
//! position that is a loss for the opponent. The search walks the game tree
//! depth-first on an explicit stack of frames, trying moves in row-major
//! order and stopping at the first losing child. Every state resolved this
//! way is recorded once, in the winning table with its move or in the losing
//! table.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chomp_core::{ChompError, Grid, Pos, StateKey};
use log::warn;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::Xxh64Builder;

use crate::config::SolverConfig;
use crate::movegen::MoveGenerator;
use crate::stats::SolverStats;
use crate::trivial;

/// Result for the player to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

/// Verdict for the player to move, with the winning move when one is known.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Verdict {
    /// Playing this move leaves the opponent in a lost position.
    Win(Pos),
    /// Won in closed form; no particular move was named.
    TrivialWin,
    /// Every move leaves the opponent a winning position.
    Loss,
}

impl Verdict {
    #[inline]
    pub fn outcome(self) -> Outcome {
        match self {
            Verdict::Win(_) | Verdict::TrivialWin => Outcome::Win,
            Verdict::Loss => Outcome::Loss,
        }
    }

    #[inline]
    pub fn is_win(self) -> bool {
        self.outcome() == Outcome::Win
    }

    #[inline]
    pub fn winning_move(self) -> Option<Pos> {
        match self {
            Verdict::Win(mv) => Some(mv),
            _ => None,
        }
    }
}

/// Stack frame for iterative search.
struct Frame {
    grid: Grid,
    key: StateKey,
    moves: MoveGenerator,
    /// Move whose child was examined last
    pending: Option<Pos>,
}

impl Frame {
    fn new(grid: Grid, key: StateKey) -> Self {
        let moves = MoveGenerator::new(&grid);
        Self {
            grid,
            key,
            moves,
            pending: None,
        }
    }
}

enum Step {
    /// Child needs its own frame
    Descend(Grid, StateKey),
    /// Top frame is decided
    Resolved(Verdict),
}

enum Probe {
    Known(Outcome),
    Unknown(StateKey),
}

/// Memoizing solver bound to one board shape.
pub struct Solver {
    rows: usize,
    cols: usize,
    /// Won states -> move that wins
    winning: HashMap<StateKey, Pos, Xxh64Builder>,
    /// Lost states
    losing: HashSet<StateKey, Xxh64Builder>,
    /// Solver statistics
    pub stats: SolverStats,
    config: SolverConfig,
}

impl Solver {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_config(rows, cols, SolverConfig::default())
    }

    pub fn with_config(rows: usize, cols: usize, config: SolverConfig) -> Self {
        Self {
            rows,
            cols,
            winning: HashMap::with_hasher(Xxh64Builder::new(0)),
            losing: HashSet::with_hasher(Xxh64Builder::new(0)),
            stats: SolverStats::new(),
            config,
        }
    }

    /// Solver for grids shaped like `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.rows(), grid.cols())
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of states recorded as wins.
    pub fn winning_states(&self) -> usize {
        self.winning.len()
    }

    /// Number of states recorded as losses.
    pub fn losing_states(&self) -> usize {
        self.losing.len()
    }

    fn check_dims(&self, grid: &Grid) -> Result<(), ChompError> {
        if grid.dims() != self.dims() {
            return Err(ChompError::DimensionMismatch {
                expected: self.dims(),
                found: grid.dims(),
            });
        }
        Ok(())
    }

    fn lookup_key(&self, key: &StateKey) -> Option<Verdict> {
        if let Some(&mv) = self.winning.get(key) {
            return Some(Verdict::Win(mv));
        }
        self.losing.contains(key).then_some(Verdict::Loss)
    }

    /// Memo verdict for `grid`, without searching.
    pub fn lookup(&self, grid: &Grid) -> Option<Verdict> {
        if grid.dims() != self.dims() {
            return None;
        }
        self.lookup_key(&grid.key())
    }

    /// Decide whether the player to move in `grid` can force a win.
    ///
    /// Closed-form positions come back as [`Verdict::TrivialWin`] or
    /// [`Verdict::Loss`] and are not memoized. An empty grid is rejected
    /// with [`ChompError::GameOver`].
    pub fn evaluate(&mut self, grid: &Grid) -> Result<Verdict, ChompError> {
        self.check_dims(grid)?;
        if grid.is_empty() {
            return Err(ChompError::GameOver);
        }

        if self.config.shortcuts {
            if let Some(outcome) = trivial::classify(grid) {
                self.stats.trivial_hits += 1;
                return Ok(match outcome {
                    Outcome::Win => Verdict::TrivialWin,
                    Outcome::Loss => Verdict::Loss,
                });
            }
        }

        let key = grid.key();
        if let Some(verdict) = self.lookup_key(&key) {
            self.stats.cache_hits += 1;
            return Ok(verdict);
        }

        Ok(self.search(grid.clone(), key))
    }

    /// A concrete winning move, or None when the position is lost.
    ///
    /// Closed-form wins are resolved by evaluating children in row-major
    /// order until one is a loss for the opponent.
    pub fn best_move(&mut self, grid: &Grid) -> Result<Option<Pos>, ChompError> {
        match self.evaluate(grid)? {
            Verdict::Win(mv) => Ok(Some(mv)),
            Verdict::Loss => Ok(None),
            Verdict::TrivialWin => {
                for mv in grid.legal_moves() {
                    let child = grid.with_eaten(mv);
                    if child.is_empty() {
                        continue;
                    }
                    if self.evaluate(&child)? == Verdict::Loss {
                        return Ok(Some(mv));
                    }
                }
                warn!("closed-form win has no losing reply:\n{}", grid);
                Ok(None)
            }
        }
    }

    /// Terminal, closed-form, then memo answer for a child state.
    fn probe(&mut self, grid: &Grid) -> Probe {
        if grid.is_empty() {
            self.stats.terminal_positions += 1;
            return Probe::Known(Outcome::Win);
        }

        if self.config.shortcuts {
            if let Some(outcome) = trivial::classify(grid) {
                self.stats.trivial_hits += 1;
                return Probe::Known(outcome);
            }
        }

        let key = grid.key();
        match self.lookup_key(&key) {
            Some(verdict) => {
                self.stats.cache_hits += 1;
                Probe::Known(verdict.outcome())
            }
            None => Probe::Unknown(key),
        }
    }

    /// Try the frame's remaining moves until one decides it or needs a
    /// deeper frame.
    fn advance(&mut self, frame: &mut Frame) -> Step {
        while let Some(mv) = frame.moves.next(&frame.grid) {
            let child = frame.grid.with_eaten(mv);
            frame.pending = Some(mv);
            self.stats.children_generated += 1;

            match self.probe(&child) {
                Probe::Known(Outcome::Loss) => return Step::Resolved(Verdict::Win(mv)),
                Probe::Known(Outcome::Win) => continue,
                Probe::Unknown(key) => return Step::Descend(child, key),
            }
        }
        Step::Resolved(Verdict::Loss)
    }

    fn record(&mut self, key: StateKey, verdict: Verdict) {
        self.stats.record_resolved(verdict);
        match verdict {
            Verdict::Win(mv) => {
                self.winning.insert(key, mv);
            }
            Verdict::Loss => {
                self.losing.insert(key);
            }
            Verdict::TrivialWin => {}
        }
    }

    /// Exhaustive search from a root that is neither terminal, closed-form
    /// nor memoized.
    fn search(&mut self, root: Grid, root_key: StateKey) -> Verdict {
        let mut stack: Vec<Frame> = Vec::with_capacity(self.config.stack_capacity);
        stack.push(Frame::new(root, root_key));
        self.stats.max_depth = self.stats.max_depth.max(1);

        let mut last_log = Instant::now();
        // The frame popped last was lost for its mover
        let mut child_lost = false;

        while let Some(frame) = stack.last_mut() {
            if let Some(interval) = self.config.log_interval {
                if last_log.elapsed() >= interval {
                    self.stats.log_progress(self.winning.len(), self.losing.len());
                    last_log = Instant::now();
                }
            }

            let step = match frame.pending {
                Some(mv) if child_lost => Step::Resolved(Verdict::Win(mv)),
                _ => self.advance(frame),
            };
            child_lost = false;

            match step {
                Step::Descend(child, key) => {
                    stack.push(Frame::new(child, key));
                    self.stats.max_depth = self.stats.max_depth.max(stack.len() as u64);
                }
                Step::Resolved(verdict) => {
                    if let Some(done) = stack.pop() {
                        self.record(done.key, verdict);
                    }
                    if stack.is_empty() {
                        return verdict;
                    }
                    child_lost = verdict == Verdict::Loss;
                }
            }
        }

        unreachable!("search stack drained before the root was resolved")
    }
}
