//! Solver configuration.

use std::time::Duration;

/// Configuration for a [`Solver`](crate::Solver).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chomp_solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_log_interval(Duration::from_secs(5))
///     .with_stack_capacity(256);
/// assert!(config.shortcuts);
///
/// let brute = SolverConfig::brute_force();
/// assert!(!brute.shortcuts);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Answer small and degenerate positions in closed form
    pub shortcuts: bool,
    /// Emit a progress line at this interval while searching
    pub log_interval: Option<Duration>,
    /// Initial capacity of the search stack
    pub stack_capacity: usize,
}

impl SolverConfig {
    /// Exhaustive search only; no closed-form verdicts.
    pub fn brute_force() -> Self {
        Self::default().with_shortcuts(false)
    }

    pub fn with_shortcuts(mut self, shortcuts: bool) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    pub fn with_log_interval(mut self, interval: Duration) -> Self {
        self.log_interval = Some(interval);
        self
    }

    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            shortcuts: true,
            log_interval: None,
            stack_capacity: 64,
        }
    }
}
