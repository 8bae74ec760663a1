//! Solver statistics tracking.

use std::time::Instant;

use log::info;

use crate::solver::Verdict;

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    // macOS: use mach APIs
    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_outCnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;

        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );

        if result == 0 {
            Some(info.assume_init().resident_size)
        } else {
            None
        }
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    use std::fs;

    let status = fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Statistics collected during solving.
#[derive(Debug, Default)]
pub struct SolverStats {
    /// States resolved by search and written to a memo table
    pub positions_evaluated: u64,

    /// States resolved as wins (winning table inserts)
    pub wins: u64,

    /// States resolved as losses (losing table inserts)
    pub losses: u64,

    /// Memo hits
    pub cache_hits: u64,

    /// States answered by the closed-form classifier
    pub trivial_hits: u64,

    /// Empty children reached by eating the poison square
    pub terminal_positions: u64,

    /// Child states generated during search
    pub children_generated: u64,

    /// Maximum stack depth reached
    pub max_depth: u64,

    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_positions: u64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a state resolved by search.
    pub fn record_resolved(&mut self, verdict: Verdict) {
        self.positions_evaluated += 1;
        if verdict.is_win() {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }

    /// Get current positions per second
    pub fn positions_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.positions_evaluated as f64 / elapsed;
            }
        }
        0.0
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, winning: usize, losing: usize) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Rate since last log
        let rate = if let Some(last) = self.last_log_time {
            let elapsed = last.elapsed().as_secs_f64();
            let positions = self.positions_evaluated - self.last_log_positions;
            if elapsed > 0.0 {
                positions as f64 / elapsed
            } else {
                0.0
            }
        } else {
            self.positions_per_sec()
        };

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        info!(
            "[{:02}:{:02}:{:02}] positions={} winning={} losing={} cache_hits={} trivial={} rate={:.0}/s depth={}{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.positions_evaluated,
            winning,
            losing,
            self.cache_hits,
            self.trivial_hits,
            rate,
            self.max_depth,
            mem_str,
        );

        self.last_log_time = Some(now);
        self.last_log_positions = self.positions_evaluated;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Positions evaluated: {}", self.positions_evaluated);
        println!("  - Wins: {}", self.wins);
        println!("  - Losses: {}", self.losses);
        println!("Cache hits: {}", self.cache_hits);
        println!("Trivial verdicts: {}", self.trivial_hits);
        println!("Terminal positions: {}", self.terminal_positions);
        println!("Children generated: {}", self.children_generated);
        println!("Max depth: {}", self.max_depth);

        if let Some(mem) = get_memory_usage() {
            println!("Resident memory: {}", format_bytes(mem));
        }
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                println!(
                    "Average rate: {:.0} positions/sec",
                    self.positions_evaluated as f64 / elapsed
                );
            }
        }
    }
}
