//! Chomp Solver
//!
//! Plays a game of Chomp to the end, with the solver moving for both sides
//! (or for Player 2 against a human with `--human`).

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chomp_solver::{Fallback, Game, MoveSource, Player, SolverConfig, Turn};
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "solver", about = "Solve and play out a game of Chomp")]
struct Args {
    /// Board rows
    #[arg(default_value_t = 7)]
    rows: usize,

    /// Board columns
    #[arg(default_value_t = 4)]
    cols: usize,

    /// Play as Player 1, entering moves as row,col
    #[arg(long)]
    human: bool,

    /// Move chooser for a side that cannot force a win
    #[arg(long, value_enum, default_value_t = FallbackArg::Sequential)]
    fallback: FallbackArg,

    /// Seed for the random fallback
    #[arg(long)]
    seed: Option<u64>,

    /// Disable closed-form verdicts and search every position
    #[arg(long)]
    no_shortcuts: bool,

    /// Log search progress every N seconds
    #[arg(long, value_name = "SECS")]
    log_interval: Option<u64>,

    /// Do not print the grid before every move
    #[arg(long, short)]
    quiet: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FallbackArg {
    Sequential,
    Random,
}

impl From<FallbackArg> for Fallback {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Sequential => Fallback::Sequential,
            FallbackArg::Random => Fallback::Random,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.log_interval.is_some() { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = SolverConfig::default().with_shortcuts(!args.no_shortcuts);
    if let Some(secs) = args.log_interval {
        config = config.with_log_interval(Duration::from_secs(secs));
    }

    let mut game = match Game::new(args.rows, args.cols, config) {
        Ok(game) => game.with_fallback(args.fallback.into()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(seed) = args.seed {
        game = game.with_seed(seed);
    }

    if !args.json {
        println!("Chomp Solver");
        println!("============");
        println!("Board: {}x{}", args.rows, args.cols);
        println!(
            "Mode: {}",
            if args.no_shortcuts { "Full search (no shortcuts)" } else { "Search with closed-form shortcuts" }
        );
        println!();
    }

    let start = Instant::now();
    while !game.is_over() {
        if !args.quiet && !args.json {
            println!("{}", game.grid());
        }

        let turn = if args.human && game.to_move() == Player::One {
            match human_turn(&mut game) {
                Some(turn) => turn,
                None => {
                    eprintln!("Input closed before the game ended");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            match game.play_solver_turn() {
                Ok(turn) => turn,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        };

        if !args.json {
            describe(&turn);
        }
    }
    let elapsed = start.elapsed();

    if args.json {
        return match serde_json::to_string_pretty(&game.summary()) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    println!("\n============");
    println!("Game over!");
    println!("============");
    if let (Some(loser), Some(winner)) = (game.loser(), game.winner()) {
        println!("{} ate the poison square; {} wins.", loser, winner);
    }
    println!("Moves: {}", game.turns().len());
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!();
    println!("Winnable count: {}", game.solver().winning_states());
    println!("Losable count: {}", game.solver().losing_states());
    game.solver().stats.print_summary();

    ExitCode::SUCCESS
}

fn describe(turn: &Turn) {
    let how = match turn.source {
        MoveSource::Solver => "best move",
        MoveSource::Fallback => "sequential/random move",
        MoveSource::Human => "move",
    };
    println!("{} plays {}: {}", turn.player, how, turn.mv);
}

/// Prompt until a legal move is entered. None once stdin is closed.
fn human_turn(game: &mut Game) -> Option<Turn> {
    let stdin = io::stdin();
    loop {
        println!("Enter a move as: row,col");
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }

        let Some((row, col)) = parse_move(&line) else {
            println!("Could not parse input as coordinates row,col: {}", line.trim());
            continue;
        };

        match game.play_human_turn(row, col) {
            Ok(turn) => return Some(turn),
            Err(e) => println!("{}", e),
        }
    }
}

fn parse_move(input: &str) -> Option<(isize, isize)> {
    let (row, col) = input.split_once(',')?;
    let row = row.trim().parse().ok()?;
    let col = col.trim().parse().ok()?;
    Some((row, col))
}
