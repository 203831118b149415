use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use patience_solver::{
    board::Board,
    config::{DEFAULT_MAX_DEPTH, SolverConfig, StackRule},
    metrics::{DEFAULT_METRICS_FILE, FileMetricsRecorder, MetricsRecorder},
    moves::{describe_move, format_moves},
    session::{GameSession, Player, Step},
    solver::{SolveStatus, Strategy},
};
use std::io::{IsTerminal, Write, stderr};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deal a board from a seed and print it
    Deal {
        #[arg(long, value_name = "NUM")]
        seed: u32,
    },
    /// Solve the game
    Solve {
        /// Optional file to load the game state from
        file: Option<String>,
        /// Deal the board from this seed instead of loading a file
        #[arg(long, value_name = "NUM", conflicts_with = "file")]
        seed: Option<u32>,
        /// Search strategy
        #[arg(long, value_enum, default_value_t = Strategy::DepthFirst)]
        strategy: Strategy,
        /// Largest stack that can be moved at once, 0 for no limit
        #[arg(long, default_value_t = 0, value_name = "NUM")]
        stack_size: usize,
        /// Which runs of cards can be moved together
        #[arg(long, value_enum, default_value_t = StackRule::AnySuit)]
        stack_rule: StackRule,
        /// Max recursion depth of the depth-first search
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_name = "NUM")]
        max_depth: usize,
        /// Max states to try to find a solution
        #[arg(long, value_name = "NUM")]
        max_states: Option<usize>,
        /// Append run metrics to this file
        #[arg(long, value_name = "PATH", default_value = DEFAULT_METRICS_FILE)]
        metrics: PathBuf,
        /// Replay the solution onto the board move by move
        #[arg(long)]
        replay: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deal { seed } => {
            println!("{}", Board::new_from_seed(seed).pretty_print());
        }
        Commands::Solve {
            file,
            seed,
            strategy,
            stack_size,
            stack_rule,
            max_depth,
            max_states,
            metrics,
            replay,
        } => {
            let board = match (file, seed) {
                (Some(file), _) => {
                    let content = std::fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read '{file}'"))?;
                    Board::parse(&content).context("Failed to parse board")?
                }
                (None, Some(seed)) => Board::new_from_seed(seed),
                (None, None) => {
                    bail!("The 'solve' command requires a file or a --seed to deal from.");
                }
            };
            let config = SolverConfig {
                max_stack_size: stack_size,
                stack_rule,
                max_depth,
                max_states,
            };
            let mut recorder = FileMetricsRecorder::new(metrics);
            do_solve(board, strategy, &config, &mut recorder, replay)?;
        }
    }

    Ok(())
}

fn do_solve(
    board: Board,
    strategy: Strategy,
    config: &SolverConfig,
    recorder: &mut dyn MetricsRecorder,
    replay: bool,
) -> Result<()> {
    let state = board.pretty_print();
    let mut session = with_spinner("Solving the game...", || {
        GameSession::new(board, Player::Ai(strategy), config, recorder)
    })?;
    let result = session
        .solution()
        .cloned()
        .context("The solver did not run")?;

    let states = result.states;
    match result.status {
        SolveStatus::Solved => {}
        SolveStatus::Exhausted => bail!("No solution found after {states} states."),
        SolveStatus::DepthLimitReached => bail!(
            "No solution found within depth {}; searched {states} states.",
            config.max_depth
        ),
        SolveStatus::StateLimitReached => {
            bail!("Unable to solve the game; reached max states {states}.")
        }
    }

    let moves_len = result.moves.len();
    let elapsed = format_elapsed(result.elapsed);
    let memory = result.peak_memory_kb;
    println!(
        r#"✓ Solved the game. Strategy: {}, Steps: {moves_len}, Elapsed: {elapsed}, States: {states}, Memory: {memory:.2} KB

===== STATE =====
{state}

===== STEPS ====="#,
        strategy.name()
    );
    println!("{}", format_moves(&result.moves));

    if replay {
        println!("===== REPLAY =====");
        for (i, mov) in result.moves.iter().enumerate() {
            let description = describe_move(session.board(), mov);
            match session.step() {
                Step::Applied(_) => println!("{:03}/{moves_len:03} {description}", i + 1),
                Step::Skipped(err) => {
                    println!("{:03}/{moves_len:03} {description} (skipped: {err})", i + 1)
                }
                Step::Finished => break,
            }
        }
        println!("\n{}", session.board().pretty_print());
    }

    Ok(())
}

fn with_spinner<T, F: FnOnce() -> T>(message: &str, f: F) -> T {
    if stderr().is_terminal() {
        let spinning = Arc::new(AtomicBool::new(true));
        let spinning_clone = Arc::clone(&spinning);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let spinner_chars = ['|', '/', '-', '\\'];
            let mut i = 0;
            // Unlocked so log lines from the solver can interleave.
            let mut handle = stderr();

            let _ = write!(handle, "\x1b[?25l"); // hide cursor
            let _ = handle.flush();

            while spinning_clone.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars[i % spinner_chars.len()];
                let _ = write!(handle, "\r{spinner_char} {message}",);
                let _ = handle.flush();
                std::thread::sleep(Duration::from_millis(100));
                i += 1;
            }

            let _ = write!(handle, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = handle.flush();
        });

        let result = f();
        spinning.store(false, Ordering::Relaxed);
        let _ = handle.join();
        result
    } else {
        f()
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics_path(args: &[&str]) -> PathBuf {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Solve { metrics, .. } => metrics,
            Commands::Deal { .. } => panic!("expected the solve command"),
        }
    }

    #[test]
    fn test_metrics_file_defaults() {
        let path = metrics_path(&["patience-solver", "solve", "--seed", "1"]);
        assert_eq!(path, PathBuf::from("metrics.txt"));
    }

    #[test]
    fn test_metrics_file_override() {
        let path = metrics_path(&[
            "patience-solver",
            "solve",
            "--seed",
            "1",
            "--metrics",
            "runs.log",
        ]);
        assert_eq!(path, PathBuf::from("runs.log"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1234)), "1.234s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }
}
