//! Search engine: move generation, forced cascades, state keys, the board
//! heuristic and the three search strategies that consume them.

mod auto_move;
mod best_first;
mod breadth_first;
mod dfs;
pub mod heuristic;
mod movegen;
mod node;
mod state;

use crate::board::{Board, Card, MAX_RANK, PileId, TOTAL_FOUNDATIONS};
use crate::config::SolverConfig;
use crate::error::{MoveError, SolverError, SolverResult};
use crate::metrics::{MemoryProbe, MetricsRecorder, RunMetrics};
use crate::moves::{AppliedMove, Move};
use crate::replay::{ReplayCursor, TranslatedMove, translate};

use clap::ValueEnum;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use node::NodeStorage;
use state::{StateMap, StateSet};

pub use auto_move::{Cascade, ForcedMoves, Transaction, apply_forced, resolve_forced};
pub use heuristic::score;
pub use movegen::{PossibleMoves, candidates};
pub use state::{StateKey, state_key};

/// Generated states between two memory samples.
const PROBE_INTERVAL: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    /// Exhaustive backtracking with a depth cap
    #[value(name = "dfs")]
    DepthFirst,
    /// Priority queue ordered by accumulated heuristic cost
    #[value(name = "best-first")]
    BestFirst,
    /// Plain FIFO search
    #[value(name = "bfs")]
    BreadthFirst,
}

impl Strategy {
    /// Label written to the metrics log.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::DepthFirst => "DFS",
            Strategy::BestFirst => "BestFirst",
            Strategy::BreadthFirst => "BFS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Solved,
    Exhausted,
    /// Exhausted, with at least one branch cut by the depth cap.
    DepthLimitReached,
    StateLimitReached,
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub strategy: Strategy,
    pub status: SolveStatus,
    /// Every move made, cascades included. Empty unless solved.
    pub moves: Vec<Move>,
    pub path: Vec<TranslatedMove>,
    pub states: usize,
    pub elapsed: Duration,
    pub peak_memory_kb: f64,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }

    pub fn cursor(&self) -> ReplayCursor {
        ReplayCursor::new(self.path.clone())
    }
}

/// Runs one search over a copy of `board` and hands the run statistics to
/// `recorder`, solved or not.
pub fn solve(
    board: &Board,
    strategy: Strategy,
    config: &SolverConfig,
    recorder: &mut dyn MetricsRecorder,
) -> SolverResult<SolveResult> {
    let mut solver = Solver::new(board, config)?;
    let result = solver.solve(strategy)?;
    recorder.record(&RunMetrics::from(&result))?;
    Ok(result)
}

/// Owns a private copy of the board for the duration of a search. Every move
/// is made as a [`Transaction`] so that backtracking restores the exact board.
#[derive(Debug)]
pub struct Solver {
    config: SolverConfig,
    initial_board: Board,
    setup: Cascade,
    board: Board,
    transactions: Vec<Transaction>,
    states: usize,
    probe: MemoryProbe,
}

impl Solver {
    /// Validates the board, applies the movement rules to its slots and
    /// resolves the forced moves already pending on it.
    pub fn new(board: &Board, config: &SolverConfig) -> SolverResult<Self> {
        if !board.is_valid() {
            return Err(SolverError::InvalidBoard(
                "expected 52 distinct cards and ordered foundations".to_string(),
            ));
        }
        let mut initial_board = board.clone();
        initial_board.apply_config(config);
        let setup = apply_forced(&mut initial_board);
        if !setup.is_empty() {
            debug!(forced = setup.len(), "Resolved forced moves on the initial board");
        }

        Ok(Self {
            config: config.clone(),
            board: initial_board.clone(),
            initial_board,
            setup,
            transactions: Vec::new(),
            states: 0,
            probe: MemoryProbe::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(&mut self, strategy: Strategy) -> SolverResult<SolveResult> {
        let timer = Instant::now();
        self.probe.start();
        self.reset();
        self.states = 1;
        debug!(strategy = strategy.name(), "Starting search");

        let status = match strategy {
            Strategy::DepthFirst => self.depth_first(),
            Strategy::BestFirst => self.best_first()?,
            Strategy::BreadthFirst => self.breadth_first()?,
        };

        let moves = if status == SolveStatus::Solved {
            self.export_moves()
        } else {
            self.reset();
            Vec::new()
        };
        let path = translate(&moves, &self.initial_board)?;
        self.probe.sample();

        let result = SolveResult {
            strategy,
            status,
            moves,
            path,
            states: self.states,
            elapsed: timer.elapsed(),
            peak_memory_kb: self.probe.peak_kb(),
        };
        info!(
            strategy = strategy.name(),
            status = ?result.status,
            moves = result.moves.len(),
            states = result.states,
            "Search finished"
        );
        Ok(result)
    }

    /// Restores the board the search started from.
    pub fn reset(&mut self) {
        self.board.clone_from(&self.initial_board);
        self.transactions.clear();
    }

    pub fn make_move(&mut self, mov: Move) -> Result<(), MoveError> {
        let transaction = Transaction::apply(&mut self.board, mov)?;
        self.transactions.push(transaction);
        Ok(())
    }

    /// Reverses the most recent transaction, cascade first.
    pub fn undo_move(&mut self) {
        if let Some(transaction) = self.transactions.pop() {
            transaction.undo(&mut self.board);
        }
    }

    /// Resets and then makes every primary move in order.
    pub fn replay(&mut self, moves: &[Move]) -> Result<(), MoveError> {
        self.reset();
        for &mov in moves {
            self.make_move(mov)?;
        }
        Ok(())
    }

    /// Forced moves resolved at setup, followed by every move of every
    /// transaction currently on the board.
    pub fn export_moves(&self) -> Vec<Move> {
        self.setup
            .iter()
            .map(|applied| applied.mov)
            .chain(self.transactions.iter().flat_map(|transaction| transaction.moves()))
            .collect()
    }

    /// Counts a newly generated state. Returns true once the state budget is
    /// spent.
    fn note_state(&mut self) -> bool {
        self.states += 1;
        if self.states % PROBE_INTERVAL == 0 {
            self.probe.sample();
        }
        self.config.state_limit_reached(self.states)
    }
}
