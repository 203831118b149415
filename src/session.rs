//! A game in progress: the live board, who is playing it and, for the
//! computer, the solution being replayed onto it.

use crate::board::{Board, Card, PileId};
use crate::config::SolverConfig;
use crate::error::{MoveError, SolverResult};
use crate::metrics::MetricsRecorder;
use crate::moves::{AppliedMove, Move};
use crate::replay::{ReplayCursor, TranslatedMove};
use crate::solver::{SolveResult, Strategy, Transaction, solve};

use std::time::Duration;
use tracing::{debug, warn};

const POINTS_PER_FOUNDATION_CARD: usize = 50;
const POINTS_PER_SECOND_LEFT: u64 = 15;

/// Suggests a move of one top card. Slot moves onto the opposite colour come
/// first, then slot moves onto the same suit, then foundation moves.
pub fn hint(board: &Board) -> Option<Move> {
    let tops = || {
        board
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.peek_top().map(|&card| (i, card)))
    };
    let onto_slot = |fits: fn(Card, Card) -> bool| {
        tops().find_map(|(from, card)| {
            board.slots.iter().enumerate().find_map(|(to, target)| {
                let top = *target.peek_top()?;
                (to != from && target.can_accept(card) && fits(card, top))
                    .then(|| Move::new(PileId::Slot(from as u8), card, PileId::Slot(to as u8)))
            })
        })
    };

    onto_slot(|card, top| card.is_red() != top.is_red())
        .or_else(|| onto_slot(|card, top| card.suit() == top.suit()))
        .or_else(|| {
            tops().find_map(|(from, card)| {
                let to = board.foundations.iter().position(|f| f.can_accept(card))?;
                Some(Move::new(
                    PileId::Slot(from as u8),
                    card,
                    PileId::Foundation(to as u8),
                ))
            })
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Human,
    Ai(Strategy),
}

/// Outcome of advancing the replay by one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Applied(AppliedMove),
    Skipped(MoveError),
    Finished,
}

#[derive(Debug)]
pub struct GameSession {
    board: Board,
    player: Player,
    solution: Option<SolveResult>,
    cursor: ReplayCursor,
}

impl GameSession {
    /// Starts a session. Computer players solve the board up front, on a copy,
    /// before any move reaches the live board.
    pub fn new(
        mut board: Board,
        player: Player,
        config: &SolverConfig,
        recorder: &mut dyn MetricsRecorder,
    ) -> SolverResult<Self> {
        board.apply_config(config);
        let solution = match player {
            Player::Human => None,
            Player::Ai(strategy) => Some(solve(&board, strategy, config, recorder)?),
        };
        let cursor = solution
            .as_ref()
            .map(SolveResult::cursor)
            .unwrap_or_default();

        Ok(Self {
            board,
            player,
            solution,
            cursor,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn solution(&self) -> Option<&SolveResult> {
        self.solution.as_ref()
    }

    /// The computer searched and found nothing.
    pub fn is_lost(&self) -> bool {
        self.solution.as_ref().is_some_and(|result| !result.is_solved())
    }

    pub fn is_won(&self) -> bool {
        self.board.is_won()
    }

    pub fn hint(&self) -> Option<Move> {
        hint(&self.board)
    }

    /// Points for the cards already on the foundations.
    pub fn score(&self) -> usize {
        self.board.foundation_count() * POINTS_PER_FOUNDATION_CARD
    }

    /// The score plus, for a won game, a bonus for every whole second left on
    /// the clock.
    pub fn final_score(&self, time_limit: Duration, elapsed: Duration) -> u64 {
        let mut score = self.score() as u64;
        if self.is_won() {
            score += POINTS_PER_SECOND_LEFT * time_limit.saturating_sub(elapsed).as_secs();
        }
        score
    }

    pub fn next_move(&mut self) -> TranslatedMove {
        self.cursor.next_move()
    }

    /// Applies the next solution move to the live board. A move that no
    /// longer fits the board is skipped.
    pub fn step(&mut self) -> Step {
        let entry = self.cursor.next_move();
        let Some(mov) = entry.to_move() else {
            return Step::Finished;
        };
        match self.board.try_move(mov) {
            Ok(applied) => {
                debug!(%mov, "Replayed move");
                Step::Applied(applied)
            }
            Err(err) => {
                warn!(%entry, %err, "Skipping solution move");
                Step::Skipped(err)
            }
        }
    }

    /// Steps until the cursor is exhausted and returns how many moves applied.
    pub fn play_to_end(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.step() {
                Step::Applied(_) => applied += 1,
                Step::Skipped(_) => {}
                Step::Finished => break applied,
            }
        }
    }

    /// A move made by hand, followed by any forced moves it releases.
    pub fn apply_human_move(&mut self, mov: Move) -> Result<Transaction, MoveError> {
        Transaction::apply(&mut self.board, mov)
    }
}
