//! Index-addressed solution paths and the cursor that replays them.

use crate::board::{Board, Card, PileId, TOTAL_FOUNDATIONS, TOTAL_SLOTS};
use crate::error::{SolverError, SolverResult};
use crate::moves::Move;

use std::fmt;

/// A move with its piles flattened to board indices: `0..13` for slots and
/// `13..17` for foundations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TranslatedMove {
    pub source: usize,
    pub card: Option<Card>,
    pub target: usize,
}

impl TranslatedMove {
    /// Returned by an exhausted cursor.
    pub const SENTINEL: Self = Self {
        source: 0,
        card: None,
        target: 0,
    };

    pub fn new(source: usize, card: Option<Card>, target: usize) -> Self {
        Self {
            source,
            card,
            target,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// The board move this entry stands for; `None` for the sentinel.
    pub fn to_move(&self) -> Option<Move> {
        let card = self.card?;
        Some(Move::new(pile_id(self.source)?, card, pile_id(self.target)?))
    }
}

impl fmt::Display for TranslatedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.card {
            Some(card) => write!(f, "({}, {}, {})", self.source, card, self.target),
            None => write!(f, "({}, 0, {})", self.source, self.target),
        }
    }
}

pub fn pile_index(board: &Board, id: PileId) -> SolverResult<usize> {
    board.pile(id).ok_or(SolverError::InvalidReference(id))?;
    Ok(match id {
        PileId::Slot(idx) => idx as usize,
        PileId::Foundation(idx) => TOTAL_SLOTS + idx as usize,
    })
}

pub fn pile_id(index: usize) -> Option<PileId> {
    if index < TOTAL_SLOTS {
        Some(PileId::Slot(index as u8))
    } else if index < TOTAL_SLOTS + TOTAL_FOUNDATIONS {
        Some(PileId::Foundation((index - TOTAL_SLOTS) as u8))
    } else {
        None
    }
}

/// Maps a move path onto board indices. A move naming a pile the board does
/// not have fails the whole translation.
pub fn translate(moves: &[Move], board: &Board) -> SolverResult<Vec<TranslatedMove>> {
    moves
        .iter()
        .map(|mov| {
            Ok(TranslatedMove::new(
                pile_index(board, mov.from)?,
                Some(mov.card),
                pile_index(board, mov.to)?,
            ))
        })
        .collect()
}

pub fn format_path(path: &[TranslatedMove]) -> String {
    let entries: Vec<String> = path.iter().map(|entry| entry.to_string()).collect();
    format!("[{}]", entries.join(", "))
}

/// Hands out a translated path one move at a time. Once the path is used up
/// every call returns [`TranslatedMove::SENTINEL`].
#[derive(Debug, Clone, Default)]
pub struct ReplayCursor {
    path: Vec<TranslatedMove>,
    position: usize,
}

impl ReplayCursor {
    pub fn new(path: Vec<TranslatedMove>) -> Self {
        Self { path, position: 0 }
    }

    pub fn next_move(&mut self) -> TranslatedMove {
        match self.path.get(self.position) {
            Some(&entry) => {
                self.position += 1;
                entry
            }
            None => TranslatedMove::SENTINEL,
        }
    }

    pub fn remaining(&self) -> usize {
        self.path.len() - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }
}
