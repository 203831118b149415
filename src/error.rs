//! Error types for board moves and solver runs.

use crate::board::{Card, PileId};

use thiserror::Error;

/// Reasons a move is refused when it is applied to a board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("{pile} does not exist on this board")]
    UnknownPile { pile: PileId },

    #[error("Cannot move cards from {pile} onto itself")]
    SamePile { pile: PileId },

    #[error("{card} is not in {pile}")]
    CardNotFound { card: Card, pile: PileId },

    /// The cards above the lifted card do not form a descending run under the
    /// slot's stack rule.
    #[error("Cards above {card} in {pile} do not form a movable stack")]
    InvalidStack { card: Card, pile: PileId },

    #[error("Stack of {count} cards exceeds the limit of {limit}")]
    StackTooLarge { count: usize, limit: usize },

    #[error("{pile} does not accept {card}")]
    Rejected { card: Card, pile: PileId },

    #[error("{pile} only accepts a single card")]
    FoundationStack { pile: PileId },
}

/// Errors that abort a solver run.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// A move names a pile outside the board's slots and foundations. Only a
    /// broken move generator can produce one.
    #[error("Move references {0}, which is neither a slot nor a foundation")]
    InvalidReference(PileId),

    #[error("Failed to replay a stored move path")]
    Replay(#[from] MoveError),

    #[error("Failed to record metrics")]
    Io(#[from] std::io::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;
