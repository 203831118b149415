use super::*;

pub type ForcedMoves = SmallVec<[Move; TOTAL_FOUNDATIONS]>;
pub type Cascade = SmallVec<[AppliedMove; 8]>;

/// One pass of forced foundation moves. Nothing is forced while any
/// foundation is empty; otherwise every slot whose top card is exactly one
/// rank above the lowest foundation top goes to the foundation that takes it.
pub fn resolve_forced(board: &Board) -> ForcedMoves {
    let mut forced = ForcedMoves::new();

    let mut foundation_minimum = u8::MAX;
    for foundation in &board.foundations {
        let Some(top) = foundation.peek_top() else {
            return forced;
        };
        foundation_minimum = foundation_minimum.min(top.rank());
    }

    for (slot_idx, slot) in board.slots.iter().enumerate() {
        let Some(&card) = slot.peek_top() else {
            continue;
        };
        if card.rank() != foundation_minimum + 1 {
            continue;
        }
        if let Some(foundation_idx) = board.foundations.iter().position(|f| f.can_accept(card)) {
            forced.push(Move::new(
                PileId::Slot(slot_idx as u8),
                card,
                PileId::Foundation(foundation_idx as u8),
            ));
        }
    }

    forced
}

/// Applies forced moves until none are pending and returns them in the order
/// they were made.
pub fn apply_forced(board: &mut Board) -> Cascade {
    let mut cascade = Cascade::new();
    loop {
        let forced = resolve_forced(board);
        let applied_before = cascade.len();
        for mov in forced {
            if let Ok(applied) = board.try_move(mov) {
                cascade.push(applied);
            }
        }
        if cascade.len() == applied_before {
            break;
        }
    }
    cascade
}

/// A primary move together with the forced moves it triggered; made and
/// reversed as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub primary: AppliedMove,
    pub cascade: Cascade,
}

impl Transaction {
    pub fn apply(board: &mut Board, mov: Move) -> Result<Self, MoveError> {
        let primary = board.try_move(mov)?;
        let cascade = apply_forced(board);
        Ok(Self { primary, cascade })
    }

    pub fn undo(&self, board: &mut Board) {
        for applied in self.cascade.iter().rev() {
            board.undo_move(applied);
        }
        board.undo_move(&self.primary);
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        std::iter::once(self.primary.mov).chain(self.cascade.iter().map(|applied| applied.mov))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CLUBS, DIAMONDS, HEARTS, SPADES};

    #[test]
    fn test_empty_foundation_blocks_everything() {
        let board = Board::parse(
            "Foundation1: A♦\nFoundation2: A♠\nFoundation3: A♣\nSlot1: 2♦\nSlot2: 2♠",
        )
        .unwrap();
        assert!(resolve_forced(&board).is_empty());
    }

    #[test]
    fn test_resolve_forced() {
        let board = Board::parse(
            "Foundation1: A♦2♦\nFoundation2: A♠\nFoundation3: A♣\nFoundation4: A♥\n\
             Slot1: 2♠\nSlot2: 3♦\nSlot3: 2♣\nSlot4: 2♥K♥",
        )
        .unwrap();
        let forced = resolve_forced(&board);
        assert_eq!(
            forced.as_slice(),
            &[
                Move::new(
                    PileId::Slot(0),
                    Card::new_with_rank_suit(1, SPADES),
                    PileId::Foundation(1)
                ),
                Move::new(
                    PileId::Slot(2),
                    Card::new_with_rank_suit(1, CLUBS),
                    PileId::Foundation(2)
                ),
            ]
        );
    }

    #[test]
    fn test_apply_forced_cascades_to_fixpoint() {
        let mut board = Board::parse(
            "Foundation1: A♦\nFoundation2: A♠\nFoundation3: A♣\nFoundation4: A♥\n\
             Slot1: 3♦2♦\nSlot2: 3♠2♠\nSlot3: 3♣2♣\nSlot4: 3♥2♥",
        )
        .unwrap();
        let cascade = apply_forced(&mut board);
        assert_eq!(cascade.len(), 8);
        assert!(board.slots.iter().all(|slot| slot.is_empty()));
        assert!(board.foundations.iter().all(|f| f.len() == 3));
        assert!(resolve_forced(&board).is_empty());
    }

    #[test]
    fn test_transaction_undo_restores_cascade() {
        let mut board = Board::parse(
            "Foundation1: A♦\nFoundation2: A♠\nFoundation3: A♣\n\
             Slot1: 3♥A♥\nSlot2: 2♦\nSlot3: 2♠\nSlot4: 4♣2♣\nSlot5: 2♥",
        )
        .unwrap();
        let before = board.clone();
        let ace = Card::new_with_rank_suit(0, HEARTS);
        let mov = Move::new(PileId::Slot(0), ace, PileId::Foundation(3));
        let tx = Transaction::apply(&mut board, mov).unwrap();
        // A♥ opens the last foundation: every two follows, then 3♥.
        assert_eq!(tx.cascade.len(), 5);
        assert_eq!(tx.moves().count(), 6);
        assert_eq!(board.foundations[3].pretty_print(), "A♥2♥3♥");
        assert_eq!(
            board.foundations[0].peek_top(),
            Some(&Card::new_with_rank_suit(1, DIAMONDS))
        );
        tx.undo(&mut board);
        assert_eq!(board, before);
    }
}
