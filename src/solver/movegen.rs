use super::*;

pub type PossibleMoves = SmallVec<[Move; 64]>;

/// Enumerates candidate moves. With a stack limit of one only top cards are
/// considered; otherwise every card of every slot is offered to each accepting
/// pile, and whether the cards above it can actually be lifted is left to
/// [`Board::try_move`].
pub fn candidates(board: &Board, config: &SolverConfig, possible_moves: &mut PossibleMoves) {
    for (src_idx, src_slot) in board.slots.iter().enumerate() {
        let source = PileId::Slot(src_idx as u8);
        if config.single_card() {
            if let Some(&card) = src_slot.peek_top() {
                push_targets(board, source, card, possible_moves);
            }
        } else {
            for &card in &src_slot.cards {
                push_targets(board, source, card, possible_moves);
            }
        }
    }
}

fn push_targets(board: &Board, source: PileId, card: Card, possible_moves: &mut PossibleMoves) {
    for (dest_idx, dest_slot) in board.slots.iter().enumerate() {
        let target = PileId::Slot(dest_idx as u8);
        if target != source && dest_slot.can_accept(card) {
            possible_moves.push(Move::new(source, card, target));
        }
    }
    for (foundation_idx, foundation) in board.foundations.iter().enumerate() {
        if foundation.can_accept(card) {
            possible_moves.push(Move::new(
                source,
                card,
                PileId::Foundation(foundation_idx as u8),
            ));
        }
    }
}
