use super::*;

const PILE_END: u8 = u8::MAX;

pub type StateSet = FxHashSet<StateKey>;
pub type StateMap<V> = FxHashMap<StateKey, V>;

/// Rank sequences of every slot and foundation in board order. Suits are
/// dropped, so boards that differ only in suit assignment share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey(SmallVec<[u8; 96]>);

impl StateKey {
    pub fn piles(&self) -> impl Iterator<Item = &[u8]> {
        self.0
            .split_inclusive(|&rank| rank == PILE_END)
            .map(|pile| &pile[..pile.len() - 1])
    }
}

pub fn state_key(board: &Board) -> StateKey {
    let mut key = SmallVec::new();
    for pile in board.piles() {
        key.extend(pile.cards.iter().map(|card| card.rank()));
        key.push(PILE_END);
    }
    StateKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TOTAL_SLOTS;

    #[test]
    fn test_key_ignores_suits() {
        let a = Board::parse("Foundation1: A♠\nSlot1: K♥Q♣\nSlot3: 7♦").unwrap();
        let b = Board::parse("Foundation1: A♦\nSlot1: K♠Q♥\nSlot3: 7♣").unwrap();
        assert_eq!(state_key(&a), state_key(&b));
    }

    #[test]
    fn test_key_tracks_positions() {
        let a = Board::parse("Slot1: K♥Q♣").unwrap();
        let b = Board::parse("Slot2: K♥Q♣").unwrap();
        let c = Board::parse("Slot1: Q♣K♥").unwrap();
        assert_ne!(state_key(&a), state_key(&b));
        assert_ne!(state_key(&a), state_key(&c));

        let mut set = StateSet::default();
        assert!(set.insert(state_key(&a)));
        assert!(!set.insert(state_key(&a)));
    }

    #[test]
    fn test_key_piles() {
        let board = Board::parse("Foundation2: A♠2♠\nSlot1: K♥Q♣\nSlot13: 7♦").unwrap();
        let key = state_key(&board);
        let piles: Vec<&[u8]> = key.piles().collect();
        assert_eq!(piles.len(), TOTAL_SLOTS + TOTAL_FOUNDATIONS);
        assert_eq!(piles[0], &[12, 11]);
        assert_eq!(piles[12], &[6]);
        assert_eq!(piles[14], &[0, 1]);
        assert!(piles[1].is_empty());
    }
}
