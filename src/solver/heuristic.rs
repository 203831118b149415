//! Board evaluation used to bias the best-first search.
//!
//! The score is a weighted sum of five features; higher means closer to a
//! solved board. Every feature is an integer count, so scores are exact
//! multiples of one half.

use super::*;

const FOUNDATION_WEIGHT: f64 = 1.5;
const MOBILITY_WEIGHT: f64 = 1.0;
const DISTANCE_WEIGHT: f64 = 1.0;
const BLOCKED_WEIGHT: f64 = 1.0;
const SEQUENCE_WEIGHT: f64 = 1.5;

const DISTANCE_SENTINEL: i32 = MAX_RANK as i32;

pub fn score(board: &Board) -> f64 {
    cards_in_foundation(board) as f64 * FOUNDATION_WEIGHT
        + available_moves(board) as f64 * MOBILITY_WEIGHT
        + distance_to_foundation(board) as f64 * DISTANCE_WEIGHT
        + blocked_cards(board) as f64 * BLOCKED_WEIGHT
        + sequential_progress(board) as f64 * SEQUENCE_WEIGHT
}

pub fn cards_in_foundation(board: &Board) -> usize {
    board.foundation_count()
}

/// Counts (top card, accepting pile) pairs, so one card can count several
/// times.
pub fn available_moves(board: &Board) -> usize {
    board
        .slots
        .iter()
        .filter_map(|slot| slot.peek_top())
        .map(|&card| {
            board.slots.iter().filter(|slot| slot.can_accept(card)).count()
                + board.foundations.iter().filter(|f| f.can_accept(card)).count()
        })
        .sum()
}

/// `13` minus the smallest non-negative rank gap between a slot top and a
/// foundation top, suits ignored. Zero when no such pair exists.
pub fn distance_to_foundation(board: &Board) -> i32 {
    let mut closest_distance = DISTANCE_SENTINEL;
    for card in board.slots.iter().filter_map(|slot| slot.peek_top()) {
        for top in board.foundations.iter().filter_map(|f| f.peek_top()) {
            let distance = card.rank() as i32 - top.rank() as i32;
            if distance >= 0 && distance < closest_distance {
                closest_distance = distance;
            }
        }
    }
    DISTANCE_SENTINEL - closest_distance
}

/// Adjacent pairs in slots where the upper card is not one rank below the
/// lower card in a different suit.
pub fn blocked_cards(board: &Board) -> usize {
    board
        .slots
        .iter()
        .map(|slot| {
            slot.cards
                .windows(2)
                .filter(|pair| {
                    let (lower, upper) = (pair[0], pair[1]);
                    !(lower.rank() == upper.rank() + 1 && lower.suit() != upper.suit())
                })
                .count()
        })
        .sum()
}

/// Slots of two or more cards that descend one rank at a time, any suits.
pub fn sequential_progress(board: &Board) -> usize {
    board
        .slots
        .iter()
        .filter(|slot| {
            slot.len() >= 2
                && slot
                    .cards
                    .windows(2)
                    .all(|pair| pair[1].rank() + 1 == pair[0].rank())
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD_STR: &str = r#"Foundation1: A♦2♦3♦4♦5♦6♦7♦8♦9♦T♦J♦Q♦K♦
Foundation2: A♠2♠3♠4♠5♠6♠7♠8♠9♠T♠J♠Q♠K♠
Foundation3: A♣2♣3♣4♣5♣6♣7♣8♣9♣T♣J♣Q♣K♣
Slot1: A♥2♥
Slot2: K♥Q♥J♥T♥9♥8♥7♥6♥5♥4♥3♥"#;

    #[test]
    fn test_features() {
        let board = Board::parse(BOARD_STR).unwrap();
        assert_eq!(cards_in_foundation(&board), 39);
        // 2♥ fits on 3♥.
        assert_eq!(available_moves(&board), 1);
        // Every foundation top is a King, above both slot tops.
        assert_eq!(distance_to_foundation(&board), 0);
        // A♥2♥ ascends; the hearts run shares one suit throughout.
        assert_eq!(blocked_cards(&board), 11);
        assert_eq!(sequential_progress(&board), 1);
        assert_eq!(score(&board), 58.5 + 1.0 + 0.0 + 11.0 + 1.5);
    }

    #[test]
    fn test_distance_to_foundation() {
        let board =
            Board::parse("Foundation4: A♥\nSlot1: K♥Q♥J♥T♥9♥8♥7♥6♥5♥4♥3♥2♥\nSlot2: 7♣").unwrap();
        assert_eq!(distance_to_foundation(&board), 12);
        let board = Board::parse("Slot1: 7♣").unwrap();
        assert_eq!(distance_to_foundation(&board), 0);
    }

    #[test]
    fn test_blocked_and_sequences() {
        let board = Board::parse("Slot1: 9♠8♥7♣\nSlot2: 5♦6♦\nSlot3: Q♣").unwrap();
        assert_eq!(blocked_cards(&board), 1);
        assert_eq!(sequential_progress(&board), 1);
        // 6♦ fits on 7♣.
        assert_eq!(available_moves(&board), 1);
    }

    #[test]
    fn test_score_is_deterministic() {
        let board = Board::new_from_seed(42);
        let first = score(&board);
        assert_eq!(first.to_bits(), score(&board).to_bits());
        assert_eq!((first * 2.0).fract(), 0.0);
    }
}
