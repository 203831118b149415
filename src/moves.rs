use crate::board::{Board, Card, PileId};

use std::fmt;

/// Lift `card` (and every card above it) from `from` and drop it on `to`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: PileId,
    pub card: Card,
    pub to: PileId,
}

impl Move {
    pub fn new(from: PileId, card: Card, to: PileId) -> Self {
        Self { from, card, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.from.code(), self.to.code(), self.card)
    }
}

/// A move that has been made, with the number of cards it carried so it can
/// be reversed exactly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub mov: Move,
    pub count: usize,
}

pub fn format_moves(moves: &[Move]) -> String {
    let list: Vec<String> = moves.iter().map(|mov| mov.to_string()).collect();

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.chars().count()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            let padding = max_width - cmd.chars().count();
            output.push_str(cmd);
            output.push_str(&" ".repeat(padding));
        }
        output.push('\n');
    }

    output
}

pub fn describe_move(board: &Board, mov: &Move) -> String {
    let from_cards = board
        .pile(mov.from)
        .and_then(|pile| pile.position(mov.card).map(|start| &pile.cards[start..]))
        .map(|cards| cards.iter().map(|c| c.to_string()).collect::<String>())
        .unwrap_or_else(|| mov.card.to_string());
    let to_card = board
        .pile(mov.to)
        .and_then(|pile| pile.peek_top())
        .map(|c| c.to_string())
        .unwrap_or_default();
    format!("({}) {from_cards} -> ({}) {to_card}", mov.from, mov.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{HEARTS, SPADES};

    #[test]
    fn test_format_moves() {
        let ace = Card::new_with_rank_suit(0, HEARTS);
        let moves = vec![Move::new(PileId::Slot(2), ace, PileId::Foundation(0)); 12];
        let output = format_moves(&moves);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("S3:F1@A♥ S3:F1@A♥"));
        assert_eq!(lines[1].trim_end(), "S3:F1@A♥ S3:F1@A♥");
    }

    #[test]
    fn test_describe_move() {
        let board = Board::parse("Slot1: 9♠8♥7♣\nSlot2: T♦").unwrap();
        let nine = Card::new_with_rank_suit(8, SPADES);
        let mov = Move::new(PileId::Slot(0), nine, PileId::Slot(1));
        assert_eq!(describe_move(&board, &mov), "(Slot1) 9♠8♥7♣ -> (Slot2) T♦");
    }
}
