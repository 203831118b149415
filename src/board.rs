use crate::config::{SolverConfig, StackRule};
use crate::error::MoveError;
use crate::moves::{AppliedMove, Move};

use anyhow::{Context, Result, bail};
use smallvec::SmallVec;
use std::fmt;
use std::ops::{Index, IndexMut};

pub const TOTAL_SLOTS: usize = 13;
pub const TOTAL_FOUNDATIONS: usize = 4;
pub const TOTAL_PILES: usize = TOTAL_SLOTS + TOTAL_FOUNDATIONS;
pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

pub const HEARTS: u8 = 0;
pub const DIAMONDS: u8 = 1;
pub const SPADES: u8 = 2;
pub const CLUBS: u8 = 3;

const SUITS: [char; 5] = ['♥', '♦', '♠', '♣', '?'];
const ASCII_SUITS: [char; 4] = ['H', 'D', 'S', 'C'];
const RANKS: [char; 14] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', '?',
];
const SLOT_SIZE: usize = 16;

pub type Cards = SmallVec<[Card; SLOT_SIZE]>;

/// Identifies one pile of the board: a playing slot or a foundation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PileId {
    Slot(u8),
    Foundation(u8),
}

impl PileId {
    /// Short form used in move listings, e.g. `S3` or `F1`.
    pub fn code(&self) -> String {
        match self {
            PileId::Slot(idx) => format!("S{}", idx + 1),
            PileId::Foundation(idx) => format!("F{}", idx + 1),
        }
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileId::Slot(idx) => write!(f, "Slot{}", idx + 1),
            PileId::Foundation(idx) => write!(f, "Foundation{}", idx + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub slots: [Slot; TOTAL_SLOTS],
    pub foundations: [Slot; TOTAL_FOUNDATIONS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::new()),
            foundations: std::array::from_fn(|_| Slot::foundation()),
        }
    }

    /// Deals a shuffled deck round-robin into the slots, then sinks every King
    /// to the bottom of its slot.
    pub fn new_from_seed(seed: u32) -> Self {
        let mut current_seed = seed;
        let mut rnd = || {
            current_seed = ((current_seed as u64 * 16807) % 0x7fffffff) as u32;
            current_seed
        };
        let mut deck: [Card; MAX_CARD as usize] =
            std::array::from_fn(|i| Card::new_with_id(i as u8));

        for _ in 0..7 {
            for j in 0..deck.len() {
                let k = (rnd() % MAX_CARD as u32) as usize;
                deck.swap(j, k);
            }
        }

        let mut board = Board::new();
        for (i, card) in deck.into_iter().enumerate() {
            board.slots[i % TOTAL_SLOTS].push(card);
        }
        for slot in board.slots.iter_mut() {
            slot.push_kings_to_bottom();
        }

        board
    }

    pub fn apply_config(&mut self, config: &SolverConfig) {
        for slot in self.slots.iter_mut() {
            slot.stack_rule = config.stack_rule;
            slot.max_stack_size = config.max_stack_size;
        }
    }

    pub fn pile(&self, id: PileId) -> Option<&Slot> {
        match id {
            PileId::Slot(idx) => self.slots.get(idx as usize),
            PileId::Foundation(idx) => self.foundations.get(idx as usize),
        }
    }

    /// Slots first, then foundations, in board order.
    pub fn piles(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().chain(self.foundations.iter())
    }

    pub fn total_cards(&self) -> usize {
        self.piles().map(Slot::len).sum()
    }

    pub fn foundation_count(&self) -> usize {
        self.foundations.iter().map(Slot::len).sum()
    }

    pub fn is_won(&self) -> bool {
        self.foundation_count() == MAX_CARD as usize
    }

    pub fn is_valid(&self) -> bool {
        let mut seen = [false; MAX_CARD as usize];
        let mut count = 0;
        for pile in self.piles() {
            for &card in &pile.cards {
                if card.is_unknown() {
                    return false;
                }
                let id = card.id() as usize;
                if seen[id] {
                    return false;
                }
                seen[id] = true;
                count += 1;
            }
        }

        let foundations_ordered = self.foundations.iter().all(|foundation| {
            foundation
                .cards
                .iter()
                .enumerate()
                .all(|(i, card)| {
                    card.rank() as usize == i && card.suit() == foundation.cards[0].suit()
                })
        });

        count == MAX_CARD as usize && foundations_ordered
    }

    /// Lifts `mov.card` and everything above it from the source pile onto the
    /// target, validating the lifted stack and the target's acceptance rule.
    pub fn try_move(&mut self, mov: Move) -> Result<AppliedMove, MoveError> {
        let Move { from, card, to } = mov;
        if from == to {
            return Err(MoveError::SamePile { pile: from });
        }
        let source = self.pile(from).ok_or(MoveError::UnknownPile { pile: from })?;
        let target = self.pile(to).ok_or(MoveError::UnknownPile { pile: to })?;

        let start = source
            .position(card)
            .ok_or(MoveError::CardNotFound { card, pile: from })?;
        let count = source.len() - start;
        if !source.is_movable_stack(start) {
            return Err(MoveError::InvalidStack { card, pile: from });
        }
        if source.max_stack_size > 0 && count > source.max_stack_size {
            return Err(MoveError::StackTooLarge {
                count,
                limit: source.max_stack_size,
            });
        }
        if !target.can_accept(card) {
            return Err(MoveError::Rejected { card, pile: to });
        }
        if target.is_foundation && count > 1 {
            return Err(MoveError::FoundationStack { pile: to });
        }

        let cards = self[from].drain_from(start);
        self[to].cards.extend(cards);
        Ok(AppliedMove { mov, count })
    }

    /// Reverses a move previously returned by [`Board::try_move`].
    pub fn undo_move(&mut self, applied: &AppliedMove) {
        let Move { from, to, .. } = applied.mov;
        let start = self[to].len() - applied.count;
        let cards = self[to].drain_from(start);
        self[from].cards.extend(cards);
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Board::new();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            let (piles, rest, kind) = if let Some(rest) = line.strip_prefix("Slot") {
                (&mut board.slots[..], rest, "slot")
            } else if let Some(rest) = line.strip_prefix("Foundation") {
                (&mut board.foundations[..], rest, "foundation")
            } else {
                bail!("Unknown pile at '{line}'");
            };
            let mut parts = rest.splitn(2, ':');
            let idx = parts
                .next()
                .unwrap_or("")
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {kind} index"))
                .with_context(line_context)?;
            let pile = idx
                .checked_sub(1)
                .and_then(|idx| piles.get_mut(idx))
                .with_context(|| format!("No {kind} numbered {idx}"))
                .with_context(line_context)?;
            let cards = Self::parse_cards(parts.next().unwrap_or("").trim())
                .with_context(line_context)?;
            pile.cards.extend(cards);
        }

        Ok(board)
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c1) = chars.peek() {
            if c1.is_whitespace() || c1 == ',' {
                chars.next();
                continue;
            }
            let rank = c1;
            chars.next();
            let suit = match chars.next() {
                Some(s) => s,
                None => bail!("Missing suit after '{rank}'"),
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn pretty_print(&self) -> String {
        let mut lines = vec![];

        for (i, foundation) in self.foundations.iter().enumerate() {
            if !foundation.is_empty() {
                lines.push(format!("Foundation{}: {}", i + 1, foundation.pretty_print()));
            }
        }

        for (i, slot) in self.slots.iter().enumerate() {
            if !slot.is_empty() {
                lines.push(format!("Slot{}: {}", i + 1, slot.pretty_print()));
            }
        }

        lines.join("\n")
    }
}

impl Index<PileId> for Board {
    type Output = Slot;

    fn index(&self, id: PileId) -> &Slot {
        match id {
            PileId::Slot(idx) => &self.slots[idx as usize],
            PileId::Foundation(idx) => &self.foundations[idx as usize],
        }
    }
}

impl IndexMut<PileId> for Board {
    fn index_mut(&mut self, id: PileId) -> &mut Slot {
        match id {
            PileId::Slot(idx) => &mut self.slots[idx as usize],
            PileId::Foundation(idx) => &mut self.foundations[idx as usize],
        }
    }
}

/// An ordered column of cards, bottom to top. Foundations are slots with
/// `is_foundation` set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    pub cards: Cards,
    pub is_foundation: bool,
    pub stack_rule: StackRule,
    pub max_stack_size: usize,
}

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foundation() -> Self {
        Self {
            is_foundation: true,
            max_stack_size: 1,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn position(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn drain_from(&mut self, start: usize) -> Cards {
        self.cards.drain(start..).collect()
    }

    /// Foundations take an Ace when empty, otherwise the next rank of the same
    /// suit. Slots only take the rank directly below their top card and never
    /// accept anything while empty.
    pub fn can_accept(&self, card: Card) -> bool {
        match (self.is_foundation, self.peek_top()) {
            (true, None) => card.is_ace(),
            (true, Some(top)) => top.suit() == card.suit() && top.rank() + 1 == card.rank(),
            (false, None) => false,
            (false, Some(top)) => card.rank() + 1 == top.rank(),
        }
    }

    /// Whether the cards from `start` to the top descend one rank at a time
    /// under this slot's stack rule.
    pub fn is_movable_stack(&self, start: usize) -> bool {
        self.cards[start..].windows(2).all(|pair| {
            let (lower, upper) = (pair[0], pair[1]);
            upper.rank() + 1 == lower.rank()
                && match self.stack_rule {
                    StackRule::AnySuit => true,
                    StackRule::AlternatingColor => lower.is_red() != upper.is_red(),
                }
        })
    }

    pub fn push_kings_to_bottom(&mut self) {
        let (kings, others): (Cards, Cards) =
            self.cards.iter().copied().partition(|card| card.is_king());
        self.cards = kings;
        self.cards.extend(others);
    }

    pub fn pretty_print(&self) -> String {
        self.cards.iter().map(|card| card.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub const UNKNOWN: Self = Self(MAX_CARD);

    pub fn new_with_id(id: u8) -> Self {
        if id >= MAX_CARD {
            Self::UNKNOWN
        } else {
            Self(id)
        }
    }

    pub fn new_with_rank_suit(rank: u8, suit: u8) -> Self {
        Self::new_with_id(suit * MAX_RANK + rank)
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let rank_idx = RANKS[..MAX_RANK as usize]
            .iter()
            .position(|&r| r == rank.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit_idx = SUITS[..MAX_SUIT as usize]
            .iter()
            .position(|&s| s == suit)
            .or_else(|| {
                ASCII_SUITS
                    .iter()
                    .position(|&s| s == suit.to_ascii_uppercase())
            })
            .with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Card::new_with_rank_suit(rank_idx as u8, suit_idx as u8))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 >= Card::UNKNOWN.0
    }

    /// Zero-based: Ace is 0, King is 12.
    pub fn rank(&self) -> u8 {
        self.0 % MAX_RANK
    }

    pub fn suit(&self) -> u8 {
        self.0 / MAX_RANK
    }

    pub fn is_red(&self) -> bool {
        matches!(self.suit(), HEARTS | DIAMONDS)
    }

    pub fn is_ace(&self) -> bool {
        !self.is_unknown() && self.rank() == 0
    }

    pub fn is_king(&self) -> bool {
        !self.is_unknown() && self.rank() == MAX_RANK - 1
    }
}

impl Default for Card {
    fn default() -> Self {
        Card::UNKNOWN
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return write!(f, "??");
        }
        write!(
            f,
            "{}{}",
            RANKS[self.rank() as usize],
            SUITS[self.suit() as usize]
        )
    }
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
    fn test_parse_board() {
        let board = Board::parse(BOARD_STR).unwrap();
        assert!(board.is_valid());
        assert_eq!(board.total_cards(), 52);
        assert_eq!(board.foundation_count(), 39);
        assert_eq!(BOARD_STR, board.pretty_print());
    }

    #[test]
    fn test_parse_ascii_suits() {
        let board = Board::parse("Slot4: KS QH\nFoundation2: AC").unwrap();
        assert_eq!(board.slots[3].pretty_print(), "K♠Q♥");
        assert_eq!(board.foundations[1].pretty_print(), "A♣");
    }

    #[test]
    fn test_parse_rejects_unknown_pile() {
        assert!(Board::parse("Slot14: A♥").is_err());
        assert!(Board::parse("Foundation0: A♥").is_err());
        assert!(Board::parse("Tableau1: A♥").is_err());
        assert!(Board::parse("Slot1: A").is_err());
    }

    #[test]
    fn test_new_board() {
        let board = Board::new();
        assert_eq!(board.total_cards(), 0);
        assert!(!board.is_valid());
        assert!(!board.is_won());
        assert!(board.foundations.iter().all(|f| f.is_foundation));
        assert!(board.slots.iter().all(|s| !s.is_foundation));
    }

    #[test]
    fn test_new_from_seed() {
        let board = Board::new_from_seed(670334786);
        assert!(board.is_valid());
        assert_eq!(board.foundation_count(), 0);
        assert!(board.slots.iter().all(|slot| slot.len() == 4));
        for slot in &board.slots {
            let kings = slot.cards.iter().filter(|c| c.is_king()).count();
            assert!(slot.cards[..kings].iter().all(|c| c.is_king()));
        }
        assert_eq!(board, Board::new_from_seed(670334786));
    }

    #[test]
    fn test_win_detection() {
        let mut board = Board::parse(BOARD_STR).unwrap();
        assert!(!board.is_won());
        let hearts: Vec<Card> = (0..MAX_RANK)
            .map(|r| Card::new_with_rank_suit(r, HEARTS))
            .collect();
        board.slots[0].cards.clear();
        board.slots[1].cards.clear();
        board.foundations[3].cards.extend(hearts.iter().take(12).copied());
        board.slots[0].push(hearts[12]);
        assert!(!board.is_won());
        board.slots[0].cards.clear();
        board.foundations[3].push(hearts[12]);
        assert!(board.is_won());
    }

    #[test]
    fn test_can_accept() {
        let mut slot = Slot::new();
        let ace = Card::new_with_rank_suit(0, SPADES);
        let two = Card::new_with_rank_suit(1, SPADES);
        let three_hearts = Card::new_with_rank_suit(2, HEARTS);
        assert!(!slot.can_accept(two));
        slot.push(three_hearts);
        assert!(slot.can_accept(two));
        assert!(!slot.can_accept(ace));

        let mut foundation = Slot::foundation();
        assert!(foundation.can_accept(ace));
        assert!(!foundation.can_accept(two));
        foundation.push(ace);
        assert!(foundation.can_accept(two));
        assert!(!foundation.can_accept(Card::new_with_rank_suit(1, CLUBS)));
    }

    #[test]
    fn test_move_and_undo() {
        let mut board = Board::parse(BOARD_STR).unwrap();
        let before = board.clone();
        let two = Card::new_with_rank_suit(1, HEARTS);
        let mov = Move::new(PileId::Slot(0), two, PileId::Slot(1));
        let applied = board.try_move(mov).unwrap();
        assert_eq!(applied.count, 1);
        assert_eq!(board.slots[1].peek_top(), Some(&two));
        assert_eq!(board.total_cards(), 52);
        board.undo_move(&applied);
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_stack() {
        let mut board = Board::parse("Slot1: 9♠8♥7♣\nSlot2: T♦\nSlot3: 5♥6♥").unwrap();
        let nine = Card::new_with_rank_suit(8, SPADES);
        let applied = board
            .try_move(Move::new(PileId::Slot(0), nine, PileId::Slot(1)))
            .unwrap();
        assert_eq!(applied.count, 3);
        assert!(board.slots[0].is_empty());
        assert_eq!(board.slots[1].pretty_print(), "T♦9♠8♥7♣");
        board.undo_move(&applied);
        assert_eq!(board.slots[0].pretty_print(), "9♠8♥7♣");
        assert_eq!(board.slots[1].pretty_print(), "T♦");

        let five = Card::new_with_rank_suit(4, HEARTS);
        let err = board
            .try_move(Move::new(PileId::Slot(2), five, PileId::Slot(0)))
            .unwrap_err();
        assert_eq!(
            err,
            MoveError::InvalidStack {
                card: five,
                pile: PileId::Slot(2)
            }
        );
    }

    #[test]
    fn test_stack_rules() {
        let mut board = Board::parse("Slot1: 9♠8♣7♥\nSlot2: T♦").unwrap();
        let nine = Card::new_with_rank_suit(8, SPADES);
        let mov = Move::new(PileId::Slot(0), nine, PileId::Slot(1));

        board.apply_config(&SolverConfig {
            stack_rule: StackRule::AlternatingColor,
            ..Default::default()
        });
        assert!(matches!(board.try_move(mov), Err(MoveError::InvalidStack { .. })));

        board.apply_config(&SolverConfig {
            max_stack_size: 2,
            ..Default::default()
        });
        assert_eq!(
            board.try_move(mov),
            Err(MoveError::StackTooLarge { count: 3, limit: 2 })
        );

        board.apply_config(&SolverConfig::default());
        assert!(board.try_move(mov).is_ok());
    }

    #[test]
    fn test_foundation_takes_single_card() {
        let mut board = Board::parse("Slot1: 2♥A♥\nSlot2: 3♠2♠").unwrap();
        let two = Card::new_with_rank_suit(1, SPADES);
        assert!(board
            .try_move(Move::new(PileId::Slot(1), two, PileId::Foundation(0)))
            .is_err());
        let ace = Card::new_with_rank_suit(0, HEARTS);
        assert!(board
            .try_move(Move::new(PileId::Slot(0), ace, PileId::Foundation(2)))
            .is_ok());
        assert_eq!(
            board.try_move(Move::new(PileId::Slot(0), ace, PileId::Slot(0))),
            Err(MoveError::SamePile {
                pile: PileId::Slot(0)
            })
        );
    }

    #[test]
    fn test_card() {
        let card = Card::parse('T', '♣').unwrap();
        assert_eq!(card.rank(), 9);
        assert_eq!(card.suit(), CLUBS);
        assert!(!card.is_red());
        assert_eq!(card.to_string(), "T♣");
        assert!(Card::new_with_rank_suit(0, DIAMONDS).is_red());
        assert!(Card::parse('X', '♣').is_err());
        assert_eq!(Card::new_with_id(MAX_CARD), Card::UNKNOWN);
    }
}
