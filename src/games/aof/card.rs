//! Cards and the 52-card deck.
//!
//! - `Card`: an immutable card with rank value 2-14 and a suit
//! - `Deck`: a fixed 52-slot deck that deals from its tail
//!
//! The deck never allocates. A `GameState` carries its deck by value, so a
//! cloned state deals exactly the same cards as the original.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SolverError};

/// Rank values (2-14: 2-A).
pub const RANK_2: u8 = 2;
pub const RANK_3: u8 = 3;
pub const RANK_4: u8 = 4;
pub const RANK_5: u8 = 5;
pub const RANK_6: u8 = 6;
pub const RANK_7: u8 = 7;
pub const RANK_8: u8 = 8;
pub const RANK_9: u8 = 9;
pub const RANK_T: u8 = 10;
pub const RANK_J: u8 = 11;
pub const RANK_Q: u8 = 12;
pub const RANK_K: u8 = 13;
pub const RANK_A: u8 = 14;

/// Rank characters for display, indexed by `rank - 2`.
const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    /// All suits in deck order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    /// Suit from its lowercase letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'h' => Some(Suit::Hearts),
            'd' => Some(Suit::Diamonds),
            'c' => Some(Suit::Clubs),
            's' => Some(Suit::Spades),
            _ => None,
        }
    }

    /// Display letter.
    pub fn to_char(self) -> char {
        match self {
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
            Suit::Spades => 's',
        }
    }
}

/// A single playing card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    /// Card index 0-51: (rank - 2) * 4 + suit
    id: u8,
}

impl Card {
    /// Create a card from a rank value (2-14) and a suit.
    pub fn new(rank: u8, suit: Suit) -> Result<Self> {
        if !(RANK_2..=RANK_A).contains(&rank) {
            return Err(SolverError::InvalidCard(format!(
                "rank {} outside 2..=14",
                rank
            )));
        }
        Ok(Self {
            id: (rank - RANK_2) * 4 + suit as u8,
        })
    }

    /// Card from its index (0-51). Callers guarantee the range.
    #[inline]
    pub(crate) fn from_id(id: u8) -> Self {
        debug_assert!((id as usize) < DECK_SIZE, "card id must be 0-51");
        Self { id }
    }

    /// The card's index (0-51).
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Rank value (2-14).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4 + RANK_2
    }

    /// Suit.
    #[inline]
    pub fn suit(&self) -> Suit {
        match self.id % 4 {
            0 => Suit::Hearts,
            1 => Suit::Diamonds,
            2 => Suit::Clubs,
            _ => Suit::Spades,
        }
    }

    /// Rank character for display.
    pub fn rank_char(&self) -> char {
        rank_char(self.rank())
    }
}

/// Display character for a rank value (2-14).
pub fn rank_char(rank: u8) -> char {
    RANK_CHARS[(rank.clamp(RANK_2, RANK_A) - RANK_2) as usize]
}

impl FromStr for Card {
    type Err = SolverError;

    /// Parse "As", "Th" or "10h".
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || SolverError::InvalidCard(format!("cannot parse {:?}", s));

        let suit_char = s.chars().last().ok_or_else(invalid)?;
        let rank_str = &s[..s.len() - suit_char.len_utf8()];
        let suit = Suit::from_char(suit_char).ok_or_else(invalid)?;

        let rank = match rank_str.to_ascii_uppercase().as_str() {
            "10" | "T" => RANK_T,
            "J" => RANK_J,
            "Q" => RANK_Q,
            "K" => RANK_K,
            "A" => RANK_A,
            digit if digit.len() == 1 => match digit.parse::<u8>() {
                Ok(v) if (RANK_2..=RANK_9).contains(&v) => v,
                _ => return Err(invalid()),
            },
            _ => return Err(invalid()),
        };

        Card::new(rank, suit)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit().to_char())
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A 52-card deck dealing from its tail.
#[derive(Clone)]
pub struct Deck {
    /// Cards in current order; only `cards[..len]` are still in the deck.
    cards: [Card; DECK_SIZE],
    /// Number of cards left.
    len: usize,
}

impl Deck {
    /// A full deck in standard order.
    pub fn new() -> Self {
        let mut cards = [Card::from_id(0); DECK_SIZE];
        for (i, card) in cards.iter_mut().enumerate() {
            *card = Card::from_id(i as u8);
        }
        Self {
            cards,
            len: DECK_SIZE,
        }
    }

    /// A full deck shuffled with the given generator.
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut deck = Self::new();
        deck.shuffle(rng);
        deck
    }

    /// A full deck shuffled deterministically from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::shuffled(&mut StdRng::seed_from_u64(seed))
    }

    /// A deck that deals `top` first, in order, followed by the remaining
    /// cards in standard order.
    pub fn stacked(top: &[Card]) -> Result<Self> {
        let mut seen = 0u64;
        for card in top {
            let bit = 1u64 << card.id();
            if seen & bit != 0 {
                return Err(SolverError::InvalidCard(format!("duplicate card {}", card)));
            }
            seen |= bit;
        }

        let mut deck = Self::new();
        let mut write = 0;
        for id in 0..DECK_SIZE as u8 {
            if seen & (1u64 << id) == 0 {
                deck.cards[write] = Card::from_id(id);
                write += 1;
            }
        }
        for &card in top.iter().rev() {
            deck.cards[write] = card;
            write += 1;
        }
        Ok(deck)
    }

    /// Shuffle the cards still in the deck.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards[..self.len].shuffle(rng);
    }

    /// Deal one card.
    pub fn deal_card(&mut self) -> Result<Card> {
        if self.len == 0 {
            return Err(SolverError::EmptyDeck);
        }
        self.len -= 1;
        Ok(self.cards[self.len])
    }

    /// Deal `n` cards.
    pub fn deal_cards(&mut self, n: usize) -> Result<Vec<Card>> {
        self.check_remaining(n)?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            self.len -= 1;
            out.push(self.cards[self.len]);
        }
        Ok(out)
    }

    /// Deal a fixed number of cards into an array.
    pub fn deal_array<const N: usize>(&mut self) -> Result<[Card; N]> {
        self.check_remaining(N)?;
        let mut out = [Card::from_id(0); N];
        for slot in out.iter_mut() {
            self.len -= 1;
            *slot = self.cards[self.len];
        }
        Ok(out)
    }

    fn check_remaining(&self, requested: usize) -> Result<()> {
        if requested > self.len {
            return Err(SolverError::InsufficientCards {
                requested,
                remaining: self.len,
            });
        }
        Ok(())
    }

    /// Rebuild the full deck and reshuffle it.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        *self = Self::shuffled(rng);
    }

    /// Number of cards left.
    pub fn remaining(&self) -> usize {
        self.len
    }

    /// Whether every card has been dealt.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cards still in the deck, bottom first.
    pub fn remaining_cards(&self) -> &[Card] {
        &self.cards[..self.len]
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} remaining)", self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_card_creation() {
        let ace_spades = Card::new(RANK_A, Suit::Spades).unwrap();
        assert_eq!(ace_spades.rank(), 14);
        assert_eq!(ace_spades.suit(), Suit::Spades);
        assert_eq!(ace_spades.to_string(), "As");

        let two_hearts = Card::new(RANK_2, Suit::Hearts).unwrap();
        assert_eq!(two_hearts.rank(), 2);
        assert_eq!(two_hearts.to_string(), "2h");
    }

    #[test]
    fn test_suits_in_index_order() {
        for (i, suit) in Suit::ALL.iter().enumerate() {
            assert_eq!(*suit as usize, i);
            assert_eq!(Suit::from_char(suit.to_char()), Some(*suit));
        }
    }

    #[test]
    fn test_invalid_rank() {
        assert!(matches!(
            Card::new(1, Suit::Clubs),
            Err(SolverError::InvalidCard(_))
        ));
        assert!(matches!(
            Card::new(15, Suit::Clubs),
            Err(SolverError::InvalidCard(_))
        ));
    }

    #[test]
    fn test_card_parsing() {
        assert_eq!("As".parse::<Card>().unwrap().to_string(), "As");
        assert_eq!("10h".parse::<Card>().unwrap().to_string(), "Th");
        assert_eq!("Th".parse::<Card>().unwrap().rank(), 10);
        assert_eq!("2c".parse::<Card>().unwrap().suit(), Suit::Clubs);
        assert!("Xs".parse::<Card>().is_err());
        assert!("Ax".parse::<Card>().is_err());
        assert!("1h".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
    }

    #[test]
    fn test_deal_full_deck() {
        let mut deck = Deck::from_seed(7);
        assert_eq!(deck.remaining(), 52);

        let mut seen = HashSet::new();
        for _ in 0..52 {
            let card = deck.deal_card().unwrap();
            assert!(seen.insert(card), "duplicate card {}", card);
        }
        assert!(deck.is_empty());
        assert_eq!(deck.deal_card(), Err(SolverError::EmptyDeck));
        assert_eq!(
            deck.deal_cards(1),
            Err(SolverError::InsufficientCards {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_deal_cards_underflow() {
        let mut deck = Deck::new();
        let dealt = deck.deal_cards(50).unwrap();
        assert_eq!(dealt.len(), 50);
        assert!(matches!(
            deck.deal_array::<3>(),
            Err(SolverError::InsufficientCards {
                requested: 3,
                remaining: 2
            })
        ));
        // A failed deal removes nothing.
        assert_eq!(deck.remaining(), 2);
    }

    #[test]
    fn test_deals_from_tail() {
        let mut deck = Deck::new();
        assert_eq!(deck.deal_card().unwrap().to_string(), "As");
        assert_eq!(deck.deal_card().unwrap().to_string(), "Ac");
    }

    #[test]
    fn test_stacked_deck() {
        let top: Vec<Card> = ["Ah", "Kd", "2c"].iter().map(|s| s.parse().unwrap()).collect();
        let mut deck = Deck::stacked(&top).unwrap();
        assert_eq!(deck.remaining(), 52);
        assert_eq!(deck.deal_cards(3).unwrap(), top);

        let rest: HashSet<Card> = deck.remaining_cards().iter().copied().collect();
        assert_eq!(rest.len(), 49);
        assert!(!rest.contains(&top[0]));

        let dup = [top[0], top[0]];
        assert!(matches!(Deck::stacked(&dup), Err(SolverError::InvalidCard(_))));
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let mut a = Deck::from_seed(42);
        let mut b = Deck::from_seed(42);
        assert_eq!(a.deal_cards(13).unwrap(), b.deal_cards(13).unwrap());

        let mut clone = a.clone();
        assert_eq!(a.deal_card().unwrap(), clone.deal_card().unwrap());
    }

    #[test]
    fn test_reset() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut deck = Deck::shuffled(&mut rng);
        deck.deal_cards(20).unwrap();
        deck.reset(&mut rng);
        assert_eq!(deck.remaining(), 52);
        let unique: HashSet<Card> = deck.remaining_cards().iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }
}
