//! Information sets for All-or-Fold.
//!
//! An information set is what one seat can see when it acts: its own hand
//! class, the status of the opponents it is allowed to observe, and the pot.
//!
//! Visibility is asymmetric. The blinds (seats 0 and 1) observe all three
//! opponents; seats 2 and 3 only observe the seats that acted before them
//! (lower indices). Keys look like:
//!
//! ```text
//! P2:[P0:P][P1:P]AKs Pot:1.40
//! P0:[P1:P][P2:A][P3:F]77 Pot:9.40
//! ```

use std::fmt;

use super::card::{rank_char, Card};
use super::config::NUM_PLAYERS;
use super::state::AofState;
use crate::cfr::game::InfoState;

/// What an observer sees of another seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStatus {
    /// Still in the hand with chips behind.
    Playing,
    /// Folded.
    Folded,
    /// Committed the whole stack.
    AllIn,
}

impl PlayerStatus {
    /// Single-letter code used in keys.
    pub fn code(&self) -> char {
        match self {
            PlayerStatus::Playing => 'P',
            PlayerStatus::Folded => 'F',
            PlayerStatus::AllIn => 'A',
        }
    }
}

/// Suit-isomorphic hole-card class, e.g. `AKs`, `T9o`, `77`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandClass {
    /// Higher rank value.
    pub high: u8,
    /// Lower rank value.
    pub low: u8,
    /// Same suit. Always false for pairs.
    pub suited: bool,
}

impl HandClass {
    /// Abstract two hole cards.
    pub fn from_cards(cards: [Card; 2]) -> Self {
        let (a, b) = (cards[0], cards[1]);
        let (high, low) = if a.rank() >= b.rank() {
            (a.rank(), b.rank())
        } else {
            (b.rank(), a.rank())
        };
        Self {
            high,
            low,
            suited: high != low && a.suit() == b.suit(),
        }
    }

    /// Whether both cards share a rank.
    pub fn is_pair(&self) -> bool {
        self.high == self.low
    }
}

impl fmt::Display for HandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", rank_char(self.high), rank_char(self.low))?;
        if !self.is_pair() {
            write!(f, "{}", if self.suited { 's' } else { 'o' })?;
        }
        Ok(())
    }
}

/// Whether `observer` is allowed to see the status of `other`.
pub fn is_visible(observer: usize, other: usize) -> bool {
    other != observer && (observer <= 1 || other < observer)
}

/// Information set of one seat at a decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AofInfoSet {
    /// Observing seat.
    pub player: usize,
    /// Observer's hand class, `None` before the deal.
    pub hand: Option<HandClass>,
    /// Visible opponent statuses by seat; `None` for hidden seats and self.
    pub opponents: [Option<PlayerStatus>; NUM_PLAYERS],
    /// Pot in hundredths of a chip.
    pub pot_cents: i64,
}

impl AofInfoSet {
    /// Build the information set of `player` from a full state.
    pub fn from_state(state: &AofState, player: usize) -> Self {
        let mut opponents = [None; NUM_PLAYERS];
        for (seat, slot) in opponents.iter_mut().enumerate() {
            if is_visible(player, seat) {
                *slot = Some(state.status(seat));
            }
        }

        Self {
            player,
            hand: state.hole_cards(player).map(HandClass::from_cards),
            opponents,
            pot_cents: (state.pot() * 100.0).round() as i64,
        }
    }

    /// Pot in chips.
    pub fn pot(&self) -> f64 {
        self.pot_cents as f64 / 100.0
    }
}

impl InfoState for AofInfoSet {
    fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AofInfoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}:", self.player)?;
        for (seat, status) in self.opponents.iter().enumerate() {
            if let Some(status) = status {
                write!(f, "[P{}:{}]", seat, status.code())?;
            }
        }
        match &self.hand {
            Some(hand) => write!(f, "{}", hand)?,
            None => write!(f, "??")?,
        }
        write!(
            f,
            " Pot:{}.{:02}",
            self.pot_cents / 100,
            self.pot_cents.rem_euclid(100)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::aof::action::AofAction;
    use crate::games::aof::card::Deck;
    use crate::games::aof::config::AofConfig;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    fn dealt_state(top: &[&str]) -> AofState {
        let cards: Vec<Card> = top.iter().map(|s| card(s)).collect();
        let deck = Deck::stacked(&cards).unwrap();
        let mut state = AofState::new(&AofConfig::default(), deck);
        state.apply_action(AofAction::Deal).unwrap();
        state
    }

    #[test]
    fn test_hand_class() {
        assert_eq!(HandClass::from_cards([card("Kh"), card("Ah")]).to_string(), "AKs");
        assert_eq!(HandClass::from_cards([card("9d"), card("Tc")]).to_string(), "T9o");
        assert_eq!(HandClass::from_cards([card("7s"), card("7h")]).to_string(), "77");
        assert_eq!(HandClass::from_cards([card("10s"), card("2s")]).to_string(), "T2s");
    }

    #[test]
    fn test_visibility() {
        for other in [1, 2, 3] {
            assert!(is_visible(0, other));
        }
        for other in [0, 2, 3] {
            assert!(is_visible(1, other));
        }
        assert!(is_visible(2, 0) && is_visible(2, 1));
        assert!(!is_visible(2, 3));
        assert!(is_visible(3, 2));
        assert!(!is_visible(3, 3));
    }

    #[test]
    fn test_first_actor_key() {
        let state = dealt_state(&["2c", "3d", "4h", "5s", "Ah", "Kh", "9c", "9d"]);
        let info = AofInfoSet::from_state(&state, 2);
        assert_eq!(info.key(), "P2:[P0:P][P1:P]AKs Pot:1.40");
    }

    #[test]
    fn test_keys_reflect_opponent_status() {
        let mut state = dealt_state(&["7s", "7h", "3d", "4h", "Ah", "Kh", "9c", "9d"]);
        state.apply_action(AofAction::AllIn).unwrap(); // P2
        state.apply_action(AofAction::Fold).unwrap(); // P3

        // Small blind sees everyone
        let info = AofInfoSet::from_state(&state, 0);
        assert_eq!(info.key(), "P0:[P1:P][P2:A][P3:F]77 Pot:9.40");

        // Seat 3 never sees itself or later seats
        let info = AofInfoSet::from_state(&state, 3);
        assert_eq!(info.key(), "P3:[P0:P][P1:P][P2:A]99 Pot:9.40");
    }

    #[test]
    fn test_same_view_same_key() {
        // Different suits, same hand class and history
        let a = dealt_state(&["2c", "3d", "4h", "5s", "Ah", "Kh", "9c", "9d"]);
        let b = dealt_state(&["2c", "3d", "4h", "5s", "As", "Ks", "9c", "9d"]);
        assert_eq!(
            AofInfoSet::from_state(&a, 2).key(),
            AofInfoSet::from_state(&b, 2).key()
        );
    }
}
