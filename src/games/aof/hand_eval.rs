//! Poker hand evaluation.
//!
//! Scores are `(category, tiebreakers)` tuples compared lexicographically, so
//! the derived `Ord` on `HandScore` is the total order used at showdown.
//! Seven-card hands are scored as the best of their 21 five-card subsets.

use std::cmp::Ordering;
use std::fmt;

use super::card::{rank_char, Card, RANK_5, RANK_A};
use crate::error::{Result, SolverError};

/// Hand categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    /// Category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }

    /// Number of meaningful tiebreakers for this category.
    pub fn tiebreaker_len(&self) -> usize {
        match self {
            HandCategory::Straight | HandCategory::StraightFlush => 1,
            HandCategory::FourOfAKind | HandCategory::FullHouse => 2,
            HandCategory::ThreeOfAKind | HandCategory::TwoPair => 3,
            HandCategory::OnePair => 4,
            HandCategory::HighCard | HandCategory::Flush => 5,
        }
    }
}

/// A comparable hand score.
///
/// Field order matters: the derived ordering compares the category first and
/// then the zero-padded tiebreakers left to right.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandScore {
    category: HandCategory,
    tiebreakers: [u8; 5],
}

impl HandScore {
    fn new(category: HandCategory, ranks: &[u8]) -> Self {
        let mut tiebreakers = [0u8; 5];
        for (slot, &r) in tiebreakers.iter_mut().zip(ranks) {
            *slot = r;
        }
        Self {
            category,
            tiebreakers,
        }
    }

    /// Hand category.
    pub fn category(&self) -> HandCategory {
        self.category
    }

    /// Tiebreaker rank values for this category.
    pub fn tiebreakers(&self) -> &[u8] {
        &self.tiebreakers[..self.category.tiebreaker_len()]
    }
}

impl fmt::Debug for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranks: String = self.tiebreakers().iter().map(|&r| rank_char(r)).collect();
        write!(f, "{} [{}]", self.category.name(), ranks)
    }
}

/// Hand evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PokerEvaluator;

impl PokerEvaluator {
    /// Create a new evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Score two hole cards plus five community cards.
    pub fn evaluate_hand(&self, hole: &[Card], community: &[Card]) -> Result<HandScore> {
        if hole.len() != 2 {
            return Err(SolverError::WrongCardCount {
                expected: 2,
                actual: hole.len(),
            });
        }
        if community.len() != 5 {
            return Err(SolverError::WrongCardCount {
                expected: 5,
                actual: community.len(),
            });
        }
        let cards = [
            hole[0],
            hole[1],
            community[0],
            community[1],
            community[2],
            community[3],
            community[4],
        ];
        Ok(self.evaluate_7(&cards))
    }

    /// Score exactly five cards.
    pub fn evaluate_five_card_hand(&self, hand: &[Card]) -> Result<HandScore> {
        match <&[Card; 5]>::try_from(hand) {
            Ok(cards) => Ok(self.evaluate_5(cards)),
            Err(_) => Err(SolverError::WrongCardCount {
                expected: 5,
                actual: hand.len(),
            }),
        }
    }

    /// Best five-card score out of seven cards.
    pub fn evaluate_7(&self, cards: &[Card; 7]) -> HandScore {
        let mut best = HandScore::new(HandCategory::HighCard, &[]);

        // All 21 five-card subsets
        for i in 0..7 {
            for j in (i + 1)..7 {
                for k in (j + 1)..7 {
                    for l in (k + 1)..7 {
                        for m in (l + 1)..7 {
                            let hand = [cards[i], cards[j], cards[k], cards[l], cards[m]];
                            let score = self.evaluate_5(&hand);
                            if score > best {
                                best = score;
                            }
                        }
                    }
                }
            }
        }

        best
    }

    /// Score a five-card hand.
    pub fn evaluate_5(&self, cards: &[Card; 5]) -> HandScore {
        let mut rank_counts = [0u8; 15];
        let mut rank_bits = 0u16;

        for card in cards {
            rank_counts[card.rank() as usize] += 1;
            rank_bits |= 1 << card.rank();
        }

        let suit = cards[0].suit();
        let is_flush = cards.iter().all(|c| c.suit() == suit);
        let straight_high = find_straight(rank_bits);

        if is_flush {
            if let Some(high) = straight_high {
                return HandScore::new(HandCategory::StraightFlush, &[high]);
            }
        }

        // Group ranks by multiplicity, high ranks first
        let mut quads = Vec::with_capacity(1);
        let mut trips = Vec::with_capacity(1);
        let mut pairs = Vec::with_capacity(2);
        let mut singles = Vec::with_capacity(5);

        for rank in (2..=RANK_A).rev() {
            match rank_counts[rank as usize] {
                4 => quads.push(rank),
                3 => trips.push(rank),
                2 => pairs.push(rank),
                1 => singles.push(rank),
                _ => {}
            }
        }

        if let Some(&quad) = quads.first() {
            let kicker = singles.first().copied().unwrap_or(0);
            return HandScore::new(HandCategory::FourOfAKind, &[quad, kicker]);
        }

        if let (Some(&trip), Some(&pair)) = (trips.first(), pairs.first()) {
            return HandScore::new(HandCategory::FullHouse, &[trip, pair]);
        }

        if is_flush {
            return HandScore::new(HandCategory::Flush, &singles);
        }

        if let Some(high) = straight_high {
            return HandScore::new(HandCategory::Straight, &[high]);
        }

        if let Some(&trip) = trips.first() {
            return HandScore::new(HandCategory::ThreeOfAKind, &[trip, singles[0], singles[1]]);
        }

        if pairs.len() == 2 {
            return HandScore::new(HandCategory::TwoPair, &[pairs[0], pairs[1], singles[0]]);
        }

        if let Some(&pair) = pairs.first() {
            return HandScore::new(
                HandCategory::OnePair,
                &[pair, singles[0], singles[1], singles[2]],
            );
        }

        HandScore::new(HandCategory::HighCard, &singles)
    }

    /// Compare two scores. `Greater` means `a` wins, `Equal` is a split.
    pub fn compare_hands(&self, a: &HandScore, b: &HandScore) -> Ordering {
        a.cmp(b)
    }
}

/// High card of the best straight in a rank bitmask (bit r set for rank r).
///
/// The wheel A-2-3-4-5 reports 5.
fn find_straight(rank_bits: u16) -> Option<u8> {
    for high in (6..=RANK_A).rev() {
        let mask = 0b11111u16 << (high - 4);
        if rank_bits & mask == mask {
            return Some(high);
        }
    }

    let wheel = (1u16 << RANK_A) | 0b111100;
    if rank_bits & wheel == wheel {
        return Some(RANK_5);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards_from_str(s: &str) -> Vec<Card> {
        s.split_whitespace().map(|c| c.parse().unwrap()).collect()
    }

    fn score5(s: &str) -> HandScore {
        PokerEvaluator::new()
            .evaluate_five_card_hand(&cards_from_str(s))
            .unwrap()
    }

    #[test]
    fn test_categories() {
        let cases = [
            ("As Kd Qh Jc 9s", HandCategory::HighCard),
            ("As Ad Kh Qc Js", HandCategory::OnePair),
            ("As Ad Kh Kc Js", HandCategory::TwoPair),
            ("As Ad Ah Kc Js", HandCategory::ThreeOfAKind),
            ("Ts 9d 8h 7c 6s", HandCategory::Straight),
            ("As Ks 9s 7s 2s", HandCategory::Flush),
            ("As Ad Ah Kc Kd", HandCategory::FullHouse),
            ("As Ad Ah Ac Ks", HandCategory::FourOfAKind),
            ("9s 8s 7s 6s 5s", HandCategory::StraightFlush),
        ];
        for (hand, category) in cases {
            assert_eq!(score5(hand).category(), category, "{}", hand);
        }
    }

    #[test]
    fn test_tiebreakers() {
        assert_eq!(score5("As Ad Ah Ac 7s").tiebreakers(), &[14, 7]);
        assert_eq!(score5("3s 3d 3h Kc Kd").tiebreakers(), &[3, 13]);
        assert_eq!(score5("Qs Qd Qh 2c 9d").tiebreakers(), &[12, 9, 2]);
        assert_eq!(score5("Js Jd 4h 4c 9d").tiebreakers(), &[11, 4, 9]);
        assert_eq!(score5("8s 8d Ah 3c 5d").tiebreakers(), &[8, 14, 5, 3]);
        assert_eq!(score5("Ks 2s 9s 7s 4s").tiebreakers(), &[13, 9, 7, 4, 2]);
    }

    #[test]
    fn test_wheel_and_broadway() {
        let eval = PokerEvaluator::new();
        let wheel = score5("As 2d 3h 4c 5s");
        assert_eq!(wheel.category(), HandCategory::Straight);
        assert_eq!(wheel.tiebreakers(), &[5]);

        let broadway = score5("10s Jd Qh Kc As");
        assert_eq!(broadway.category(), HandCategory::Straight);
        assert_eq!(broadway.tiebreakers(), &[14]);

        assert_eq!(eval.compare_hands(&broadway, &wheel), Ordering::Greater);
        assert_eq!(eval.compare_hands(&wheel, &score5("6s 2d 3h 4c 5s")), Ordering::Less);

        let steel_wheel = score5("Ah 2h 3h 4h 5h");
        assert_eq!(steel_wheel.category(), HandCategory::StraightFlush);
        assert_eq!(steel_wheel.tiebreakers(), &[5]);
    }

    #[test]
    fn test_order_invariance() {
        let a = score5("Kh Kd 7s 7c 2h");
        let b = score5("2h 7c Kd 7s Kh");
        let c = score5("7s 2h Kh 7c Kd");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_category_dominates_kickers() {
        let ladder = [
            "7c 5d 4h 3s 2c",
            "2c 2d 3h 4s 5c",
            "2c 2d 3h 3s 4c",
            "2c 2d 2h 3s 4c",
            "2c 3d 4h 5s 6c",
            "2c 3c 4c 5c 7c",
            "2c 2d 2h 3s 3c",
            "2c 2d 2h 2s 3c",
            "2c 3c 4c 5c 6c",
        ];
        let strongest_lower = [
            "As Kd Qh Jc 9s",
            "As Ad Kh Qc Js",
            "As Ad Kh Kc Qs",
            "As Ad Ah Kc Qs",
            "Ts Jd Qh Kc As",
            "As Ks Qs Js 9s",
            "As Ad Ah Kc Kd",
            "As Ad Ah Ac Ks",
        ];
        let eval = PokerEvaluator::new();
        for i in 1..ladder.len() {
            let weakest = score5(ladder[i]);
            let best_below = score5(strongest_lower[i - 1]);
            assert_eq!(
                eval.compare_hands(&weakest, &best_below),
                Ordering::Greater,
                "{} should beat {}",
                ladder[i],
                strongest_lower[i - 1]
            );
        }
    }

    #[test]
    fn test_kicker_and_tie() {
        let eval = PokerEvaluator::new();
        let board = cards_from_str("Qs Jc 7d 3s 2h");
        let ak = eval.evaluate_hand(&cards_from_str("Ah Kd"), &board).unwrap();
        let aq = eval.evaluate_hand(&cards_from_str("Ac 9d"), &board).unwrap();
        assert_eq!(eval.compare_hands(&ak, &aq), Ordering::Greater);

        // Board plays for both
        let board = cards_from_str("As Ks Qs Js Ts");
        let x = eval.evaluate_hand(&cards_from_str("2h 3d"), &board).unwrap();
        let y = eval.evaluate_hand(&cards_from_str("4c 5c"), &board).unwrap();
        assert_eq!(eval.compare_hands(&x, &y), Ordering::Equal);
    }

    #[test]
    fn test_7_card_evaluation() {
        let eval = PokerEvaluator::new();
        let score = eval
            .evaluate_hand(&cards_from_str("Ah As"), &cards_from_str("Ad Ac Kh Qs Jd"))
            .unwrap();
        assert_eq!(score.category(), HandCategory::FourOfAKind);
        assert_eq!(score.tiebreakers(), &[14, 13]);

        // Six-card straight picks the higher run
        let score = eval
            .evaluate_hand(&cards_from_str("9h 8d"), &cards_from_str("7c 6s 5h 4d Kc"))
            .unwrap();
        assert_eq!(score.category(), HandCategory::Straight);
        assert_eq!(score.tiebreakers(), &[9]);
    }

    #[test]
    fn test_wrong_card_count() {
        let eval = PokerEvaluator::new();
        let board = cards_from_str("Qs Jc 7d 3s");
        assert_eq!(
            eval.evaluate_hand(&cards_from_str("Ah Kd"), &board),
            Err(SolverError::WrongCardCount {
                expected: 5,
                actual: 4
            })
        );
        assert!(matches!(
            eval.evaluate_five_card_hand(&cards_from_str("Ah Kd Qs")),
            Err(SolverError::WrongCardCount { .. })
        ));
    }
}
