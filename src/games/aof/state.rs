//! All-or-Fold hand state.
//!
//! One `AofState` is one hand: blinds are posted at construction, the chance
//! node deals the hole cards, seats 2, 3, 0, 1 then fold or shove, and the
//! terminal state deals the board and splits the money into side pots.
//!
//! ```text
//!   new() ──► Chance ──DEAL──► Decision(2) ──► Decision(3) ──► ... ──► Terminal
//!  (blinds)                     FOLD/ALL_IN                          (board, side pots)
//! ```
//!
//! The state is a plain value: fixed-size arrays plus a 52-slot deck, so the
//! trainer can clone it on every branch without pointer chasing.

use std::fmt;

use super::action::{AofAction, CHANCE_ACTIONS, DECISION_ACTIONS};
use super::card::{Card, Deck};
use super::config::{AofConfig, RakeConfig, NUM_PLAYERS};
use super::hand_eval::{HandScore, PokerEvaluator};
use super::info_state::PlayerStatus;
use crate::cfr::game::GameState;
use crate::error::{Result, SolverError};

/// Seat that acts first after the deal.
pub const FIRST_TO_ACT: usize = 2;

/// Allowed drift of the zero-sum check.
pub const ZERO_SUM_TOLERANCE: f64 = 1e-6;

const HOLE_CARDS: usize = 2 * NUM_PLAYERS;
const BOARD_CARDS: usize = 5;

/// A pot contested by a subset of players.
#[derive(Debug, Clone, PartialEq)]
pub struct SidePot {
    /// Chips in this pot.
    pub amount: f64,
    /// Seats that can win it.
    pub eligible: [bool; NUM_PLAYERS],
    /// False when every contributor at this level folded and the chips are
    /// handed back to them instead of going to showdown.
    pub contested: bool,
}

impl SidePot {
    /// Eligible seats in seat order.
    pub fn eligible_players(&self) -> impl Iterator<Item = usize> + '_ {
        (0..NUM_PLAYERS).filter(move |&p| self.eligible[p])
    }
}

/// State of one All-or-Fold hand.
#[derive(Clone)]
pub struct AofState {
    /// Chips committed by all players.
    pot: f64,
    /// Chips behind for each seat.
    stacks: [f64; NUM_PLAYERS],
    /// Stacks before blinds.
    initial_stacks: [f64; NUM_PLAYERS],
    /// Folded seats.
    folded: [bool; NUM_PLAYERS],
    /// Seats that shoved.
    all_in: [bool; NUM_PLAYERS],
    /// Seat to act once dealt.
    next_player: usize,
    /// Hole cards have been dealt.
    dealt: bool,
    /// Hand is over.
    game_over: bool,
    /// Remaining cards.
    deck: Deck,
    /// Hole cards, two per seat in seat order.
    hole_cards: Option<[Card; HOLE_CARDS]>,
    /// Board, dealt at terminal entry.
    community_cards: Option<[Card; BOARD_CARDS]>,
    /// Pots built at terminal entry.
    side_pots: Vec<SidePot>,
    /// Fees applied at settlement.
    rake: RakeConfig,
}

impl AofState {
    /// Post blinds and wait for the deal.
    ///
    /// The deck is fixed from here on; every clone of this state will be
    /// dealt the same cards.
    pub fn new(config: &AofConfig, deck: Deck) -> Self {
        let initial_stacks = config.initial_stacks();
        let mut stacks = initial_stacks;
        stacks[0] -= config.small_blind;
        stacks[1] -= config.big_blind;

        Self {
            pot: config.small_blind + config.big_blind,
            stacks,
            initial_stacks,
            folded: [false; NUM_PLAYERS],
            all_in: [false; NUM_PLAYERS],
            next_player: 0,
            dealt: false,
            game_over: false,
            deck,
            hole_cards: None,
            community_cards: None,
            side_pots: Vec::new(),
            rake: config.rake,
        }
    }

    /// Whether the hand is over.
    pub fn is_terminal(&self) -> bool {
        self.game_over
    }

    /// Whether the next step is the deal.
    pub fn is_chance_node(&self) -> bool {
        !self.dealt && !self.game_over
    }

    /// Seat to act at a decision node.
    pub fn current_player(&self) -> Option<usize> {
        if self.is_chance_node() || self.game_over {
            None
        } else {
            Some(self.next_player)
        }
    }

    /// Legal actions in node index order.
    pub fn legal_actions(&self) -> &'static [AofAction] {
        if self.is_chance_node() {
            &CHANCE_ACTIONS
        } else if self.game_over || self.folded[self.next_player] {
            &[]
        } else {
            &DECISION_ACTIONS
        }
    }

    /// Apply an action in place.
    pub fn apply_action(&mut self, action: AofAction) -> Result<()> {
        if !self.legal_actions().contains(&action) {
            return Err(SolverError::IllegalAction {
                action: action.name().to_string(),
                player: self.current_player(),
            });
        }

        match action {
            AofAction::Deal => {
                self.hole_cards = Some(self.deck.deal_array::<HOLE_CARDS>()?);
                self.dealt = true;
                self.next_player = FIRST_TO_ACT;
                Ok(())
            }
            AofAction::Fold => {
                self.folded[self.next_player] = true;
                self.advance()
            }
            AofAction::AllIn => {
                let p = self.next_player;
                self.pot += self.stacks[p];
                self.stacks[p] = 0.0;
                self.all_in[p] = true;
                self.advance()
            }
        }
    }

    /// Move to the next live seat or finish the hand.
    fn advance(&mut self) -> Result<()> {
        let active = self.active_count();
        let everyone_shoved = (0..NUM_PLAYERS).all(|p| self.folded[p] || self.all_in[p]);

        if active <= 1 || everyone_shoved {
            return self.finish();
        }

        loop {
            self.next_player = (self.next_player + 1) % NUM_PLAYERS;
            if !self.folded[self.next_player] {
                return Ok(());
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.game_over = true;
        if self.community_cards.is_none() {
            self.community_cards = Some(self.deck.deal_array::<BOARD_CARDS>()?);
        }
        self.side_pots = self.build_side_pots();
        Ok(())
    }

    /// Chips each seat put in, blinds included.
    pub fn contributions(&self) -> [f64; NUM_PLAYERS] {
        let mut out = [0.0; NUM_PLAYERS];
        for (p, c) in out.iter_mut().enumerate() {
            *c = self.initial_stacks[p] - self.stacks[p];
        }
        out
    }

    /// Split the pot by contribution level.
    ///
    /// Walking levels low to high, each level's pot takes the increment from
    /// every seat that reached it. A seat leaves eligibility once its cap is
    /// passed; folded seats are never eligible. Levels nobody live reached
    /// are returned to their contributors.
    fn build_side_pots(&self) -> Vec<SidePot> {
        let contributions = self.contributions();

        let mut order: Vec<usize> = (0..NUM_PLAYERS)
            .filter(|&p| contributions[p] > 0.0)
            .collect();
        order.sort_by(|&a, &b| contributions[a].total_cmp(&contributions[b]));

        let mut eligible = [false; NUM_PLAYERS];
        let mut contributing = [false; NUM_PLAYERS];
        for &p in &order {
            eligible[p] = !self.folded[p];
            contributing[p] = true;
        }

        let mut pots = Vec::with_capacity(order.len());
        let mut previous = 0.0;

        for &p in &order {
            let level = contributions[p];
            if level > previous {
                let contributors = contributing.iter().filter(|&&c| c).count();
                let amount = (level - previous) * contributors as f64;
                let contested = eligible.iter().any(|&e| e);
                pots.push(SidePot {
                    amount,
                    eligible: if contested { eligible } else { contributing },
                    contested,
                });
            }
            eligible[p] = false;
            contributing[p] = false;
            previous = level;
        }

        pots
    }

    /// Net chips won or lost by each seat.
    ///
    /// A lone survivor takes the pot without a showdown, less rake and
    /// jackpot fee. Otherwise each side pot goes to the best hand among its
    /// eligible seats, split evenly on ties; rake and fee come out of the
    /// main pot and the jackpot payout is added to it.
    pub fn returns(&self) -> Result<[f64; NUM_PLAYERS]> {
        if !self.game_over {
            return Err(SolverError::NotTerminal);
        }

        let contributions = self.contributions();
        let mut winnings = [0.0; NUM_PLAYERS];
        let expected_sum;

        if self.active_count() == 1 {
            let winner = (0..NUM_PLAYERS)
                .find(|&p| !self.folded[p])
                .ok_or(SolverError::NotTerminal)?;
            winnings[winner] = self.pot - self.rake.total_fees();
            expected_sum = -self.rake.total_fees();
        } else {
            let scores = self.showdown_scores()?;
            let payout = self.rake.jackpot_payout(self.pot);
            let mut adjustment = payout - self.rake.total_fees();
            expected_sum = adjustment;

            for pot in &self.side_pots {
                let mut amount = pot.amount;
                if !pot.contested {
                    let n = pot.eligible_players().count();
                    for p in pot.eligible_players() {
                        winnings[p] += amount / n as f64;
                    }
                    continue;
                }

                amount += adjustment;
                adjustment = 0.0;

                let best = pot.eligible_players().filter_map(|p| scores[p]).max();
                let winners: Vec<usize> = pot
                    .eligible_players()
                    .filter(|&p| scores[p].is_some() && scores[p] == best)
                    .collect();
                let share = amount / winners.len() as f64;
                for &p in &winners {
                    winnings[p] += share;
                }
            }
        }

        let mut net = [0.0; NUM_PLAYERS];
        for p in 0..NUM_PLAYERS {
            net[p] = winnings[p] - contributions[p];
        }

        let total: f64 = net.iter().sum();
        if (total - expected_sum).abs() > ZERO_SUM_TOLERANCE {
            log::warn!(
                "zero-sum violation: returns sum to {:.9}, expected {:.9} ({:?})",
                total,
                expected_sum,
                net
            );
        }
        log::trace!("settled {:?} -> {:?}", self.side_pots, net);

        Ok(net)
    }

    fn showdown_scores(&self) -> Result<[Option<HandScore>; NUM_PLAYERS]> {
        let evaluator = PokerEvaluator::new();
        let board = self.community_cards.ok_or(SolverError::WrongCardCount {
            expected: BOARD_CARDS,
            actual: 0,
        })?;

        let mut scores = [None; NUM_PLAYERS];
        for (p, score) in scores.iter_mut().enumerate() {
            if self.folded[p] {
                continue;
            }
            if let Some(hole) = self.hole_cards(p) {
                *score = Some(evaluator.evaluate_hand(&hole, &board)?);
            }
        }
        Ok(scores)
    }

    /// Seats that have not folded.
    pub fn active_count(&self) -> usize {
        self.folded.iter().filter(|&&f| !f).count()
    }

    /// What other seats see of `player`.
    pub fn status(&self, player: usize) -> PlayerStatus {
        if self.folded[player] {
            PlayerStatus::Folded
        } else if self.all_in[player] {
            PlayerStatus::AllIn
        } else {
            PlayerStatus::Playing
        }
    }

    /// Chips in the middle.
    pub fn pot(&self) -> f64 {
        self.pot
    }

    /// Chips behind, seat order.
    pub fn stacks(&self) -> &[f64; NUM_PLAYERS] {
        &self.stacks
    }

    /// Stacks before blinds.
    pub fn initial_stacks(&self) -> &[f64; NUM_PLAYERS] {
        &self.initial_stacks
    }

    /// Whether `player` folded.
    pub fn is_folded(&self, player: usize) -> bool {
        self.folded[player]
    }

    /// Whether `player` shoved.
    pub fn is_all_in(&self, player: usize) -> bool {
        self.all_in[player]
    }

    /// Hole cards of `player`, once dealt.
    pub fn hole_cards(&self, player: usize) -> Option<[Card; 2]> {
        self.hole_cards
            .map(|cards| [cards[2 * player], cards[2 * player + 1]])
    }

    /// The board, once the hand is over.
    pub fn community_cards(&self) -> Option<&[Card; BOARD_CARDS]> {
        self.community_cards.as_ref()
    }

    /// Pots built at terminal entry.
    pub fn side_pots(&self) -> &[SidePot] {
        &self.side_pots
    }

    /// Cards left in the deck.
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }
}

impl GameState for AofState {}

impl fmt::Debug for AofState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for AofState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pot: {:.2} |", self.pot)?;
        for p in 0..NUM_PLAYERS {
            write!(f, " P{}:{:.2}{}", p, self.stacks[p], self.status(p).code())?;
            if let Some([a, b]) = self.hole_cards(p) {
                write!(f, "({}{})", a, b)?;
            }
        }
        if let Some(board) = &self.community_cards {
            write!(f, " | Board:")?;
            for card in board {
                write!(f, " {}", card)?;
            }
        }
        match self.current_player() {
            Some(p) => write!(f, " | To act: P{}", p),
            None if self.game_over => write!(f, " | Terminal"),
            None => write!(f, " | Chance"),
        }
    }
}
