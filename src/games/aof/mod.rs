//! All-or-Fold poker.
//!
//! Four seats, blinds of 0.4/1.0 and 8BB stacks by default. After the deal
//! every seat, starting left of the big blind, either folds or shoves; there
//! is no other bet size and no later street.
//!
//! ## Seats
//!
//! ```text
//!   seat 0  SB   posts the small blind, acts third
//!   seat 1  BB   posts the big blind, acts last
//!   seat 2  CO   acts first
//!   seat 3  BTN  acts second
//! ```
//!
//! ## Hand flow
//!
//! ```text
//!            Chance (DEAL)
//!                 │
//!            P2: FOLD / ALL_IN
//!                 │
//!            P3: FOLD / ALL_IN
//!                 │
//!            P0: FOLD / ALL_IN      (skipped once the hand is decided)
//!                 │
//!            P1: FOLD / ALL_IN
//!                 │
//!              Terminal  ──►  board + side pots + settlement
//! ```
//!
//! The hand ends as soon as one seat is left or every remaining seat has
//! shoved.

pub mod action;
pub mod card;
pub mod config;
pub mod game;
pub mod hand_eval;
pub mod info_state;
pub mod state;

pub use action::AofAction;
pub use card::{Card, Deck, Suit};
pub use config::{supported_stakes, AofConfig, RakeConfig, NUM_PLAYERS, POSITION_NAMES};
pub use game::AofGame;
pub use hand_eval::{HandCategory, HandScore, PokerEvaluator};
pub use info_state::{AofInfoSet, HandClass, PlayerStatus};
pub use state::{AofState, SidePot};
