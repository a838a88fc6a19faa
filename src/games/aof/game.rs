//! The All-or-Fold game as seen by the trainer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::action::AofAction;
use super::card::Deck;
use super::config::{AofConfig, NUM_PLAYERS};
use super::info_state::AofInfoSet;
use super::state::AofState;
use crate::cfr::game::Game;
use crate::error::Result;

/// A validated All-or-Fold table.
#[derive(Debug, Clone, Default)]
pub struct AofGame {
    config: AofConfig,
}

impl AofGame {
    /// Create a game, rejecting invalid configurations.
    pub fn new(config: AofConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Game with the given blinds, 8BB stacks and no rake.
    pub fn with_blinds(small_blind: f64, big_blind: f64) -> Result<Self> {
        Self::new(AofConfig::new(small_blind, big_blind))
    }

    /// The table configuration.
    pub fn config(&self) -> &AofConfig {
        &self.config
    }

    /// A fresh hand with blinds posted and a deck shuffled from `rng`.
    pub fn create_initial_state<R: Rng>(&self, rng: &mut R) -> AofState {
        AofState::new(&self.config, Deck::shuffled(rng))
    }

    /// A fresh hand with a deck shuffled from `seed`.
    pub fn create_seeded_state(&self, seed: u64) -> AofState {
        self.create_initial_state(&mut StdRng::seed_from_u64(seed))
    }
}

impl Game for AofGame {
    type State = AofState;
    type Action = AofAction;
    type InfoState = AofInfoSet;

    fn num_players(&self) -> usize {
        NUM_PLAYERS
    }

    fn initial_state<R: Rng>(&self, rng: &mut R) -> AofState {
        self.create_initial_state(rng)
    }

    fn is_terminal(&self, state: &AofState) -> bool {
        state.is_terminal()
    }

    fn is_chance(&self, state: &AofState) -> bool {
        state.is_chance_node()
    }

    fn chance_action(&self, _state: &AofState) -> AofAction {
        AofAction::Deal
    }

    fn current_player(&self, state: &AofState) -> Option<usize> {
        state.current_player()
    }

    fn legal_actions(&self, state: &AofState) -> Vec<AofAction> {
        state.legal_actions().to_vec()
    }

    fn apply_action(&self, state: &mut AofState, action: &AofAction) -> Result<()> {
        state.apply_action(*action)
    }

    fn returns(&self, state: &AofState) -> Result<Vec<f64>> {
        Ok(state.returns()?.to_vec())
    }

    fn info_state(&self, state: &AofState, player: usize) -> AofInfoSet {
        AofInfoSet::from_state(state, player)
    }

    fn state_description(&self, state: &AofState) -> String {
        state.to_string()
    }
}
