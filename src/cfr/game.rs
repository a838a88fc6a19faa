//! Game trait definition for the MCCFR trainer.
//!
//! Any game that implements the `Game` trait can be trained with the
//! `Trainer`. This keeps the regret machinery independent of the poker rules.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

use crate::error::Result;

/// Trait for actions that can be taken in a game.
///
/// Actions must be cloneable, comparable, and hashable for storage in maps.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Short label for logs and strategy dumps.
    fn label(&self) -> String;
}

/// Trait for information states (what a player knows at a decision point).
///
/// Two game states that look identical to a player must produce the same
/// information state, and therefore the same key.
pub trait InfoState: Clone + Eq + Hash + Debug + Send + Sync {
    /// Unique string key for this information state.
    /// This key indexes regret nodes and exported strategies.
    fn key(&self) -> String;
}

/// Trait for game states.
///
/// A game state contains all information about the hand, including private
/// cards nobody else sees. Clones must be deep: sibling branches of a
/// traversal mutate their own copies.
pub trait GameState: Clone + Debug + Send + Sync {}

/// The main Game trait that defines the interface for any game.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// The type representing what a player knows at a decision point.
    type InfoState: InfoState;

    /// Get the total number of players in the game.
    fn num_players(&self) -> usize;

    /// Create a fresh hand.
    ///
    /// All chance outcomes of the hand are fixed here from `rng`, so clones
    /// of the returned state replay the same deal.
    fn initial_state<R: Rng>(&self, rng: &mut R) -> Self::State;

    /// Check if the given state is terminal.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Check if the given state is a chance node.
    fn is_chance(&self, state: &Self::State) -> bool;

    /// The action that resolves a chance node.
    fn chance_action(&self, state: &Self::State) -> Self::Action;

    /// Index of the player to act.
    ///
    /// # Returns
    /// - `Some(player_index)` if a player should act
    /// - `None` if the state is terminal or a chance node
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Legal actions at the current state, in regret-node index order.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action in place.
    fn apply_action(&self, state: &mut Self::State, action: &Self::Action) -> Result<()>;

    /// Net return of every player at a terminal state.
    fn returns(&self, state: &Self::State) -> Result<Vec<f64>>;

    /// What `player` knows at the current state.
    fn info_state(&self, state: &Self::State, player: usize) -> Self::InfoState;

    /// Human-readable description of a state.
    fn state_description(&self, state: &Self::State) -> String {
        format!("{:?}", state)
    }
}
