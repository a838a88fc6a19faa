//! Error type shared by the game model and the solver.
//!
//! Every variant is a local contract violation: the operation that produced
//! it has no side effects worth keeping and the caller decides what to do.

use std::fmt;

/// Errors produced by the All-or-Fold game model and the MCCFR trainer.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Game or trainer configuration is invalid.
    Configuration(String),
    /// An action was applied that is not in the current legal set.
    IllegalAction {
        /// Action label.
        action: String,
        /// Player to act, if any.
        player: Option<usize>,
    },
    /// Returns were requested before the hand finished.
    NotTerminal,
    /// A card was requested from an empty deck.
    EmptyDeck,
    /// More cards were requested than the deck holds.
    InsufficientCards {
        /// Cards requested.
        requested: usize,
        /// Cards left in the deck.
        remaining: usize,
    },
    /// The evaluator received the wrong number of cards.
    WrongCardCount {
        /// Expected card count.
        expected: usize,
        /// Actual card count.
        actual: usize,
    },
    /// A regret update referenced an action outside the node.
    InvalidAction {
        /// Offending action index.
        action: usize,
        /// Number of actions at the node.
        num_actions: usize,
    },
    /// A card could not be built or parsed.
    InvalidCard(String),
    /// A decision node offered no legal actions.
    NoLegalActions,
    /// Reading or writing a strategy file failed.
    Io(String),
    /// A strategy file or checkpoint is malformed.
    Format(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            SolverError::IllegalAction { action, player } => match player {
                Some(p) => write!(f, "Illegal action {} for player {}", action, p),
                None => write!(f, "Illegal action {} in current state", action),
            },
            SolverError::NotTerminal => write!(f, "Returns requested for a non-terminal state"),
            SolverError::EmptyDeck => write!(f, "Cannot deal from an empty deck"),
            SolverError::InsufficientCards {
                requested,
                remaining,
            } => write!(
                f,
                "Requested {} cards but only {} remain in the deck",
                requested, remaining
            ),
            SolverError::WrongCardCount { expected, actual } => {
                write!(f, "Expected {} cards, got {}", expected, actual)
            }
            SolverError::InvalidAction {
                action,
                num_actions,
            } => write!(
                f,
                "Action index {} out of range for node with {} actions",
                action, num_actions
            ),
            SolverError::InvalidCard(msg) => write!(f, "Invalid card: {}", msg),
            SolverError::NoLegalActions => write!(f, "Decision node has no legal actions"),
            SolverError::Io(msg) => write!(f, "I/O error: {}", msg),
            SolverError::Format(msg) => write!(f, "Malformed data: {}", msg),
        }
    }
}

impl std::error::Error for SolverError {}

impl From<std::io::Error> for SolverError {
    fn from(err: std::io::Error) -> Self {
        SolverError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(err: serde_json::Error) -> Self {
        SolverError::Format(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
