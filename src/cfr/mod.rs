//! Monte Carlo CFR engine.
//!
//! This module provides a game-agnostic implementation of external-sampling
//! Monte Carlo Counterfactual Regret Minimization (MCCFR) for computing
//! approximate Nash equilibrium strategies in multi-player games.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! External sampling walks every action of the traversing player and a
//! single sampled action of everyone else, so one iteration touches a thin
//! slice of the tree.
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `Trainer` with your game and configuration
//! 3. Call `train()` to run iterations
//! 4. Read strategies with `average_strategy()` or export a `StrategyTable`
//!
//! # Example
//!
//! ```
//! use aof_solver::cfr::{Trainer, TrainerConfig};
//! use aof_solver::games::aof::AofGame;
//!
//! let mut trainer = Trainer::new(AofGame::default(), TrainerConfig::new().with_seed(1)).unwrap();
//! let stats = trainer.train(200).unwrap();
//! println!("Trained {} info sets in {:.2}s", stats.info_sets, stats.elapsed_seconds);
//!
//! let table = trainer.strategy_table();
//! for (key, entry) in table.sorted_by_visits().into_iter().take(3) {
//!     println!("{} {:?}", key, entry.probabilities);
//! }
//! ```
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Lanctot, M., et al. "Monte Carlo Sampling for Regret Minimization in Extensive Games" (2009)

pub mod config;
pub mod game;
pub mod node;
pub mod solver;
pub mod storage;
pub mod strategy;

// Re-export main types for convenient access
pub use config::{TrainerConfig, TrainingStats, UtilityPoint};
pub use game::{Action, Game, GameState, InfoState};
pub use node::{regret_matching, RegretNode};
pub use solver::{ConvergenceResult, ConvergenceStats, Trainer, TrainerState};
pub use storage::{BatchAccumulator, NodeAccess, RegretTable, StrategySnapshot};
pub use strategy::{StrategyEntry, StrategyTable, TableStats};
