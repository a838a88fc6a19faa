//! # AoF Solver
//!
//! Approximate equilibrium strategies for 4-player All-or-Fold poker,
//! computed with external-sampling Monte Carlo Counterfactual Regret
//! Minimization (MCCFR).
//!
//! ## Features
//!
//! - **Generic MCCFR Engine**: Works with any game implementing the `Game` trait
//! - **Exact Settlement**: Side pots, split pots, rake and jackpot handling
//! - **Parallel Batches**: rayon workers with thread-local regret deltas
//! - **Checkpointing**: Save and resume trainer state
//! - **Strategy Export**: Text, binary and JSON strategy tables
//!
//! ## Quick Start
//!
//! ```
//! use aof_solver::cfr::{Trainer, TrainerConfig};
//! use aof_solver::games::aof::AofGame;
//!
//! let mut trainer = Trainer::new(AofGame::default(), TrainerConfig::new().with_seed(42)).unwrap();
//! trainer.train(100).unwrap();
//!
//! let utilities = trainer.average_utilities();
//! assert!(utilities.iter().sum::<f64>().abs() < 1e-6);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core MCCFR algorithm and trainer
//! - [`games`]: Game implementations (All-or-Fold)
//! - [`error`]: The crate error type
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MCCFR Trainer (Generic)                    │
//! │  - Regret matching         - External-sampling traversal        │
//! │  - Exact-utility replay    - Parallel batches, checkpoints      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!                  ┌──────────────────────────┐
//!                  │       All-or-Fold        │
//!                  │  deck, evaluator, state, │
//!                  │  side pots, info sets    │
//!                  └──────────────────────────┘
//! ```

#![warn(missing_docs)]

/// Monte Carlo CFR engine.
///
/// This is the core module containing the generic trainer.
pub mod cfr;

/// Crate error type.
pub mod error;

/// Game implementations module.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{Action, Game, GameState, InfoState, Trainer, TrainerConfig, TrainingStats};
pub use error::{Result, SolverError};
