//! Game implementations for the MCCFR trainer.
//!
//! ## Available Games
//!
//! - [`aof`]: 4-player All-or-Fold poker
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info state types
//! 3. Implement the `Game` trait
//! 4. Add tests that verify expected behavior

pub mod aof;
