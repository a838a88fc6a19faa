//! Table configuration: blinds, starting stacks and rake.
//!
//! Configs deserialize from JSON so tables can be changed without
//! recompiling. Stacks are given in big blinds and converted to chips when a
//! hand starts.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SolverError};

/// Number of seats at an All-or-Fold table.
pub const NUM_PLAYERS: usize = 4;

/// Default starting stack in big blinds.
pub const DEFAULT_STACK_BB: f64 = 8.0;

/// Seat labels in seat order.
pub const POSITION_NAMES: [&str; NUM_PLAYERS] = ["SB", "BB", "CO", "BTN"];

/// Rake and jackpot parameters, all in chips except the payout percentage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RakeConfig {
    /// Rake taken from every hand.
    #[serde(default)]
    pub rake_per_hand: f64,
    /// Jackpot fee taken from every hand.
    #[serde(default)]
    pub jackpot_fee_per_hand: f64,
    /// Share of the total pot paid back from the jackpot at showdown.
    #[serde(default)]
    pub jackpot_payout_percentage: f64,
}

/// (small blind, big blind, rake, jackpot fee, payout percentage)
const STAKES_TABLE: [(f64, f64, f64, f64, f64); 16] = [
    (0.05, 0.10, 0.02, 0.02, 0.00005),
    (0.10, 0.20, 0.03, 0.03, 0.0001),
    (0.10, 0.25, 0.04, 0.04, 0.0001),
    (0.20, 0.40, 0.05, 0.05, 0.0002),
    (0.25, 0.50, 0.06, 0.06, 0.0002),
    (0.50, 1.00, 0.05, 0.05, 0.0005),
    (1.0, 2.0, 0.05, 0.05, 0.001),
    (2.0, 4.0, 0.05, 0.05, 0.0015),
    (5.0, 10.0, 0.05, 0.05, 0.0025),
    (10.0, 20.0, 0.05, 0.05, 0.005),
    (25.0, 50.0, 0.05, 0.05, 0.0075),
    (50.0, 100.0, 0.05, 0.05, 0.01),
    (100.0, 200.0, 0.025, 0.025, 0.01),
    (200.0, 400.0, 0.025, 0.025, 0.0125),
    (500.0, 1000.0, 0.025, 0.025, 0.015),
    (1000.0, 2000.0, 0.025, 0.025, 0.02),
];

const STAKES_EPSILON: f64 = 1e-9;

impl RakeConfig {
    /// No rake, no jackpot.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create rake parameters.
    pub fn new(rake_per_hand: f64, jackpot_fee_per_hand: f64, jackpot_payout_percentage: f64) -> Self {
        Self {
            rake_per_hand,
            jackpot_fee_per_hand,
            jackpot_payout_percentage,
        }
    }

    /// Standard rake parameters for a stake level.
    pub fn for_stakes(small_blind: f64, big_blind: f64) -> Result<Self> {
        STAKES_TABLE
            .iter()
            .find(|(sb, bb, ..)| {
                (sb - small_blind).abs() < STAKES_EPSILON && (bb - big_blind).abs() < STAKES_EPSILON
            })
            .map(|&(_, _, rake, fee, payout)| Self::new(rake, fee, payout))
            .ok_or_else(|| {
                SolverError::Configuration(format!(
                    "no rake table entry for stakes {}/{}",
                    small_blind, big_blind
                ))
            })
    }

    /// Rake plus jackpot fee.
    pub fn total_fees(&self) -> f64 {
        self.rake_per_hand + self.jackpot_fee_per_hand
    }

    /// Jackpot payout for a showdown pot.
    pub fn jackpot_payout(&self, total_pot: f64) -> f64 {
        total_pot * self.jackpot_payout_percentage
    }

    /// Whether any fee or payout is configured.
    pub fn is_raked(&self) -> bool {
        self.rake_per_hand > 0.0
            || self.jackpot_fee_per_hand > 0.0
            || self.jackpot_payout_percentage > 0.0
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("rake_per_hand", self.rake_per_hand),
            ("jackpot_fee_per_hand", self.jackpot_fee_per_hand),
            ("jackpot_payout_percentage", self.jackpot_payout_percentage),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(SolverError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Supported stake levels as (small blind, big blind), sorted by big blind.
pub fn supported_stakes() -> Vec<(f64, f64)> {
    let mut stakes: Vec<(f64, f64)> = STAKES_TABLE.iter().map(|&(sb, bb, ..)| (sb, bb)).collect();
    stakes.sort_by(|a, b| a.1.total_cmp(&b.1));
    stakes
}

/// All-or-Fold table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AofConfig {
    /// Small blind in chips.
    pub small_blind: f64,
    /// Big blind in chips.
    pub big_blind: f64,
    /// Starting stacks in big blinds, seat order. `None` means 8BB each.
    #[serde(default)]
    pub stacks_bb: Option<Vec<f64>>,
    /// Rake parameters.
    #[serde(default)]
    pub rake: RakeConfig,
}

impl Default for AofConfig {
    fn default() -> Self {
        Self {
            small_blind: 0.4,
            big_blind: 1.0,
            stacks_bb: None,
            rake: RakeConfig::none(),
        }
    }
}

impl AofConfig {
    /// Config with the given blinds, default stacks and no rake.
    pub fn new(small_blind: f64, big_blind: f64) -> Self {
        Self {
            small_blind,
            big_blind,
            ..Default::default()
        }
    }

    /// Builder method: set starting stacks in big blinds.
    pub fn with_stacks_bb(mut self, stacks: Vec<f64>) -> Self {
        self.stacks_bb = Some(stacks);
        self
    }

    /// Builder method: set rake parameters.
    pub fn with_rake(mut self, rake: RakeConfig) -> Self {
        self.rake = rake;
        self
    }

    /// Builder method: use the standard rake for these blinds.
    pub fn with_standard_rake(self) -> Result<Self> {
        let rake = RakeConfig::for_stakes(self.small_blind, self.big_blind)?;
        Ok(self.with_rake(rake))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Starting stacks in chips.
    pub fn initial_stacks(&self) -> [f64; NUM_PLAYERS] {
        let mut stacks = [DEFAULT_STACK_BB * self.big_blind; NUM_PLAYERS];
        if let Some(bb) = &self.stacks_bb {
            for (stack, &b) in stacks.iter_mut().zip(bb) {
                *stack = b * self.big_blind;
            }
        }
        stacks
    }

    /// A chip amount in big blinds.
    pub fn chips_to_bb(&self, chips: f64) -> f64 {
        chips / self.big_blind
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !is_positive(self.small_blind) || !is_positive(self.big_blind) {
            return Err(SolverError::Configuration(format!(
                "blinds must be positive, got {}/{}",
                self.small_blind, self.big_blind
            )));
        }
        if self.small_blind >= self.big_blind {
            return Err(SolverError::Configuration(format!(
                "small blind {} must be below big blind {}",
                self.small_blind, self.big_blind
            )));
        }

        if let Some(stacks) = &self.stacks_bb {
            if stacks.len() != NUM_PLAYERS {
                return Err(SolverError::Configuration(format!(
                    "expected {} stacks, got {}",
                    NUM_PLAYERS,
                    stacks.len()
                )));
            }
            let invalid = stacks.iter().enumerate().find(|(_, &s)| !is_positive(s));
            if let Some((seat, stack)) = invalid {
                return Err(SolverError::Configuration(format!(
                    "stack for seat {} must be positive, got {}",
                    seat, stack
                )));
            }
        }

        let stacks = self.initial_stacks();
        if stacks[0] < self.small_blind {
            return Err(SolverError::Configuration(
                "small blind stack cannot cover the small blind".to_string(),
            ));
        }
        if stacks[1] < self.big_blind {
            return Err(SolverError::Configuration(
                "big blind stack cannot cover the big blind".to_string(),
            ));
        }

        self.rake.validate()?;
        if self.rake.total_fees() >= self.small_blind + self.big_blind {
            return Err(SolverError::Configuration(format!(
                "rake plus jackpot fee {} must be below the blinds {}",
                self.rake.total_fees(),
                self.small_blind + self.big_blind
            )));
        }

        Ok(())
    }
}

/// False for zero, negatives and NaN.
fn is_positive(value: f64) -> bool {
    value > 0.0
}
