//! Storage for regret nodes.
//!
//! `RegretTable` owns one `RegretNode` per information set and belongs to a
//! single trainer. Traversals reach nodes through the `NodeAccess` trait so
//! the same recursion can write either straight into the table (sequential
//! training) or into a thread-local `BatchAccumulator` that is merged back
//! after a parallel batch.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::node::{regret_matching, uniform, RegretNode};
use crate::error::{Result, SolverError};

/// Node operations needed by an MCCFR traversal.
pub trait NodeAccess {
    /// Current strategy at `key`, creating the node if needed, and record
    /// it in the average with weight `reach`.
    ///
    /// Fails if an existing node was sized for a different action count.
    fn strategy(&mut self, key: &str, num_actions: usize, reach: f64) -> Result<Vec<f64>>;

    /// Add `delta` to the regret of `action` at `key`.
    fn update_regret(&mut self, key: &str, action: usize, delta: f64) -> Result<()>;
}

/// All regret nodes of one trainer, keyed by information set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegretTable {
    nodes: FxHashMap<String, RegretNode>,
}

impl RegretTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for `key`, if discovered.
    pub fn get(&self, key: &str) -> Option<&RegretNode> {
        self.nodes.get(key)
    }

    /// Node for `key`, created with `num_actions` actions if missing.
    pub fn get_or_create(&mut self, key: &str, num_actions: usize) -> &mut RegretNode {
        self.nodes
            .entry(key.to_string())
            .or_insert_with(|| RegretNode::new(num_actions))
    }

    /// Replace or add a node.
    pub fn insert(&mut self, key: String, node: RegretNode) {
        self.nodes.insert(key, node);
    }

    /// Average strategy at `key`, if discovered.
    pub fn average_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.nodes.get(key).map(RegretNode::average_strategy)
    }

    /// Current strategy at `key`, if discovered.
    pub fn current_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.nodes.get(key).map(RegretNode::current_strategy)
    }

    /// Number of information sets.
    pub fn num_info_sets(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node exists yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if an info set exists.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// All nodes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RegretNode)> {
        self.nodes.iter()
    }

    /// Fold a batch of deltas into the table.
    pub fn merge(&mut self, delta: FxHashMap<String, RegretNode>) -> Result<()> {
        for (key, node) in delta {
            match self.nodes.get_mut(&key) {
                Some(existing) => existing.merge(&node)?,
                None => {
                    self.nodes.insert(key, node);
                }
            }
        }
        Ok(())
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

fn check_size(node: &RegretNode, num_actions: usize) -> Result<()> {
    if node.num_actions() != num_actions {
        return Err(SolverError::InvalidAction {
            action: node.num_actions(),
            num_actions,
        });
    }
    Ok(())
}

impl NodeAccess for RegretTable {
    fn strategy(&mut self, key: &str, num_actions: usize, reach: f64) -> Result<Vec<f64>> {
        match self.nodes.get_mut(key) {
            Some(node) => {
                check_size(node, num_actions)?;
                Ok(node.get_strategy(reach))
            }
            None => {
                let mut node = RegretNode::new(num_actions);
                let strategy = node.get_strategy(reach);
                self.nodes.insert(key.to_string(), node);
                Ok(strategy)
            }
        }
    }

    fn update_regret(&mut self, key: &str, action: usize, delta: f64) -> Result<()> {
        let num_actions = action + 1;
        self.get_or_create(key, num_actions).update_regret(action, delta)
    }
}

/// Thread-local updates against a read-only table.
///
/// Strategies are matched on the table's regrets plus this batch's own
/// regret deltas; everything written lands in `local` until merged.
#[derive(Debug)]
pub struct BatchAccumulator<'a> {
    base: &'a RegretTable,
    local: FxHashMap<String, RegretNode>,
}

impl<'a> BatchAccumulator<'a> {
    /// Start accumulating against `base`.
    pub fn new(base: &'a RegretTable) -> Self {
        Self {
            base,
            local: FxHashMap::default(),
        }
    }

    /// Accumulated deltas.
    pub fn into_delta(self) -> FxHashMap<String, RegretNode> {
        self.local
    }

    fn local_node(&mut self, key: &str, num_actions: usize) -> &mut RegretNode {
        self.local
            .entry(key.to_string())
            .or_insert_with(|| RegretNode::new(num_actions))
    }
}

impl<'a> NodeAccess for BatchAccumulator<'a> {
    fn strategy(&mut self, key: &str, num_actions: usize, reach: f64) -> Result<Vec<f64>> {
        let table: &'a RegretTable = self.base;
        let base = table.get(key);
        if let Some(base) = base {
            check_size(base, num_actions)?;
        }
        let local = self.local_node(key, num_actions);
        check_size(local, num_actions)?;

        let strategy = match base {
            Some(base) => {
                let combined: Vec<f64> = base
                    .regret_sum()
                    .iter()
                    .zip(local.regret_sum())
                    .map(|(a, b)| a + b)
                    .collect();
                regret_matching(&combined)
            }
            None => local.current_strategy(),
        };
        local.accumulate(&strategy, reach);
        Ok(strategy)
    }

    fn update_regret(&mut self, key: &str, action: usize, delta: f64) -> Result<()> {
        let num_actions = self
            .base
            .get(key)
            .map(RegretNode::num_actions)
            .unwrap_or(action + 1);
        self.local_node(key, num_actions).update_regret(action, delta)
    }
}

/// Snapshot of average strategies for CI calculation.
#[derive(Debug, Clone, Default)]
pub struct StrategySnapshot {
    /// Average strategies: info_key -> [probability per action]
    pub strategies: FxHashMap<String, Vec<f64>>,
    /// Strategy sum totals, zero for sets never reached with weight.
    pub totals: FxHashMap<String, f64>,
}

impl RegretTable {
    /// Snapshot all current average strategies.
    pub fn snapshot_strategies(&self) -> StrategySnapshot {
        let mut strategies = FxHashMap::default();
        let mut totals = FxHashMap::default();

        for (key, node) in &self.nodes {
            strategies.insert(key.clone(), node.average_strategy());
            totals.insert(key.clone(), node.strategy_sum().iter().sum());
        }

        StrategySnapshot { strategies, totals }
    }

    /// Convergence Indicator (CI) against a snapshot.
    ///
    /// CI = 100 * mean over information sets of the L1 change in average
    /// strategy. Sets never reached with weight in either snapshot are
    /// skipped; sets discovered after the snapshot count their distance
    /// from uniform. Lower is better, ~1 is converged.
    pub fn calculate_ci(&self, snapshot: &StrategySnapshot) -> f64 {
        let mut total_change = 0.0;
        let mut counted = 0usize;

        for (key, node) in &self.nodes {
            let current_total: f64 = node.strategy_sum().iter().sum();
            let old_total = snapshot.totals.get(key).copied().unwrap_or(0.0);
            if current_total == 0.0 && old_total == 0.0 {
                continue;
            }

            let new_strategy = node.average_strategy();
            let old_strategy = snapshot
                .strategies
                .get(key)
                .cloned()
                .unwrap_or_else(|| uniform(node.num_actions()));

            total_change += new_strategy
                .iter()
                .zip(&old_strategy)
                .map(|(n, o)| (n - o).abs())
                .sum::<f64>();
            counted += 1;
        }

        if counted == 0 {
            return f64::INFINITY;
        }

        100.0 * total_change / counted as f64
    }
}
