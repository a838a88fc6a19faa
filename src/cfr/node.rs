//! Per-information-set regret accumulators.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Regret matching over a regret vector.
///
/// The strategy is proportional to positive regrets; if no regret is
/// positive the strategy is uniform.
pub fn regret_matching(regrets: &[f64]) -> Vec<f64> {
    let positive: Vec<f64> = regrets.iter().map(|&r| r.max(0.0)).collect();
    let sum: f64 = positive.iter().sum();

    if sum > 0.0 {
        positive.iter().map(|&x| x / sum).collect()
    } else {
        uniform(regrets.len())
    }
}

/// Uniform distribution over `n` actions.
pub fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Cumulative regret and strategy for one information set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegretNode {
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
    visits: u64,
}

impl RegretNode {
    /// A node with `num_actions` zeroed accumulators.
    pub fn new(num_actions: usize) -> Self {
        Self {
            regret_sum: vec![0.0; num_actions],
            strategy_sum: vec![0.0; num_actions],
            visits: 0,
        }
    }

    /// A node whose average and current strategies both equal
    /// `probabilities`, weighted as if seen `visits` times.
    pub fn from_average(probabilities: &[f64], visits: u64) -> Self {
        let weight = visits.max(1) as f64;
        let sums: Vec<f64> = probabilities.iter().map(|&p| p * weight).collect();
        Self {
            regret_sum: sums.clone(),
            strategy_sum: sums,
            visits,
        }
    }

    /// Number of actions.
    pub fn num_actions(&self) -> usize {
        self.regret_sum.len()
    }

    /// Regret-matched strategy, recording it in the average.
    ///
    /// Adds `reach_weight * strategy` to the strategy sum and counts a
    /// visit. Returns the current strategy, not the average.
    pub fn get_strategy(&mut self, reach_weight: f64) -> Vec<f64> {
        let strategy = regret_matching(&self.regret_sum);
        self.accumulate(&strategy, reach_weight);
        strategy
    }

    /// Regret-matched strategy with no side effects.
    pub fn current_strategy(&self) -> Vec<f64> {
        regret_matching(&self.regret_sum)
    }

    /// Record one visit playing `strategy` with weight `reach_weight`.
    pub(crate) fn accumulate(&mut self, strategy: &[f64], reach_weight: f64) {
        for (sum, &p) in self.strategy_sum.iter_mut().zip(strategy) {
            *sum += reach_weight * p;
        }
        self.visits += 1;
    }

    /// Time-averaged strategy, the learned policy.
    pub fn average_strategy(&self) -> Vec<f64> {
        let total: f64 = self.strategy_sum.iter().sum();
        if total > 0.0 {
            self.strategy_sum.iter().map(|&s| s / total).collect()
        } else {
            uniform(self.num_actions())
        }
    }

    /// Add `delta` to the regret of `action`.
    pub fn update_regret(&mut self, action: usize, delta: f64) -> Result<()> {
        let num_actions = self.num_actions();
        let regret = self
            .regret_sum
            .get_mut(action)
            .ok_or(SolverError::InvalidAction {
                action,
                num_actions,
            })?;
        *regret += delta;
        Ok(())
    }

    /// Fold another node's accumulators into this one.
    pub fn merge(&mut self, other: &RegretNode) -> Result<()> {
        if other.num_actions() != self.num_actions() {
            return Err(SolverError::InvalidAction {
                action: other.num_actions(),
                num_actions: self.num_actions(),
            });
        }
        for (a, b) in self.regret_sum.iter_mut().zip(&other.regret_sum) {
            *a += b;
        }
        for (a, b) in self.strategy_sum.iter_mut().zip(&other.strategy_sum) {
            *a += b;
        }
        self.visits += other.visits;
        Ok(())
    }

    /// Cumulative regrets.
    pub fn regret_sum(&self) -> &[f64] {
        &self.regret_sum
    }

    /// Cumulative strategy weights.
    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Times `get_strategy` was called.
    pub fn visit_count(&self) -> u64 {
        self.visits
    }

    /// Zero every accumulator.
    pub fn reset(&mut self) {
        self.regret_sum.iter_mut().for_each(|r| *r = 0.0);
        self.strategy_sum.iter_mut().for_each(|s| *s = 0.0);
        self.visits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_node_is_uniform() {
        let mut node = RegretNode::new(2);
        assert_eq!(node.get_strategy(1.0), vec![0.5, 0.5]);
        assert_eq!(node.average_strategy(), vec![0.5, 0.5]);
        assert_eq!(node.visit_count(), 1);
    }

    #[test]
    fn test_regret_matching_favors_positive_regret() {
        let mut node = RegretNode::new(2);
        node.update_regret(0, -1.0).unwrap();
        node.update_regret(1, 2.0).unwrap();

        let strategy = node.get_strategy(1.0);
        assert!(strategy[1] > strategy[0]);
        assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(strategy, vec![0.0, 1.0]);
    }

    #[test]
    fn test_proportional_split() {
        let mut node = RegretNode::new(3);
        node.update_regret(0, 1.0).unwrap();
        node.update_regret(2, 3.0).unwrap();
        assert_eq!(node.current_strategy(), vec![0.25, 0.0, 0.75]);
    }

    #[test]
    fn test_all_negative_regret_falls_back_to_uniform() {
        let mut node = RegretNode::new(2);
        node.update_regret(0, -3.0).unwrap();
        node.update_regret(1, -0.5).unwrap();
        assert_eq!(node.current_strategy(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_average_is_reach_weighted() {
        let mut node = RegretNode::new(2);
        node.get_strategy(1.0); // uniform, weight 1
        node.update_regret(1, 5.0).unwrap();
        node.get_strategy(3.0); // all on action 1, weight 3

        let avg = node.average_strategy();
        assert!((avg[0] - 0.5 / 4.0).abs() < 1e-12);
        assert!((avg[1] - 3.5 / 4.0).abs() < 1e-12);
        assert_eq!(node.visit_count(), 2);
    }

    #[test]
    fn test_zero_reach_keeps_uniform_average() {
        let mut node = RegretNode::new(2);
        node.get_strategy(0.0);
        assert_eq!(node.average_strategy(), vec![0.5, 0.5]);
        assert_eq!(node.visit_count(), 1);
    }

    #[test]
    fn test_invalid_action() {
        let mut node = RegretNode::new(2);
        assert_eq!(
            node.update_regret(2, 1.0),
            Err(SolverError::InvalidAction {
                action: 2,
                num_actions: 2
            })
        );
    }

    #[test]
    fn test_merge_and_reset() {
        let mut a = RegretNode::new(2);
        a.update_regret(0, 1.0).unwrap();
        a.get_strategy(1.0);

        let mut b = RegretNode::new(2);
        b.update_regret(1, 3.0).unwrap();
        b.get_strategy(2.0);

        a.merge(&b).unwrap();
        assert_eq!(a.regret_sum(), &[1.0, 3.0]);
        assert_eq!(a.strategy_sum(), &[1.0, 2.0]);
        assert_eq!(a.visit_count(), 2);

        assert!(a.merge(&RegretNode::new(3)).is_err());

        a.reset();
        assert_eq!(a, RegretNode::new(2));
    }

    #[test]
    fn test_from_average() {
        let node = RegretNode::from_average(&[0.2, 0.8], 10);
        assert_eq!(node.visit_count(), 10);
        let avg = node.average_strategy();
        assert!((avg[0] - 0.2).abs() < 1e-12);
        assert!((node.current_strategy()[1] - 0.8).abs() < 1e-12);
    }
}
