//! External-sampling Monte Carlo CFR trainer.
//!
//! Each iteration creates one base hand. Every player in turn traverses a
//! clone of it: the traverser branches on all of its own actions and
//! updates regrets, while opponents sample one action from their current
//! strategy. A final replay of the same hand with everyone's average
//! strategy produces the exact utilities used for progress reporting.
//!
//! The trainer is generic over any game that implements the `Game` trait.

use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::config::{TrainerConfig, TrainingStats};
use crate::cfr::game::{Game, InfoState};
use crate::cfr::node::RegretNode;
use crate::cfr::storage::{BatchAccumulator, NodeAccess, RegretTable, StrategySnapshot};
use crate::cfr::strategy::StrategyTable;
use crate::error::{Result, SolverError};

/// Iterations required before `train_until_converged` may report success.
const MIN_CONVERGENCE_ITERATIONS: u64 = 1_000;

/// Allowed distance from one for a loaded strategy's probability sum.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// The MCCFR trainer.
///
/// Owns the regret table; nothing is shared between trainers.
///
/// # Example
/// ```
/// use aof_solver::cfr::{Trainer, TrainerConfig};
/// use aof_solver::games::aof::AofGame;
///
/// let mut trainer = Trainer::new(AofGame::default(), TrainerConfig::new().with_seed(42)).unwrap();
/// let stats = trainer.train(100).unwrap();
/// assert_eq!(stats.iterations, 100);
/// assert!(trainer.num_info_sets() > 0);
/// ```
pub struct Trainer<G: Game> {
    game: G,
    config: TrainerConfig,
    table: RegretTable,
    iteration: u64,
    utility_sum: Vec<f64>,
    stats: TrainingStats,
    rng: StdRng,
}

impl<G: Game> Trainer<G> {
    /// Create a trainer for `game`.
    pub fn new(game: G, config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        let rng = seeded_rng(config.seed);
        let num_players = game.num_players();

        Ok(Self {
            game,
            config,
            table: RegretTable::new(),
            iteration: 0,
            utility_sum: vec![0.0; num_players],
            stats: TrainingStats::new(),
            rng,
        })
    }

    /// Run a single iteration and return its exact utilities.
    pub fn run_iteration(&mut self) -> Result<Vec<f64>> {
        let base = self.game.initial_state(&mut self.rng);
        let num_players = self.game.num_players();

        for player in 0..num_players {
            let reach = vec![1.0; num_players];
            traverse(
                &self.game,
                &mut self.table,
                &mut self.rng,
                base.clone(),
                player,
                &reach,
            )?;
        }

        let exact = exact_utilities(&self.game, &self.table, &mut self.rng, base)?;
        self.record_utilities(&exact);
        Ok(exact)
    }

    /// Train for `iterations` iterations.
    pub fn train(&mut self, iterations: u64) -> Result<&TrainingStats> {
        self.train_with_callback(iterations, u64::MAX, |_| {})
    }

    /// Train with a callback every `callback_interval` iterations.
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&TrainingStats>
    where
        F: FnMut(&TrainingStats),
    {
        let start_time = Instant::now();
        let base_elapsed = self.stats.elapsed_seconds;
        let interval = callback_interval.max(1);

        log::info!(
            "training {} iterations from iteration {}",
            iterations,
            self.iteration
        );

        for i in 0..iterations {
            self.run_iteration()?;

            if (i + 1) % interval == 0 {
                self.refresh_stats(base_elapsed + start_time.elapsed().as_secs_f64());
                callback(&self.stats);
            }
        }

        self.refresh_stats(base_elapsed + start_time.elapsed().as_secs_f64());
        self.log_summary();
        Ok(&self.stats)
    }

    /// Train with rayon, `batch_size` base hands at a time.
    ///
    /// Traversals in a batch read the table as it stood when the batch
    /// started and write into thread-local deltas that are merged once the
    /// batch finishes. Exact utilities are replayed afterwards in order.
    pub fn train_parallel(&mut self, iterations: u64) -> Result<&TrainingStats> {
        self.train_parallel_with_callback(iterations, |_| {})
    }

    /// Parallel training with a callback after every batch.
    pub fn train_parallel_with_callback<F>(
        &mut self,
        iterations: u64,
        mut callback: F,
    ) -> Result<&TrainingStats>
    where
        F: FnMut(&TrainingStats),
    {
        let start_time = Instant::now();
        let base_elapsed = self.stats.elapsed_seconds;
        let pool = self.build_pool()?;

        log::info!(
            "training {} iterations in batches of {} on {} threads",
            iterations,
            self.config.batch_size,
            pool.as_ref()
                .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads)
        );

        let mut done = 0u64;
        while done < iterations {
            let batch = (iterations - done).min(self.config.batch_size as u64) as usize;

            let mut hands = Vec::with_capacity(batch);
            for _ in 0..batch {
                let state = self.game.initial_state(&mut self.rng);
                let seed: u64 = self.rng.gen();
                hands.push((state, seed));
            }

            let deltas = match &pool {
                Some(pool) => pool.install(|| traverse_batch(&self.game, &self.table, &hands)),
                None => traverse_batch(&self.game, &self.table, &hands),
            }?;
            for delta in deltas {
                self.table.merge(delta)?;
            }

            for (state, _) in hands {
                let exact = exact_utilities(&self.game, &self.table, &mut self.rng, state)?;
                self.record_utilities(&exact);
            }

            done += batch as u64;
            self.refresh_stats(base_elapsed + start_time.elapsed().as_secs_f64());
            callback(&self.stats);
        }

        self.refresh_stats(base_elapsed + start_time.elapsed().as_secs_f64());
        self.log_summary();
        Ok(&self.stats)
    }

    /// Train until the Convergence Indicator (CI) reaches `ci_target`.
    ///
    /// A strategy snapshot is taken every `ci_check_interval` iterations and
    /// CI is measured against the previous one. Lower CI means the average
    /// strategy has stopped moving:
    /// - CI < 10: bare minimum for a usable solution
    /// - CI ~ 1: close to fully converged
    ///
    /// `max_iterations` of 0 means no limit.
    pub fn train_until_converged<F>(
        &mut self,
        ci_target: f64,
        ci_check_interval: u64,
        max_iterations: u64,
        mut callback: F,
    ) -> Result<ConvergenceResult>
    where
        F: FnMut(&ConvergenceStats),
    {
        let start_time = Instant::now();
        let base_elapsed = self.stats.elapsed_seconds;
        let interval = ci_check_interval.max(1);
        let mut snapshot: Option<StrategySnapshot> = None;
        let mut current_ci = f64::INFINITY;

        loop {
            for _ in 0..interval {
                self.run_iteration()?;
            }
            let elapsed = base_elapsed + start_time.elapsed().as_secs_f64();
            self.refresh_stats(elapsed);

            if let Some(previous) = &snapshot {
                current_ci = self.table.calculate_ci(previous);
                self.stats.convergence_indicator = Some(current_ci);
            }

            callback(&ConvergenceStats {
                iteration: self.iteration,
                ci: current_ci,
                info_sets: self.table.num_info_sets(),
                elapsed_seconds: elapsed,
                iterations_per_second: self.stats.iterations_per_second,
            });

            if current_ci <= ci_target && self.iteration >= MIN_CONVERGENCE_ITERATIONS {
                log::info!(
                    "converged at iteration {} with CI {:.3}",
                    self.iteration,
                    current_ci
                );
                return Ok(ConvergenceResult {
                    converged: true,
                    final_ci: current_ci,
                    iterations: self.iteration,
                    elapsed_seconds: elapsed,
                });
            }

            if max_iterations > 0 && self.iteration >= max_iterations {
                log::info!(
                    "stopped at iteration {} with CI {:.3} (target {:.3})",
                    self.iteration,
                    current_ci,
                    ci_target
                );
                return Ok(ConvergenceResult {
                    converged: false,
                    final_ci: current_ci,
                    iterations: self.iteration,
                    elapsed_seconds: elapsed,
                });
            }

            snapshot = Some(self.table.snapshot_strategies());
        }
    }

    /// Take a snapshot of current average strategies for CI calculation.
    pub fn snapshot_strategies(&self) -> StrategySnapshot {
        self.table.snapshot_strategies()
    }

    /// CI of the current table against `snapshot`.
    pub fn calculate_ci(&self, snapshot: &StrategySnapshot) -> f64 {
        self.table.calculate_ci(snapshot)
    }

    fn build_pool(&self) -> Result<Option<ThreadPool>> {
        match self.config.num_threads {
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map(Some)
                .map_err(|e| SolverError::Configuration(e.to_string())),
            None => Ok(None),
        }
    }

    fn record_utilities(&mut self, exact: &[f64]) {
        self.iteration += 1;
        for (sum, u) in self.utility_sum.iter_mut().zip(exact) {
            *sum += u;
        }

        if self.iteration % self.config.log_interval == 0 {
            self.stats.iterations = self.iteration;
            self.stats.info_sets = self.table.num_info_sets();
            self.stats.update_utilities(&self.utility_sum);
            self.stats.record_point();
            log::debug!(
                "iteration {}: {} info sets, mean abs utility error {:.6}",
                self.iteration,
                self.stats.info_sets,
                self.stats.mean_absolute_error
            );
        }
    }

    fn refresh_stats(&mut self, elapsed_seconds: f64) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.table.num_info_sets();
        self.stats.elapsed_seconds = elapsed_seconds;
        self.stats.update_rate();
        self.stats.update_utilities(&self.utility_sum);
    }

    fn log_summary(&self) {
        log::info!(
            "trained {} iterations, {} info sets in {:.2}s ({:.0} it/s), average utilities {:?}",
            self.stats.iterations,
            self.stats.info_sets,
            self.stats.elapsed_seconds,
            self.stats.iterations_per_second,
            self.stats.average_utilities
        );
    }

    /// Running mean of exact utilities, one per player.
    pub fn average_utilities(&self) -> Vec<f64> {
        let n = self.iteration.max(1) as f64;
        self.utility_sum.iter().map(|u| u / n).collect()
    }

    /// Average strategy for an information set, the learned policy.
    pub fn average_strategy(&self, info_key: &str) -> Option<Vec<f64>> {
        self.table.average_strategy(info_key)
    }

    /// Regret-matched strategy for an information set.
    pub fn current_strategy(&self, info_key: &str) -> Option<Vec<f64>> {
        self.table.current_strategy(info_key)
    }

    /// All information set keys discovered during training, sorted.
    pub fn info_set_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.table.iter().map(|(k, _)| k.clone()).collect();
        keys.sort();
        keys
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.table.num_info_sets()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// The regret table.
    pub fn table(&self) -> &RegretTable {
        &self.table
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Export the learned policy.
    pub fn strategy_table(&self) -> StrategyTable {
        StrategyTable::from_regret_table(&self.table)
    }

    /// Seed the table from an exported policy.
    ///
    /// Each entry becomes a node whose regret and strategy sums are its
    /// probabilities scaled by its visit count, so both the current and the
    /// average strategy start out equal to the loaded one. Entries that are
    /// empty, non-finite, negative or not summing to one reject the whole
    /// table before anything is inserted.
    pub fn load_strategy_table(&mut self, strategies: &StrategyTable) -> Result<()> {
        for (key, entry) in strategies.iter() {
            let probabilities = &entry.probabilities;
            if probabilities.is_empty() {
                return Err(SolverError::Format(format!("{}: empty strategy", key)));
            }
            if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(SolverError::Format(format!(
                    "{}: invalid probabilities {:?}",
                    key, probabilities
                )));
            }
            let total: f64 = probabilities.iter().sum();
            if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(SolverError::Format(format!(
                    "{}: probabilities sum to {}",
                    key, total
                )));
            }
        }

        for (key, entry) in strategies.iter() {
            self.table.insert(
                key.clone(),
                RegretNode::from_average(&entry.probabilities, entry.visits),
            );
        }
        self.stats.info_sets = self.table.num_info_sets();
        log::info!("loaded {} strategy entries", strategies.len());
        Ok(())
    }

    /// Export trainer state for checkpointing.
    pub fn export_state(&self) -> TrainerState {
        TrainerState {
            iteration: self.iteration,
            table: self.table.clone(),
            utility_sum: self.utility_sum.clone(),
            stats: self.stats.clone(),
        }
    }

    /// Import trainer state from a checkpoint.
    pub fn import_state(&mut self, state: TrainerState) -> Result<()> {
        if state.utility_sum.len() != self.game.num_players() {
            return Err(SolverError::Format(format!(
                "checkpoint has {} utility sums, game has {} players",
                state.utility_sum.len(),
                self.game.num_players()
            )));
        }
        if let Some((key, _)) = state.table.iter().find(|(_, node)| {
            node.num_actions() == 0 || node.strategy_sum().len() != node.num_actions()
        }) {
            return Err(SolverError::Format(format!("checkpoint node {} is malformed", key)));
        }
        self.iteration = state.iteration;
        self.table = state.table;
        self.utility_sum = state.utility_sum;
        self.stats = state.stats;
        Ok(())
    }

    /// Reset the trainer to its initial state.
    ///
    /// A seeded trainer also restarts its random stream.
    pub fn reset(&mut self) {
        self.table.clear();
        self.iteration = 0;
        self.utility_sum = vec![0.0; self.game.num_players()];
        self.stats = TrainingStats::new();
        self.rng = seeded_rng(self.config.seed);
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// External-sampling MCCFR walk from `state` for `traverser`.
///
/// Returns the traverser's expected utility. `reach` holds each player's
/// own contribution to the probability of reaching `state`.
pub fn traverse<G, N, R>(
    game: &G,
    nodes: &mut N,
    rng: &mut R,
    mut state: G::State,
    traverser: usize,
    reach: &[f64],
) -> Result<f64>
where
    G: Game,
    N: NodeAccess,
    R: Rng,
{
    if game.is_terminal(&state) {
        let returns = game.returns(&state)?;
        return Ok(returns.get(traverser).copied().unwrap_or(0.0));
    }

    if game.is_chance(&state) {
        let action = game.chance_action(&state);
        game.apply_action(&mut state, &action)?;
        return traverse(game, nodes, rng, state, traverser, reach);
    }

    let player = game
        .current_player(&state)
        .ok_or(SolverError::NoLegalActions)?;
    let actions = game.legal_actions(&state);
    if actions.is_empty() {
        return Err(SolverError::NoLegalActions);
    }

    let key = game.info_state(&state, player).key();
    let strategy = nodes.strategy(&key, actions.len(), reach[player])?;

    if player == traverser {
        let mut utilities = vec![0.0; actions.len()];
        for (i, action) in actions.iter().enumerate() {
            let mut next = state.clone();
            game.apply_action(&mut next, action)?;

            let mut next_reach = reach.to_vec();
            next_reach[player] *= strategy[i];
            utilities[i] = traverse(game, nodes, rng, next, traverser, &next_reach)?;
        }

        let expected: f64 = strategy
            .iter()
            .zip(&utilities)
            .map(|(&s, &u)| s * u)
            .sum();

        for (i, &u) in utilities.iter().enumerate() {
            nodes.update_regret(&key, i, u - expected)?;
        }

        Ok(expected)
    } else {
        let index = sample_action(rng, &strategy);
        let mut next_reach = reach.to_vec();
        next_reach[player] *= strategy[index];

        game.apply_action(&mut state, &actions[index])?;
        traverse(game, nodes, rng, state, traverser, &next_reach)
    }
}

/// Sample an action index according to a probability distribution.
pub fn sample_action<R: Rng>(rng: &mut R, strategy: &[f64]) -> usize {
    let r: f64 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &prob) in strategy.iter().enumerate() {
        cumsum += prob;
        if r < cumsum {
            return i;
        }
    }

    // Floating point shortfall
    strategy.len().saturating_sub(1)
}

/// Play `state` out with every player's average strategy.
///
/// Known information sets take their most likely action; unseen ones pick
/// uniformly at random.
pub fn exact_utilities<G, R>(
    game: &G,
    table: &RegretTable,
    rng: &mut R,
    mut state: G::State,
) -> Result<Vec<f64>>
where
    G: Game,
    R: Rng,
{
    loop {
        if game.is_terminal(&state) {
            log::trace!("replayed {}", game.state_description(&state));
            return game.returns(&state);
        }

        if game.is_chance(&state) {
            let action = game.chance_action(&state);
            game.apply_action(&mut state, &action)?;
            continue;
        }

        let player = game
            .current_player(&state)
            .ok_or(SolverError::NoLegalActions)?;
        let actions = game.legal_actions(&state);
        if actions.is_empty() {
            return Err(SolverError::NoLegalActions);
        }

        let key = game.info_state(&state, player).key();
        let index = match table.get(&key) {
            Some(node) => argmax(&node.average_strategy()),
            None => rng.gen_range(0..actions.len()),
        };
        let action = actions.get(index).ok_or(SolverError::InvalidAction {
            action: index,
            num_actions: actions.len(),
        })?;
        game.apply_action(&mut state, action)?;
    }
}

/// First index of the largest value.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn traverse_batch<G: Game>(
    game: &G,
    table: &RegretTable,
    hands: &[(G::State, u64)],
) -> Result<Vec<FxHashMap<String, RegretNode>>> {
    let num_players = game.num_players();

    hands
        .par_iter()
        .try_fold(
            || BatchAccumulator::new(table),
            |mut acc, (state, seed)| {
                let mut rng = StdRng::seed_from_u64(*seed);
                for player in 0..num_players {
                    let reach = vec![1.0; num_players];
                    traverse(game, &mut acc, &mut rng, state.clone(), player, &reach)?;
                }
                Ok::<_, SolverError>(acc)
            },
        )
        .map(|acc| acc.map(BatchAccumulator::into_delta))
        .collect()
}

/// Serializable trainer state for checkpointing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerState {
    /// Current iteration.
    pub iteration: u64,
    /// All regret nodes.
    pub table: RegretTable,
    /// Sum of exact utilities per player.
    pub utility_sum: Vec<f64>,
    /// Statistics.
    pub stats: TrainingStats,
}

impl TrainerState {
    /// Write the checkpoint as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    /// Read a JSON checkpoint.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

/// Statistics during convergence-based training.
#[derive(Debug, Clone)]
pub struct ConvergenceStats {
    /// Current iteration count.
    pub iteration: u64,
    /// Current Convergence Indicator value.
    pub ci: f64,
    /// Number of information sets discovered.
    pub info_sets: usize,
    /// Elapsed time in seconds.
    pub elapsed_seconds: f64,
    /// Current solve speed.
    pub iterations_per_second: f64,
}

/// Result of convergence-based training.
#[derive(Debug, Clone)]
pub struct ConvergenceResult {
    /// Whether the target CI was reached.
    pub converged: bool,
    /// Final CI value achieved.
    pub final_ci: f64,
    /// Total iterations run.
    pub iterations: u64,
    /// Total elapsed time in seconds.
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::strategy::StrategyEntry;
    use crate::games::aof::{AofAction, AofConfig, AofGame, RakeConfig};

    fn trainer(seed: u64) -> Trainer<AofGame> {
        Trainer::new(AofGame::default(), TrainerConfig::new().with_seed(seed)).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainerConfig::new().with_batch_size(0);
        assert!(Trainer::new(AofGame::default(), config).is_err());
    }

    #[test]
    fn test_train_default_game() {
        let mut trainer = trainer(42);
        let stats = trainer.train(1000).unwrap().clone();

        assert_eq!(stats.iterations, 1000);
        assert_eq!(trainer.iteration(), 1000);
        assert!(stats.info_sets > 0);
        assert_eq!(stats.average_utilities.len(), 4);
        assert!(stats.average_utilities.iter().sum::<f64>().abs() < 1e-6);
        assert!(!trainer.info_set_keys().is_empty());
    }

    #[test]
    fn test_exact_utilities_are_zero_sum() {
        let mut trainer = trainer(7);
        for _ in 0..50 {
            let exact = trainer.run_iteration().unwrap();
            assert_eq!(exact.len(), 4);
            assert!(exact.iter().sum::<f64>().abs() < 1e-9);
        }
    }

    #[test]
    fn test_raked_exact_utilities_lose_fees() {
        let config = AofConfig::default().with_rake(RakeConfig::new(0.05, 0.02, 0.0));
        let game = AofGame::new(config).unwrap();
        let mut trainer = Trainer::new(game, TrainerConfig::new().with_seed(3)).unwrap();
        for _ in 0..50 {
            let total: f64 = trainer.run_iteration().unwrap().iter().sum();
            assert!((total + 0.07).abs() < 1e-9);
        }
    }

    #[test]
    fn test_two_runs_agree() {
        let mut a = trainer(1);
        let mut b = trainer(2);
        a.train(2000).unwrap();
        b.train(2000).unwrap();

        for (x, y) in a.average_utilities().iter().zip(b.average_utilities()) {
            assert!((x - y).abs() < 1.5, "utilities diverged: {} vs {}", x, y);
        }

        // Pocket aces open-shove from the first seat in both runs.
        for t in [&a, &b] {
            let key = t
                .info_set_keys()
                .into_iter()
                .find(|k| k.starts_with("P2:") && k.contains("]AA "))
                .unwrap();
            let strategy = t.average_strategy(&key).unwrap();
            assert!(strategy[1] > 0.5, "{} -> {:?}", key, strategy);
        }
    }

    #[test]
    fn test_average_strategies_are_distributions() {
        let mut trainer = trainer(5);
        trainer.train(300).unwrap();
        for key in trainer.info_set_keys() {
            let avg = trainer.average_strategy(&key).unwrap();
            let cur = trainer.current_strategy(&key).unwrap();
            assert_eq!(avg.len(), 2);
            assert!((avg.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            assert!((cur.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert_eq!(trainer.average_strategy("missing"), None);
    }

    #[test]
    fn test_callback_and_history() {
        let config = TrainerConfig::new().with_seed(9).with_log_interval(50);
        let mut trainer = Trainer::new(AofGame::default(), config).unwrap();

        let mut calls = 0;
        trainer
            .train_with_callback(200, 25, |stats| {
                calls += 1;
                assert_eq!(stats.iterations % 25, 0);
            })
            .unwrap();

        assert_eq!(calls, 8);
        let history = &trainer.stats().history;
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].iteration, 200);
    }

    #[test]
    fn test_parallel_training() {
        let config = TrainerConfig::new()
            .with_seed(11)
            .with_threads(2)
            .with_batch_size(16);
        let mut trainer = Trainer::new(AofGame::default(), config).unwrap();

        let mut batches = 0;
        trainer
            .train_parallel_with_callback(200, |_| batches += 1)
            .unwrap();

        assert_eq!(batches, 13);
        assert_eq!(trainer.iteration(), 200);
        assert!(trainer.num_info_sets() > 0);
        assert!(trainer.average_utilities().iter().sum::<f64>().abs() < 1e-6);
    }

    #[test]
    fn test_parallel_matches_sequential_shape() {
        let mut sequential = trainer(13);
        sequential.train(500).unwrap();

        let config = TrainerConfig::new().with_seed(13).with_batch_size(32);
        let mut parallel = Trainer::new(AofGame::default(), config).unwrap();
        parallel.train_parallel(500).unwrap();

        // Both discover the first actor's decisions for common hands.
        let first_actor = |t: &Trainer<AofGame>| {
            t.info_set_keys()
                .into_iter()
                .filter(|k| k.starts_with("P2:"))
                .count()
        };
        assert!(first_actor(&sequential) > 50);
        assert!(first_actor(&parallel) > 50);
    }

    #[test]
    fn test_train_until_converged() {
        let mut trainer = trainer(17);
        let result = trainer
            .train_until_converged(200.0, 500, 5000, |_| {})
            .unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 1000);
        assert!(result.final_ci <= 200.0);
        assert_eq!(trainer.stats().convergence_indicator, Some(result.final_ci));

        let mut trainer = self::trainer(17);
        let mut checks = 0;
        let result = trainer
            .train_until_converged(0.0, 500, 1500, |_| checks += 1)
            .unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 1500);
        assert_eq!(checks, 3);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let mut trainer = trainer(21);
        trainer.train(200).unwrap();
        let state = trainer.export_state();

        let json = serde_json::to_string(&state).unwrap();
        let restored: TrainerState = serde_json::from_str(&json).unwrap();

        let mut resumed = self::trainer(0);
        resumed.import_state(restored).unwrap();
        assert_eq!(resumed.iteration(), 200);
        assert_eq!(resumed.num_info_sets(), trainer.num_info_sets());
        assert_eq!(resumed.average_utilities(), trainer.average_utilities());

        let key = &trainer.info_set_keys()[0];
        assert_eq!(resumed.average_strategy(key), trainer.average_strategy(key));

        resumed.train(10).unwrap();
        assert_eq!(resumed.iteration(), 210);
    }

    #[test]
    fn test_import_rejects_wrong_player_count() {
        let mut trainer = trainer(1);
        let mut state = trainer.export_state();
        state.utility_sum = vec![0.0; 3];
        assert!(matches!(
            trainer.import_state(state),
            Err(SolverError::Format(_))
        ));
    }

    #[test]
    fn test_load_strategy_table() {
        let mut trainer = trainer(23);
        trainer.train(200).unwrap();
        let table = trainer.strategy_table();

        let mut loaded = self::trainer(0);
        loaded.load_strategy_table(&table).unwrap();
        assert_eq!(loaded.num_info_sets(), trainer.num_info_sets());

        for key in trainer.info_set_keys().iter().take(20) {
            let a = trainer.average_strategy(key).unwrap();
            let b = loaded.average_strategy(key).unwrap();
            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_load_rejects_malformed_entries() {
        let mut trainer = trainer(5);
        for probabilities in [vec![], vec![0.5, 0.4], vec![f64::NAN, 1.0], vec![1.5, -0.5]] {
            let mut table = StrategyTable::new();
            let good = StrategyEntry {
                visits: 3,
                probabilities: vec![0.5, 0.5],
            };
            table.insert("good".to_string(), good);
            table.insert("bad".to_string(), StrategyEntry { visits: 3, probabilities });
            assert!(matches!(
                trainer.load_strategy_table(&table),
                Err(SolverError::Format(_))
            ));
        }
        assert_eq!(trainer.num_info_sets(), 0);
    }

    #[test]
    fn test_wrongly_sized_loaded_entry_fails_training() {
        let game = AofGame::default();
        let mut state = game.create_seeded_state(23);
        game.apply_action(&mut state, &AofAction::Deal).unwrap();
        let player = game.current_player(&state).unwrap();
        let key = game.info_state(&state, player).key();

        let mut table = StrategyTable::new();
        let entry = StrategyEntry {
            visits: 10,
            probabilities: vec![1.0],
        };
        table.insert(key, entry);

        let mut sequential = trainer(23);
        sequential.load_strategy_table(&table).unwrap();
        assert!(matches!(
            sequential.train(50),
            Err(SolverError::InvalidAction { .. })
        ));

        let mut parallel = trainer(23);
        parallel.load_strategy_table(&table).unwrap();
        assert!(matches!(
            parallel.train_parallel(50),
            Err(SolverError::InvalidAction { .. })
        ));
    }

    #[test]
    fn test_import_rejects_malformed_node() {
        let mut trainer = trainer(9);
        trainer.train(10).unwrap();
        let mut state = trainer.export_state();
        state.table.insert("empty".to_string(), RegretNode::new(0));
        assert!(matches!(
            trainer.import_state(state),
            Err(SolverError::Format(_))
        ));
    }

    #[test]
    fn test_reset() {
        let mut trainer = trainer(31);
        let first = trainer.run_iteration().unwrap();
        trainer.train(50).unwrap();

        trainer.reset();
        assert_eq!(trainer.iteration(), 0);
        assert_eq!(trainer.num_info_sets(), 0);
        assert_eq!(trainer.stats().iterations, 0);

        // Seeded trainers replay from the start after a reset.
        assert_eq!(trainer.run_iteration().unwrap(), first);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = trainer(99);
        let mut b = trainer(99);
        a.train(100).unwrap();
        b.train(100).unwrap();
        assert_eq!(a.average_utilities(), b.average_utilities());
        assert_eq!(a.info_set_keys(), b.info_set_keys());
    }

    #[test]
    fn test_sample_action() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(sample_action(&mut rng, &[0.0, 1.0]), 1);
            assert_eq!(sample_action(&mut rng, &[1.0, 0.0]), 0);
        }
    }

    #[test]
    fn test_argmax_prefers_first() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.8]), 1);
    }
}
