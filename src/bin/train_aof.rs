//! All-or-Fold training binary.
//!
//! Usage:
//!   cargo run --release --bin train_aof -- [ITERATIONS] [SEED] [OUTPUT_PREFIX] [OPTIONS]
//!
//! Options:
//!   --parallel           Train in rayon batches
//!   --threads <N>        Worker threads for --parallel (default: auto)
//!   --config <FILE>      Game configuration JSON file (optional)
//!   --rake               Apply the standard rake for the configured stakes
//!   --ci <VALUE>         Stop once the Convergence Indicator reaches VALUE
//!
//! Writes `<prefix>.txt` and `<prefix>.bin` strategy files.

use std::env;
use std::error::Error;

use aof_solver::cfr::{Action, ConvergenceStats, Trainer, TrainerConfig, TrainingStats};
use aof_solver::games::aof::action::DECISION_ACTIONS;
use aof_solver::games::aof::{AofConfig, AofGame, POSITION_NAMES};
use indicatif::{ProgressBar, ProgressStyle};

const DEFAULT_ITERATIONS: u64 = 100_000;
const DEFAULT_PREFIX: &str = "aof_strategy";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let mut positional: Vec<String> = Vec::new();
    let mut parallel = false;
    let mut threads: Option<usize> = None;
    let mut config_file: Option<String> = None;
    let mut standard_rake = false;
    let mut ci_target: Option<f64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--parallel" | "-p" => parallel = true,
            "--threads" | "-t" => {
                i += 1;
                threads = args.get(i).and_then(|s| s.parse().ok());
            }
            "--config" | "-c" => {
                i += 1;
                config_file = args.get(i).cloned();
            }
            "--rake" => standard_rake = true,
            "--ci" => {
                i += 1;
                ci_target = args.get(i).and_then(|s| s.parse().ok());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                return Ok(());
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let iterations: u64 = match positional.first() {
        Some(s) => s.parse()?,
        None => DEFAULT_ITERATIONS,
    };
    let seed: Option<u64> = positional.get(1).map(|s| s.parse()).transpose()?;
    let prefix = positional
        .get(2)
        .cloned()
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let mut config = match &config_file {
        Some(path) => AofConfig::from_json_file(path)?,
        None => AofConfig::default(),
    };
    if standard_rake {
        config = config.with_standard_rake()?;
    }

    println!("=================================================");
    println!("  All-or-Fold MCCFR Trainer");
    println!("=================================================");
    println!();
    println!("Blinds: {}/{}", config.small_blind, config.big_blind);
    println!("Stacks: {:?}", config.initial_stacks());
    if config.rake.is_raked() {
        println!(
            "Rake: {} per hand, jackpot fee {}, payout {}%",
            config.rake.rake_per_hand,
            config.rake.jackpot_fee_per_hand,
            config.rake.jackpot_payout_percentage * 100.0
        );
    }
    println!("Iterations: {}", iterations);
    if let Some(s) = seed {
        println!("Seed: {}", s);
    }
    println!("Mode: {}", if parallel { "parallel" } else { "sequential" });
    println!("Output: {}.txt / {}.bin", prefix, prefix);
    println!();

    let mut trainer_config = TrainerConfig::new();
    if let Some(s) = seed {
        trainer_config = trainer_config.with_seed(s);
    }
    if let Some(t) = threads {
        trainer_config = trainer_config.with_threads(t);
    }

    let game = AofGame::new(config)?;
    let mut trainer = Trainer::new(game, trainer_config)?;

    let pb = training_progress(iterations)?;
    let report = |stats: &TrainingStats| {
        pb.set_position(stats.iterations);
        pb.set_message(format!(
            "{} info sets, err {:.4}",
            stats.info_sets, stats.mean_absolute_error
        ));
    };

    if let Some(target) = ci_target {
        let result = trainer.train_until_converged(
            target,
            (iterations / 100).max(1_000),
            iterations,
            |stats: &ConvergenceStats| {
                pb.set_position(stats.iteration.min(iterations));
                pb.set_message(format!("CI {:.2}, {} info sets", stats.ci, stats.info_sets));
            },
        )?;
        pb.finish_and_clear();
        if result.converged {
            println!("Converged! Final CI: {:.2} (target: {:.2})", result.final_ci, target);
        } else {
            println!(
                "Stopped at max iterations. Final CI: {:.2} (target: {:.2})",
                result.final_ci, target
            );
        }
    } else if parallel {
        trainer.train_parallel_with_callback(iterations, report)?;
        pb.finish_and_clear();
    } else {
        trainer.train_with_callback(iterations, (iterations / 1000).max(1), report)?;
        pb.finish_and_clear();
    }

    let stats = trainer.stats();
    println!("Training complete!");
    println!("Total time: {:.2}s", stats.elapsed_seconds);
    println!("Average speed: {:.0} iterations/second", stats.iterations_per_second);
    println!("Info sets: {}", stats.info_sets);
    println!();

    println!("=== Average Utilities ===");
    let game_config = trainer.game().config();
    for (name, utility) in POSITION_NAMES.iter().zip(trainer.average_utilities()) {
        println!("  {:<4} {:>+9.4} bb", name, game_config.chips_to_bb(utility));
    }
    println!("  Mean absolute error: {:.6}", stats.mean_absolute_error);
    println!();

    let table = trainer.strategy_table();
    let text_path = format!("{}.txt", prefix);
    let bin_path = format!("{}.bin", prefix);
    table.save_text(&text_path)?;
    table.save_binary(&bin_path)?;
    println!("Saved {} strategies to {} and {}", table.len(), text_path, bin_path);

    println!();
    println!("=== Most Visited ===");
    for (key, entry) in table.sorted_by_visits().into_iter().take(5) {
        println!("{} ({} visits)", key, entry.visits);
        let line: Vec<String> = DECISION_ACTIONS
            .iter()
            .zip(&entry.probabilities)
            .map(|(action, p)| format!("{} {:.1}%", action.label(), p * 100.0))
            .collect();
        println!("  {}", line.join("  "));
    }

    Ok(())
}

fn training_progress(total: u64) -> Result<ProgressBar, Box<dyn Error>> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} iterations ({msg})")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

fn print_help() {
    println!("All-or-Fold MCCFR Trainer");
    println!();
    println!("Usage: train_aof [ITERATIONS] [SEED] [OUTPUT_PREFIX] [OPTIONS]");
    println!();
    println!("Arguments:");
    println!("  ITERATIONS               Iterations to run (default: {})", DEFAULT_ITERATIONS);
    println!("  SEED                     Random seed (default: from entropy)");
    println!("  OUTPUT_PREFIX            Strategy file prefix (default: {})", DEFAULT_PREFIX);
    println!();
    println!("Options:");
    println!("  -p, --parallel           Train in parallel batches");
    println!("  -t, --threads <N>        Worker threads for --parallel (default: auto)");
    println!("  -c, --config <FILE>      Game configuration JSON file");
    println!("  --rake                   Apply the standard rake for the stakes");
    println!("  --ci <VALUE>             Stop once CI reaches VALUE (ITERATIONS is the cap)");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  train_aof 1000000 42 aof_8bb --parallel");
    println!("  train_aof 500000 7 raked --config configs/aof_1_2.json --rake");
}
