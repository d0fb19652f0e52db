//! Simulate command implementation.

use std::path::PathBuf;
use std::time::Instant;

use battlenode::sim::{SimConfig, run_batch};
use indicatif::{ProgressBar, ProgressStyle};

use super::output::{JsonBatchResult, format_batch_text};
use super::{CliError, OutputFormat, load_config, resolve_seed};

/// Arguments of the simulate command.
#[derive(Debug)]
pub(crate) struct SimulateArgs {
    pub(crate) games: u64,
    pub(crate) seed: Option<u64>,
    pub(crate) threads: Option<usize>,
    pub(crate) players: usize,
    pub(crate) width: Option<u16>,
    pub(crate) height: Option<u16>,
    pub(crate) max_turns: Option<u32>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) format: OutputFormat,
    pub(crate) progress: bool,
}

/// Execute the simulate command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the output fails.
pub(crate) fn execute(args: SimulateArgs) -> Result<(), CliError> {
    if !(2..=battlenode::game::MAX_PLAYERS).contains(&args.players) {
        return Err(CliError::new(format!(
            "players must be between 2 and {}",
            battlenode::game::MAX_PLAYERS
        )));
    }

    // Set thread pool size if specified
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let defaults = SimConfig::default();
    let config = SimConfig {
        width: args.width.unwrap_or(defaults.width),
        height: args.height.unwrap_or(defaults.height),
        players: args.players,
        max_turns: args.max_turns.unwrap_or(defaults.max_turns),
        generation: load_config(args.config.as_deref())?,
        ..defaults
    };
    let base_seed = resolve_seed(args.seed);

    let pb = if args.progress {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let stats = run_batch(base_seed, args.games, &config, pb.as_ref());
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    match args.format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats, base_seed));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let result = JsonBatchResult::new(&stats, base_seed, &config);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
