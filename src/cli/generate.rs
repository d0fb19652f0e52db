//! Generate command implementation.

use std::path::PathBuf;

use battlenode::game::Game;
use battlenode::render::render_ascii;
use battlenode::session::{InitView, StateView};
use serde::Serialize;

use super::{CliError, OutputFormat, load_config, resolve_seed};

/// Full dump of a freshly generated game.
#[derive(Debug, Serialize)]
struct GeneratedGame {
    seed: u64,
    #[serde(flatten)]
    init: InitView,
    state: StateView,
}

/// Execute the generate command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or generation fails.
pub(crate) fn execute(
    width: u16,
    height: u16,
    seed: Option<u64>,
    players: usize,
    config: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let seed = resolve_seed(seed);

    let mut game = Game::create(format!("grid-{seed}"), width, height, &config, seed)?;
    for i in 1..=players {
        game.join(&format!("player{i}"))?;
    }

    match format {
        OutputFormat::Text => {
            println!("Seed: {seed}");
            print!("{}", render_ascii(&game, None));
        }
        OutputFormat::Json => {
            let dump = GeneratedGame {
                seed,
                init: InitView::new(&game),
                state: StateView::new(&game, game.grid.coords()),
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    Ok(())
}
