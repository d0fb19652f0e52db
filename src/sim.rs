//! Headless self-play.
//!
//! Provides a pure function interface: `(seed, config) -> SimResult`.
//! Random bots drive a generated game through the same command API a
//! transport would use, so every rule and barrier check is exercised.
//! Batches of games run in parallel with rayon.

use indicatif::ProgressBar;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{GameError, GameResult};
use crate::game::{Game, GameStatus, GenerationConfig, NodeKind, assert_invariants};
use crate::session::{Command, CommandOutcome};

/// Archetypes random bots specialize into.
const BOT_KINDS: [NodeKind; 7] = [
    NodeKind::Shield,
    NodeKind::Sabotage,
    NodeKind::Attack,
    NodeKind::Corruption,
    NodeKind::Destructor,
    NodeKind::Sensor,
    NodeKind::Collaborator,
];

/// Configuration for self-play games.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Number of bots.
    pub players: usize,
    /// Ticks before a game is called unfinished.
    pub max_turns: u32,
    /// Commands each bot tries per turn before `done`.
    pub actions_per_turn: usize,
    /// Grid generation parameters.
    pub generation: GenerationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            players: 2,
            max_turns: 200,
            actions_per_turn: 4,
            generation: GenerationConfig::default(),
        }
    }
}

/// How one bot fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotOutcome {
    /// Bot name.
    pub name: String,
    /// Nodes owned at the end.
    pub nodes: usize,
    /// Cores owned at the end.
    pub cores: usize,
    /// Tick at which the bot was defeated, if it was.
    pub defeated_at: Option<u32>,
}

/// Final result of a self-play game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimResult {
    /// Seed the game was generated from.
    pub seed: u64,
    /// Final status; `Running` means the turn limit was hit.
    pub status: GameStatus,
    /// Index of the winning bot in `bots`.
    pub winner: Option<usize>,
    /// Ticks executed.
    pub turns_played: u32,
    /// Per-bot outcome in join order.
    pub bots: Vec<BotOutcome>,
    /// Commands the engine refused.
    pub rejected: u64,
}

/// A bot that issues random but mostly affordable commands.
#[derive(Debug, Clone)]
pub struct RandomBot {
    name: String,
    rng: SmallRng,
    actions: usize,
}

impl RandomBot {
    /// Create a bot issuing up to `actions` commands per turn.
    #[must_use]
    pub fn new(name: impl Into<String>, seed: u64, actions: usize) -> Self {
        Self {
            name: name.into(),
            rng: SmallRng::seed_from_u64(seed),
            actions,
        }
    }

    /// Bot name, also its player name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pick this turn's commands, not including `done`.
    pub fn plan(&mut self, game: &Game) -> Vec<Command> {
        let Some(player) = game.player_by_name(&self.name) else {
            return Vec::new();
        };
        let grid = &game.grid;
        let owned: Vec<_> = grid.owned_by(player.id).map(|node| node.coord).collect();

        let mut commands = Vec::with_capacity(self.actions);
        for _ in 0..self.actions {
            let Some(node) = owned.choose(&mut self.rng).and_then(|&c| grid.get(c)) else {
                break;
            };
            let energy = grid.energy(node);
            if energy <= 1.0 {
                continue;
            }

            match self.rng.gen_range(0..10) {
                0..=6 => {
                    let targets: Vec<_> = grid.neighbours(node.coord, 1).map(|n| n.coord).collect();
                    if let Some(&target) = targets.choose(&mut self.rng) {
                        commands.push(Command::Link {
                            source: node.coord,
                            target,
                            power: energy * self.rng.gen_range(0.1..0.6),
                        });
                    }
                }
                7 | 8 if node.kind != NodeKind::Core => {
                    if let Some(&kind) = BOT_KINDS.choose(&mut self.rng)
                        && grid.projected_energy(node, kind) > 0.0
                    {
                        commands.push(Command::Specialize {
                            node: node.coord,
                            kind,
                        });
                    }
                }
                _ => {
                    if !node.hidden && energy > node.consumption() {
                        commands.push(Command::Hide { node: node.coord });
                    }
                }
            }
        }
        commands
    }
}

/// Run a complete self-play game.
///
/// Given the same seed and config, this always produces the same result.
///
/// # Errors
///
/// Returns an error if the config is invalid, the grid has no room for
/// every bot's core, or the engine refuses a `done`.
pub fn run_game(seed: u64, config: &SimConfig) -> GameResult<SimResult> {
    let mut game = Game::create(
        format!("sim-{seed}"),
        config.width,
        config.height,
        &config.generation,
        seed,
    )?;

    let mut seeder = SmallRng::seed_from_u64(seed ^ 0x5EED);
    let mut bots = Vec::with_capacity(config.players);
    for i in 1..=config.players {
        let name = format!("bot{i}");
        game.join(&name)?;
        bots.push(RandomBot::new(name, seeder.r#gen(), config.actions_per_turn));
    }

    let mut defeated_at = vec![None; bots.len()];
    let mut rejected = 0;

    while !game.is_over() && game.tick() < config.max_turns {
        for bot in &mut bots {
            if game.is_over() {
                break;
            }
            if game.player_by_name(bot.name()).is_none_or(|p| p.lost) {
                continue;
            }
            for command in bot.plan(&game) {
                if let Err(err) = game.submit(bot.name(), &command) {
                    rejected += 1;
                    warn!(bot = bot.name(), command = command.name(), %err, "command rejected");
                }
            }

            match game.submit(bot.name(), &Command::Done) {
                Ok(CommandOutcome::Advanced { report }) => {
                    for id in report.defeated {
                        if let Some(slot) = defeated_at.get_mut(usize::from(id) - 1) {
                            *slot = Some(report.tick);
                        }
                    }
                    assert_invariants(&game);
                }
                Ok(_) | Err(GameError::GameOver(_)) => {}
                Err(err) => return Err(err),
            }
        }
    }

    let winner = match game.status() {
        GameStatus::Won { winner } => Some(usize::from(winner) - 1),
        GameStatus::Running | GameStatus::Draw => None,
    };
    let bots = game
        .players
        .iter()
        .zip(defeated_at)
        .map(|(player, defeated_at)| BotOutcome {
            name: player.name.clone(),
            nodes: game.grid.owned_by(player.id).count(),
            cores: game.grid.count_cores(player.id),
            defeated_at,
        })
        .collect();

    debug!(seed, turns = game.tick(), ?winner, rejected, "self-play game finished");
    Ok(SimResult {
        seed,
        status: game.status(),
        winner,
        turns_played: game.tick(),
        bots,
        rejected,
    })
}

/// Aggregated results of many games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStats {
    /// Games that ran to a result or the turn limit.
    pub games_played: u64,
    /// Games that failed to start.
    pub failed: u64,
    /// Win count per bot.
    pub wins: Vec<u64>,
    /// Games that ended with no player holding a core.
    pub draws: u64,
    /// Games stopped by the turn limit.
    pub unfinished: u64,
    /// Commands refused across all games.
    pub rejected: u64,
    total_turns: u64,
}

impl BatchStats {
    /// Create empty stats for `players` bots.
    #[must_use]
    pub fn new(players: usize) -> Self {
        Self {
            wins: vec![0; players],
            ..Self::default()
        }
    }

    /// Add one game.
    pub fn add_result(&mut self, result: &SimResult) {
        self.games_played += 1;
        self.total_turns += u64::from(result.turns_played);
        self.rejected += result.rejected;

        match (result.status, result.winner) {
            (GameStatus::Won { .. }, Some(idx)) => {
                if let Some(wins) = self.wins.get_mut(idx) {
                    *wins += 1;
                }
            }
            (GameStatus::Draw, _) => self.draws += 1,
            _ => self.unfinished += 1,
        }
    }

    /// Merge stats gathered on another thread.
    pub fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.failed += other.failed;
        self.draws += other.draws;
        self.unfinished += other.unfinished;
        self.rejected += other.rejected;
        self.total_turns += other.total_turns;
        if self.wins.len() < other.wins.len() {
            self.wins.resize(other.wins.len(), 0);
        }
        for (mine, theirs) in self.wins.iter_mut().zip(&other.wins) {
            *mine += theirs;
        }
    }

    /// Win rate of a bot in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self, bot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins.get(bot).copied().unwrap_or(0) as f64 / self.games_played as f64
    }

    /// Average ticks per game.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }
}

/// Run `games` games with consecutive seeds from `base_seed` in parallel.
///
/// Each rayon thread folds into its own [`BatchStats`]; the partial
/// stats are merged at the end.
pub fn run_batch(
    base_seed: u64,
    games: u64,
    config: &SimConfig,
    progress: Option<&ProgressBar>,
) -> BatchStats {
    (0..games)
        .into_par_iter()
        .fold(
            || BatchStats::new(config.players),
            |mut stats, i| {
                match run_game(base_seed.wrapping_add(i), config) {
                    Ok(result) => stats.add_result(&result),
                    Err(err) => {
                        stats.failed += 1;
                        warn!(seed = base_seed.wrapping_add(i), %err, "game failed to start");
                    }
                }
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                stats
            },
        )
        .reduce(
            || BatchStats::new(config.players),
            |mut a, b| {
                a.merge(&b);
                a
            },
        )
}
