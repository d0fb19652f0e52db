//! Output formatting utilities for CLI.

use std::fmt::Write;

use battlenode::sim::{BatchStats, SimConfig};
use serde::Serialize;

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// First seed of the batch.
    base_seed: u64,
    /// Grid width.
    width: u16,
    /// Grid height.
    height: u16,
    /// Tick limit per game.
    max_turns: u32,
    /// Per-bot statistics.
    bots: Vec<JsonBotStats>,
    /// Games that ended with no player holding a core.
    draws: u64,
    /// Games stopped by the tick limit.
    unfinished: u64,
    /// Games that failed to start.
    failed: u64,
    /// Total games played.
    games_played: u64,
    /// Average game length in ticks.
    avg_turns: f64,
    /// Commands refused across all games.
    rejected: u64,
}

/// JSON-serializable per-bot stats.
#[derive(Debug, Serialize)]
struct JsonBotStats {
    /// Bot name.
    bot: String,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
}

impl JsonBatchResult {
    /// Create from stats and the batch configuration.
    pub(super) fn new(stats: &BatchStats, base_seed: u64, config: &SimConfig) -> Self {
        let bots = stats
            .wins
            .iter()
            .enumerate()
            .map(|(i, &wins)| JsonBotStats {
                bot: format!("bot{}", i + 1),
                wins,
                win_rate: stats.win_rate(i),
            })
            .collect();

        Self {
            base_seed,
            width: config.width,
            height: config.height,
            max_turns: config.max_turns,
            bots,
            draws: stats.draws,
            unfinished: stats.unfinished,
            failed: stats.failed,
            games_played: stats.games_played,
            avg_turns: stats.avg_turns(),
            rejected: stats.rejected,
        }
    }
}

/// Format batch stats as human-readable text.
#[allow(clippy::cast_precision_loss)]
pub(super) fn format_batch_text(stats: &BatchStats, base_seed: u64) -> String {
    let mut output = String::new();
    let share = |n: u64| {
        if stats.games_played == 0 {
            0.0
        } else {
            n as f64 / stats.games_played as f64 * 100.0
        }
    };

    let _ = writeln!(
        output,
        "Self-play Results ({} games, seeds from {base_seed})",
        stats.games_played
    );
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for (i, &wins) in stats.wins.iter().enumerate() {
        let _ = writeln!(
            output,
            "  bot{}: {:.1}% ({wins} wins)",
            i + 1,
            stats.win_rate(i) * 100.0
        );
    }
    let _ = writeln!(output, "  Draws: {} ({:.1}%)", stats.draws, share(stats.draws));
    let _ = writeln!(
        output,
        "  Unfinished: {} ({:.1}%)",
        stats.unfinished,
        share(stats.unfinished)
    );
    if stats.failed > 0 {
        let _ = writeln!(output, "  Failed to start: {}", stats.failed);
    }

    let _ = writeln!(output, "\nAverage Game Length: {:.0} ticks", stats.avg_turns());
    let _ = writeln!(output, "Rejected Commands: {}", stats.rejected);

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_batch_text_empty() {
        let output = format_batch_text(&BatchStats::new(2), 7);
        assert!(output.contains("0 games, seeds from 7"));
        assert!(output.contains("bot1: 0.0%"));
        assert!(output.contains("bot2: 0.0%"));
        assert!(!output.contains("Failed"));
    }

    #[test]
    fn test_json_batch_result_names_bots() {
        let result = JsonBatchResult::new(&BatchStats::new(3), 1, &SimConfig::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["bots"].as_array().unwrap().len(), 3);
        assert_eq!(json["bots"][2]["bot"], "bot3");
        assert_eq!(json["width"], 16);
    }
}
