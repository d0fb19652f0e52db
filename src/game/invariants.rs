//! Game invariants - sanity checks that detect bugs.
//!
//! These should never trigger in a correctly implemented game, no matter
//! which commands players send. If they do, the engine has a bug.

use std::collections::HashSet;

use crate::game::{Game, GameStatus};

/// Invariant violation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invariant violation: {message}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(game: &Game) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let grid = &game.grid;

    let mut edges = 0;
    for node in grid.nodes() {
        let mut targets = HashSet::new();
        for &target in node.outlink_targets() {
            edges += 1;
            if !targets.insert(target) {
                violations.push(InvariantViolation::new(format!(
                    "node {} has more than one link to {target}",
                    node.coord
                )));
            }
            if !node.coord.is_neighbour(target) {
                violations.push(InvariantViolation::new(format!(
                    "link {} -> {target} joins non-neighbours",
                    node.coord
                )));
            }
            match grid.link_power(node.coord, target) {
                Some(power) if power.is_finite() && power > 0.0 => {}
                Some(power) => violations.push(InvariantViolation::new(format!(
                    "link {} -> {target} has power {power}",
                    node.coord
                ))),
                None => violations.push(InvariantViolation::new(format!(
                    "link {} -> {target} missing from the link index",
                    node.coord
                ))),
            }
            if !grid
                .get(target)
                .is_some_and(|t| t.inlink_sources().contains(&node.coord))
            {
                violations.push(InvariantViolation::new(format!(
                    "link {} -> {target} missing from the target's inlinks",
                    node.coord
                )));
            }
        }

        for &source in node.inlink_sources() {
            if grid.link_power(source, node.coord).is_none() {
                violations.push(InvariantViolation::new(format!(
                    "inlink {source} -> {} has no link",
                    node.coord
                )));
            }
        }

        if node.power < 0.0 && !node.corrupted {
            violations.push(InvariantViolation::new(format!(
                "uncorrupted node {} has negative power {}",
                node.coord, node.power
            )));
        }
    }

    if edges != grid.link_count() {
        violations.push(InvariantViolation::new(format!(
            "link index holds {} links but nodes list {edges}",
            grid.link_count()
        )));
    }

    for player in &game.players {
        if player.lost {
            let owned = grid.owned_by(player.id).count();
            if owned > 0 {
                violations.push(InvariantViolation::new(format!(
                    "lost player {} still owns {owned} nodes",
                    player.name
                )));
            }
        } else if player.time < game.tick() || player.time > game.tick() + 1 {
            violations.push(InvariantViolation::new(format!(
                "player {} is at turn {} while the game is at tick {}",
                player.name,
                player.time,
                game.tick()
            )));
        }
    }

    let winners: Vec<_> = game.players.iter().filter(|p| p.wins).map(|p| p.id).collect();
    let consistent = match game.status() {
        GameStatus::Won { winner } => winners == [winner],
        GameStatus::Running | GameStatus::Draw => winners.is_empty(),
    };
    if !consistent {
        violations.push(InvariantViolation::new(format!(
            "status {:?} disagrees with winners {winners:?}",
            game.status()
        )));
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(game: &Game) {
    let violations = check_invariants(game);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_game: &Game) {}
