//! Property-based tests for game mechanics.
//!
//! These tests verify the link laws, grid generation and the tick pass.
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use battlenode::game::{
    Coord, Game, GenerationConfig, Grid, LinkOutcome, Node, NodeKind, check_invariants,
    generate_grid,
};
use battlenode::session::{Command, CommandOutcome};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// A fully populated grid with uniform power.
fn full_grid(width: u16, height: u16, power: f64) -> Grid {
    let mut grid = Grid::new(width, height).unwrap();
    for x in 1..=width {
        for y in 1..=height {
            grid.place(Node::new(Coord::new(x, y), NodeKind::Unspecialized, power));
        }
    }
    grid
}

fn coord() -> impl Strategy<Value = Coord> {
    (1u16..=8, 1u16..=8).prop_map(|(x, y)| Coord::new(x, y))
}

fn power() -> impl Strategy<Value = f64> {
    (1u32..10_000).prop_map(|p| f64::from(p) / 10.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// A link is accepted exactly when the target is one of the 8 neighbours.
    #[test]
    fn prop_link_requires_adjacency(source in coord(), target in coord(), p in power()) {
        let mut grid = full_grid(8, 8, 50.0);
        let result = grid.link(source, target, p);
        prop_assert_eq!(result.is_ok(), source.is_neighbour(target));
        if result.is_err() {
            prop_assert_eq!(grid.link_count(), 0);
        }
    }

    /// Linking twice in the same direction adds the powers.
    #[test]
    fn prop_link_consolidates(p in power(), q in power()) {
        let mut grid = full_grid(3, 3, 50.0);
        let (a, b) = (Coord::new(2, 2), Coord::new(3, 2));
        grid.link(a, b, p).unwrap();
        let outcome = grid.link(a, b, q).unwrap();
        prop_assert!(matches!(outcome, LinkOutcome::Consolidated { .. }), "expected Consolidated, got {:?}", outcome);
        let total = grid.link_power(a, b).unwrap();
        prop_assert!((total - (p + q)).abs() < 1e-9);
        prop_assert_eq!(grid.link_count(), 1);
    }

    /// A counter-link between same-owner nodes nets against the existing one.
    #[test]
    fn prop_link_conflict_nets(q in power(), p in power()) {
        let mut grid = full_grid(3, 3, 50.0);
        let (a, b) = (Coord::new(1, 1), Coord::new(2, 2));
        for c in [a, b] {
            grid.get_mut(c).unwrap().owner = Some(1);
        }

        grid.link(a, b, q).unwrap();
        grid.link(b, a, p).unwrap();

        if p < q {
            let left = grid.link_power(a, b).unwrap();
            prop_assert!((left - (q - p)).abs() < 1e-9);
            prop_assert_eq!(grid.link_power(b, a), None);
        } else {
            prop_assert_eq!(grid.link_power(a, b), None);
            match grid.link_power(b, a) {
                Some(forward) => prop_assert!((forward - (p - q)).abs() < 1e-9),
                None => prop_assert!((p - q).abs() < 1e-9),
            }
        }
        prop_assert!(grid.link_count() <= 1);
    }

    /// Generated nodes never start with negative power and stay inside the grid.
    #[test]
    fn prop_generation_non_negative(
        seed in any::<u64>(),
        width in 4u16..24,
        height in 4u16..24,
        highpower in 0.0f64..0.5,
    ) {
        let config = GenerationConfig {
            nonode_prob: 0.05,
            highpower_prob: highpower,
            neutral_cores: 0,
            ..GenerationConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = generate_grid(width, height, &config, &mut rng).unwrap();
        for node in grid.nodes() {
            prop_assert!(node.power >= 0.0);
            prop_assert!(node.owner.is_none());
            prop_assert!(node.coord.x >= 1 && node.coord.x <= width);
            prop_assert!(node.coord.y >= 1 && node.coord.y <= height);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Each completed barrier advances the tick by exactly one, and the
    /// sustain cascade applies at most three downgrades per node.
    #[test]
    fn prop_tick_monotonic_and_cascade_bounded(
        seed in any::<u64>(),
        links in prop::collection::vec((0usize..64, 0u8..8, power()), 0..40),
        ticks in 1u32..8,
    ) {
        let config = GenerationConfig {
            nonode_prob: 0.0,
            ..GenerationConfig::default()
        };
        let mut game = Game::create("prop", 8, 8, &config, seed).unwrap();
        game.join("alice").unwrap();
        game.join("bob").unwrap();

        for _ in 0..ticks {
            if game.is_over() {
                break;
            }
            for &(idx, dir, p) in &links {
                let owned: Vec<_> = game.grid.owned_by(1).map(|n| n.coord).collect();
                let Some(&source) = owned.get(idx % owned.len().max(1)) else {
                    break;
                };
                let Some(target) = source.around(1, 8, 8).nth(usize::from(dir)) else {
                    continue;
                };
                let _ = game.submit("alice", &Command::Link { source, target, power: p });
            }

            let nodes = game.grid.node_count();
            let before = game.tick();
            let mut reports = Vec::new();
            for name in ["alice", "bob"] {
                if let Ok(CommandOutcome::Advanced { report }) = game.submit(name, &Command::Done) {
                    reports.push(report);
                }
            }

            prop_assert_eq!(reports.len(), 1);
            for report in &reports {
                prop_assert_eq!(report.tick, before + 1);
                prop_assert!(report.downgrades <= nodes * 3);
            }
            prop_assert_eq!(game.tick(), before + 1);
            prop_assert!(check_invariants(&game).is_empty());
        }
    }
}
