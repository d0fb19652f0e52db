#![no_main]

//! Tick pass fuzzer.
//!
//! Builds a small hand-made grid with arbitrary powers, kinds, owners
//! and links, then runs several ticks and checks the invariants after
//! each one.

use arbitrary::Arbitrary;
use battlenode::game::{Coord, Game, Grid, Node, NodeKind, check_invariants};
use libfuzzer_sys::fuzz_target;

const SIZE: u16 = 6;

/// A fuzzer-generated cell.
#[derive(Arbitrary, Debug)]
struct Cell {
    present: bool,
    power: u16,
    kind: u8,
    owner: u8,
    hidden: bool,
}

/// A fuzzer-generated link.
#[derive(Arbitrary, Debug)]
struct RawLink {
    source: (u8, u8),
    direction: u8,
    power: u16,
}

#[derive(Arbitrary, Debug)]
struct TickInput {
    cells: Vec<Cell>,
    links: Vec<RawLink>,
    ticks: u8,
}

fuzz_target!(|input: TickInput| {
    let Some(mut grid) = Grid::new(SIZE, SIZE) else {
        return;
    };
    for (i, cell) in input.cells.iter().take(usize::from(SIZE * SIZE)).enumerate() {
        if !cell.present {
            continue;
        }
        let x = u16::try_from(i).unwrap_or(0) % SIZE + 1;
        let y = u16::try_from(i).unwrap_or(0) / SIZE + 1;
        let kind = NodeKind::ALL[usize::from(cell.kind) % NodeKind::ALL.len()];
        let mut node = Node::new(Coord::new(x, y), kind, f64::from(cell.power));
        node.hidden = cell.hidden;
        grid.place(node);
    }

    let mut game = Game::from_grid("fuzz", grid, 0);
    let cores: Vec<Coord> = game.grid.nodes().map(|n| n.coord).take(2).collect();
    for (i, core) in cores.iter().enumerate() {
        if game.join_at(&format!("p{i}"), *core, 2000.0).is_err() {
            return;
        }
    }

    // Hand out the remaining nodes.
    let coords = game.grid.coords();
    for (coord, cell) in coords.iter().zip(&input.cells) {
        if cores.contains(coord) {
            continue;
        }
        let owner = cell.owner % 3;
        if let Some(node) = game.grid.get_mut(*coord) {
            node.owner = (owner > 0 && usize::from(owner) <= cores.len()).then_some(owner);
        }
    }

    for raw in input.links.iter().take(64) {
        let source = Coord::new(
            u16::from(raw.source.0) % SIZE + 1,
            u16::from(raw.source.1) % SIZE + 1,
        );
        if let Some(target) = source.around(1, SIZE, SIZE).nth(usize::from(raw.direction % 8)) {
            let _ = game.grid.link(source, target, f64::from(raw.power) + 1.0);
        }
    }

    for _ in 0..(input.ticks % 8) {
        for player in game.players.iter_mut().filter(|p| p.is_active()) {
            player.submit_turn();
        }
        if game.advance().is_err() {
            break;
        }
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }
});
