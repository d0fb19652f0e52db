//! ASCII renderer for terminal viewing with optional ANSI colors.

use std::fmt::Write;

use crate::game::{Coord, Game, GameStatus, Node, NodeKind, PlayerId};

/// ANSI color codes for players, cycled past the eighth player.
const PLAYER_COLORS: [&str; 8] = [
    "\x1b[31m", // Player 1: Red
    "\x1b[34m", // Player 2: Blue
    "\x1b[32m", // Player 3: Green
    "\x1b[33m", // Player 4: Yellow
    "\x1b[35m", // Player 5: Magenta
    "\x1b[36m", // Player 6: Cyan
    "\x1b[91m", // Player 7: Bright Red
    "\x1b[94m", // Player 8: Bright Blue
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GRAY: &str = "\x1b[90m";

/// Legend line printed under the grid.
const LEGEND: &str = "Legend: o=Plain S=Shield B=Sabotage A=Attack X=Corruption D=Destructor \
                      E=Sensor @=Core C=Collaborator  ~=Hidden  ?=Unseen";

/// Which part of the grid to draw and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Draw only what this player can see.
    pub viewer: Option<PlayerId>,
    /// Emit ANSI color codes.
    pub color: bool,
}

/// Render a game to text.
///
/// Output format:
/// ```text
/// duel  tick 12  running
/// ┌─────────────┐
/// │ o o S ? ? ? │
/// │ o @ A~? ? ? │
/// └─────────────┘
///
/// Legend: ...
///
/// Player 1 (alice): nodes 5  cores 1  power 2140
/// ```
#[must_use]
pub fn render(game: &Game, options: RenderOptions) -> String {
    let mut output = String::new();
    render_header(&mut output, game);
    render_grid(&mut output, game, options);
    let _ = writeln!(output, "\n{LEGEND}\n");
    render_player_stats(&mut output, game, options.color);
    output
}

/// Render the whole grid with colors.
#[must_use]
pub fn render_ascii(game: &Game, viewer: Option<PlayerId>) -> String {
    render(game, RenderOptions { viewer, color: true })
}

fn render_header(output: &mut String, game: &Game) {
    let status = match game.status() {
        GameStatus::Running => "running".to_string(),
        GameStatus::Won { winner } => format!(
            "won by {}",
            game.owner_name(Some(winner)).unwrap_or("unknown")
        ),
        GameStatus::Draw => "draw".to_string(),
    };
    let _ = writeln!(output, "{}  tick {}  {status}", game.name(), game.tick());
}

fn render_grid(output: &mut String, game: &Game, options: RenderOptions) {
    let width = game.grid.width();
    let height = game.grid.height();
    let visible = options.viewer.map(|id| game.perspective(id));

    let border = "─".repeat(usize::from(width) * 2 + 1);
    let _ = writeln!(output, "┌{border}┐");
    for y in 1..=height {
        output.push_str("│ ");
        for x in 1..=width {
            let coord = Coord::new(x, y);
            let seen = visible.as_ref().is_none_or(|coords| coords.contains(&coord));
            if seen {
                render_cell(output, game.grid.get(coord), options.color);
            } else {
                push_colored(output, "? ", GRAY, options.color);
            }
        }
        output.push_str("│\n");
    }
    let _ = writeln!(output, "└{border}┘");
}

fn render_cell(output: &mut String, node: Option<&Node>, color: bool) {
    let Some(node) = node else {
        output.push_str("  ");
        return;
    };

    let cloak = if node.hidden { '~' } else { ' ' };
    let cell = format!("{}{cloak}", kind_symbol(node.kind));
    match node.owner {
        Some(owner) if node.kind == NodeKind::Core => {
            let style = format!("{BOLD}{}", player_color(owner));
            push_colored(output, &cell, &style, color);
        }
        Some(owner) => push_colored(output, &cell, player_color(owner), color),
        None if node.corrupted => push_colored(output, &cell, DIM, color),
        None => push_colored(output, &cell, GRAY, color),
    }
}

fn push_colored(output: &mut String, text: &str, style: &str, color: bool) {
    if color {
        let _ = write!(output, "{style}{text}{RESET}");
    } else {
        output.push_str(text);
    }
}

/// Grid symbol of an archetype.
const fn kind_symbol(kind: NodeKind) -> char {
    match kind {
        NodeKind::Unspecialized => 'o',
        NodeKind::Shield => 'S',
        NodeKind::Sabotage => 'B',
        NodeKind::Attack => 'A',
        NodeKind::Corruption => 'X',
        NodeKind::Destructor => 'D',
        NodeKind::Sensor => 'E',
        NodeKind::Core => '@',
        NodeKind::Collaborator => 'C',
    }
}

fn player_color(player_id: PlayerId) -> &'static str {
    let idx = usize::from(player_id).saturating_sub(1) % PLAYER_COLORS.len();
    PLAYER_COLORS[idx]
}

fn render_player_stats(output: &mut String, game: &Game, color: bool) {
    for player in &game.players {
        if player.lost {
            let line = format!("Player {} ({}): DEFEATED", player.id, player.name);
            push_colored(output, &line, DIM, color);
            output.push('\n');
            continue;
        }

        let (nodes, power) = game
            .grid
            .owned_by(player.id)
            .fold((0usize, 0.0f64), |(n, p), node| (n + 1, p + node.power));
        let cores = game.grid.count_cores(player.id);
        let mut line = format!(
            "Player {} ({}): nodes {nodes}  cores {cores}  power {power:.0}",
            player.id, player.name
        );
        if player.wins {
            line.push_str("  WINNER");
        }
        push_colored(output, &line, player_color(player.id), color);
        output.push('\n');
    }
}
