// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Battlenode: a turn-based engine for contesting power-linked nodes on a grid.
//!
//! Players own nodes on a 2D grid and send power along directed links
//! into neighbouring nodes. Links between friends move power; links into
//! foreign nodes attack them. Once per tick the engine resolves every
//! attack, starves nodes that cannot sustain themselves and checks
//! whether a single player holds every core.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / self-play harness (sim)     │
//! ├─────────────────────────────────────┤
//! │   Session: registry, barrier, views │
//! ├─────────────────────────────────────┤
//! │   Game: grid, rules, turn engine    │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod game;
pub mod render;
pub mod session;
pub mod sim;

pub use error::{ErrorKind, GameError, GameOverReason, GameResult};

// Re-export key game types at crate root for convenience
pub use game::{
    Coord, Game, GameStatus, GenerationConfig, Grid, Link, Node, NodeKind, Player, PlayerId,
    TickReport,
};
pub use session::{Command, CommandOutcome, GameRegistry, PROTOCOL_VERSION, Request, Response};
