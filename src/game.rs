//! Game layer for battlenode.
//!
//! Implements the simulation rules:
//! - Static node archetype and event catalogs
//! - Grid of nodes joined by directed power links
//! - Energy, strength and player-issued link/hide/specialize operations
//! - Procedural grid generation
//! - The per-tick Turn Engine and debug invariant checks

mod actions;
mod event;
mod grid;
mod invariants;
mod mapgen;
mod node;
mod node_type;
mod player;
mod power;
mod state;
mod turn;

pub use actions::LinkOutcome;
pub use event::{EVENTS, Event, EventKind, NO_EVENT_PRIORITY};
pub use grid::{Coord, Grid};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use mapgen::{
    CORE_MIN_NEIGHBOURS, GenerationConfig, MapGenError, SpecWeight, generate_grid, select_core,
};
pub use node::{Link, Node};
pub use node_type::{NODE_TYPES, NodeKind, NodeType};
pub use player::{Player, PlayerId};
pub use state::{Game, GameStatus, MAX_PLAYERS};
pub use turn::{Assimilation, TickReport};
