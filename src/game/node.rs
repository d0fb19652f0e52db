//! Nodes and the directed power links between them.

use serde::Serialize;

use crate::game::{Coord, EventKind, NodeKind, NodeType, PlayerId};

/// A directed, power-carrying edge between two 8-adjacent nodes.
///
/// Equality compares source, target and power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    /// Node the power flows from.
    pub source: Coord,
    /// Node the power flows into.
    pub target: Coord,
    /// Power carried by the link.
    pub power: f64,
}

impl Link {
    /// Create a link value.
    #[must_use]
    pub const fn new(source: Coord, target: Coord, power: f64) -> Self {
        Self {
            source,
            target,
            power,
        }
    }
}

/// A populated grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position on the grid (fixed).
    pub coord: Coord,
    /// Current archetype.
    pub kind: NodeKind,
    /// Subgrid power; negative only after corruption.
    pub power: f64,
    /// Owning player, if any.
    pub owner: Option<PlayerId>,
    /// Tick at which a pending specialization completes.
    pub build_time: u32,
    /// Whether the node is cloaked.
    pub hidden: bool,
    /// Set once corruption has poisoned this node's subgrid.
    pub corrupted: bool,
    /// Targets of outgoing links, in creation order.
    pub(crate) outlinks: Vec<Coord>,
    /// Sources of incoming links, in creation order.
    pub(crate) inlinks: Vec<Coord>,
    /// Most important event tagged since the last tick began.
    last_event: Option<EventKind>,
}

impl Node {
    /// Create an unowned, fully built, visible node.
    #[must_use]
    pub const fn new(coord: Coord, kind: NodeKind, power: f64) -> Self {
        Self {
            coord,
            kind,
            power,
            owner: None,
            build_time: 0,
            hidden: false,
            corrupted: false,
            outlinks: Vec::new(),
            inlinks: Vec::new(),
            last_event: None,
        }
    }

    /// Catalog stats of the current archetype.
    #[must_use]
    pub fn node_type(&self) -> &'static NodeType {
        self.kind.spec()
    }

    /// Power consumed per tick, doubled while cloaked.
    #[must_use]
    pub fn consumption(&self) -> f64 {
        let base = self.node_type().consumption;
        if self.hidden { base * 2.0 } else { base }
    }

    /// Whether a specialization is still being built at `tick`.
    #[must_use]
    pub const fn is_specializing(&self, tick: u32) -> bool {
        self.build_time > tick
    }

    /// Vision radius at `tick`; 1 while specializing.
    #[must_use]
    pub fn vision(&self, tick: u32) -> u16 {
        if self.is_specializing(tick) {
            1
        } else {
            self.node_type().vision
        }
    }

    /// Tag an event, keeping the most important one.
    pub fn record_event(&mut self, event: EventKind) {
        if event.supersedes(self.last_event) {
            self.last_event = Some(event);
        }
    }

    /// The most important event tagged since the last tick began.
    #[must_use]
    pub const fn last_event(&self) -> Option<EventKind> {
        self.last_event
    }

    /// Forget the last event.
    pub fn clear_event(&mut self) {
        self.last_event = None;
    }

    /// Targets of outgoing links, in creation order.
    #[must_use]
    pub fn outlink_targets(&self) -> &[Coord] {
        &self.outlinks
    }

    /// Sources of incoming links, in creation order.
    #[must_use]
    pub fn inlink_sources(&self) -> &[Coord] {
        &self.inlinks
    }
}
