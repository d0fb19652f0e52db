//! Grid coordinates and node storage.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Link, Node, NodeKind, PlayerId};

/// A 1-based coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column), starting at 1.
    pub x: u16,
    /// Y coordinate (row), starting at 1.
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance between two coordinates.
    #[must_use]
    pub const fn distance(self, other: Coord) -> u16 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Whether `other` lies in the 8-neighbourhood of `self` (and is not `self`).
    #[must_use]
    pub const fn is_neighbour(self, other: Coord) -> bool {
        self.distance(other) == 1
    }

    /// Coordinates within `radius` (Chebyshev) of `self`, excluding `self`,
    /// clipped to a `width` x `height` grid.
    pub fn around(self, radius: u16, width: u16, height: u16) -> impl Iterator<Item = Coord> {
        let min_x = self.x.saturating_sub(radius).max(1);
        let max_x = self.x.saturating_add(radius).min(width);
        let min_y = self.y.saturating_sub(radius).max(1);
        let max_y = self.y.saturating_add(radius).min(height);

        (min_x..=max_x)
            .flat_map(move |x| (min_y..=max_y).map(move |y| Coord::new(x, y)))
            .filter(move |&coord| coord != self)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The game grid.
///
/// Cells are stored column-major so that iteration visits nodes in the
/// order x = 1..=width, then y = 1..=height. Empty cells stay empty for
/// the lifetime of the grid.
///
/// Links are indexed by `(source, target)`; each node keeps the ordered
/// coordinates of its outgoing targets and incoming sources.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width of the grid in cells.
    width: u16,
    /// Height of the grid in cells.
    height: u16,
    /// Node slots; `None` marks an empty cell.
    cells: Vec<Option<Node>>,
    /// Link power by `(source, target)`.
    links: HashMap<(Coord, Coord), f64>,
}

impl Grid {
    /// Create an empty grid with no nodes.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            cells: vec![None; size],
            links: HashMap::new(),
        })
    }

    /// Width of the grid.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the grid.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Check if a coordinate lies within `[1, width] x [1, height]`.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 1 && coord.y >= 1 && coord.x <= self.width && coord.y <= self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.x - 1) * usize::from(self.height) + usize::from(coord.y - 1))
        } else {
            None
        }
    }

    /// Put a node into its cell, replacing whatever was there.
    ///
    /// Returns `false` if the node's coordinate is out of bounds.
    pub fn place(&mut self, node: Node) -> bool {
        if let Some(idx) = self.index(node.coord) {
            self.cells[idx] = Some(node);
            true
        } else {
            false
        }
    }

    /// Get the node at a coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Node> {
        self.index(coord).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Get a mutable reference to the node at a coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Node> {
        self.index(coord).and_then(|idx| self.cells[idx].as_mut())
    }

    /// Whether a node exists at the coordinate.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.get(coord).is_some()
    }

    /// Iterate over all nodes in grid order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.cells.iter().flatten()
    }

    /// Iterate mutably over all nodes in grid order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.cells.iter_mut().flatten()
    }

    /// Coordinates of all nodes in grid order.
    #[must_use]
    pub fn coords(&self) -> Vec<Coord> {
        self.nodes().map(|node| node.coord).collect()
    }

    /// Number of populated cells.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Nodes within `radius` of `coord`, excluding the node at `coord`.
    pub fn neighbours(&self, coord: Coord, radius: u16) -> impl Iterator<Item = &Node> {
        coord
            .around(radius, self.width, self.height)
            .filter_map(|c| self.get(c))
    }

    /// Number of populated cells in the 8-neighbourhood of `coord`.
    #[must_use]
    pub fn populated_neighbours(&self, coord: Coord) -> usize {
        self.neighbours(coord, 1).count()
    }

    /// Nodes owned by a player.
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Node> {
        self.nodes().filter(move |node| node.owner == Some(player))
    }

    /// Number of core nodes owned by a player.
    #[must_use]
    pub fn count_cores(&self, player: PlayerId) -> usize {
        self.owned_by(player)
            .filter(|node| node.kind == NodeKind::Core)
            .count()
    }

    /// Power of the link `source -> target`, if it exists.
    #[must_use]
    pub fn link_power(&self, source: Coord, target: Coord) -> Option<f64> {
        self.links.get(&(source, target)).copied()
    }

    /// Outgoing links of a node, in creation order.
    pub fn outlinks(&self, coord: Coord) -> impl Iterator<Item = Link> + '_ {
        self.get(coord)
            .map(|node| node.outlinks.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&target| {
                self.link_power(coord, target)
                    .map(|power| Link::new(coord, target, power))
            })
    }

    /// Incoming links of a node, in creation order.
    pub fn inlinks(&self, coord: Coord) -> impl Iterator<Item = Link> + '_ {
        self.get(coord)
            .map(|node| node.inlinks.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&source| {
                self.link_power(source, coord)
                    .map(|power| Link::new(source, coord, power))
            })
    }

    /// All links, grouped by source in grid order.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.nodes().flat_map(|node| self.outlinks(node.coord))
    }

    /// Number of links on the grid.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Create a link and append it to both endpoints' edge lists.
    ///
    /// Callers guarantee both endpoints exist and no such link exists yet.
    pub(crate) fn insert_link(&mut self, source: Coord, target: Coord, power: f64) {
        self.links.insert((source, target), power);
        if let Some(node) = self.get_mut(source) {
            node.outlinks.push(target);
        }
        if let Some(node) = self.get_mut(target) {
            node.inlinks.push(source);
        }
    }

    /// Change the power of an existing link.
    pub(crate) fn set_link_power(&mut self, source: Coord, target: Coord, power: f64) {
        if let Some(existing) = self.links.get_mut(&(source, target)) {
            *existing = power;
        }
    }

    /// Delete a link from the index and both endpoints' edge lists.
    pub(crate) fn remove_link(&mut self, source: Coord, target: Coord) {
        self.links.remove(&(source, target));
        if let Some(node) = self.get_mut(source) {
            node.outlinks.retain(|&c| c != target);
        }
        if let Some(node) = self.get_mut(target) {
            node.inlinks.retain(|&c| c != source);
        }
    }
}
