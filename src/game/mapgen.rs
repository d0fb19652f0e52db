//! Procedural grid generation.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::Exp1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::{Coord, Grid, Node, NodeKind};

/// Populated neighbours a node needs before it can become a core.
pub const CORE_MIN_NEIGHBOURS: usize = 6;

/// Scale of the exponential power distribution.
const POWER_SCALE: f64 = 10.0;

/// Relative chance of a naturally specialized node becoming `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecWeight {
    /// The archetype.
    pub kind: NodeKind,
    /// Cumulative-sampling weight; the weights of a table should not sum past 1.
    pub weight: f64,
}

impl SpecWeight {
    /// Create a weight entry.
    #[must_use]
    pub const fn new(kind: NodeKind, weight: f64) -> Self {
        Self { kind, weight }
    }
}

/// Seed probabilities for [`generate_grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chance that a cell stays empty.
    pub nonode_prob: f64,
    /// Specialization table sampled when a node rolls a natural specialization.
    pub spec_weights: Vec<SpecWeight>,
    /// Chance that an unspecialized node starts cloaked.
    pub hide_prob: f64,
    /// Chance that a naturally specialized node starts cloaked.
    pub hide_prob_spec: f64,
    /// Chance that a node's drawn power is squared.
    pub highpower_prob: f64,
    /// Power given to every promoted core.
    pub begin_power: f64,
    /// Unowned cores placed at generation time.
    pub neutral_cores: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            nonode_prob: 0.16,
            spec_weights: vec![
                SpecWeight::new(NodeKind::Shield, 0.8),
                SpecWeight::new(NodeKind::Sabotage, 0.1),
                SpecWeight::new(NodeKind::Destructor, 0.05),
                SpecWeight::new(NodeKind::Corruption, 0.04),
            ],
            hide_prob: 0.02,
            hide_prob_spec: 0.25,
            highpower_prob: 0.02,
            begin_power: 2000.0,
            neutral_cores: 1,
        }
    }
}

impl GenerationConfig {
    /// Check every probability and weight before generation.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::InvalidProbability`] for a probability outside
    /// `[0, 1]` or a negative weight, and [`MapGenError::InvalidBeginPower`]
    /// unless cores start with enough power to sustain themselves.
    pub fn validate(&self) -> Result<(), MapGenError> {
        let probabilities = [
            ("nonode_prob", self.nonode_prob),
            ("hide_prob", self.hide_prob),
            ("hide_prob_spec", self.hide_prob_spec),
            ("highpower_prob", self.highpower_prob),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(MapGenError::InvalidProbability { name, value });
            }
        }

        for entry in &self.spec_weights {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(MapGenError::InvalidProbability {
                    name: "spec_weights",
                    value: entry.weight,
                });
            }
        }

        if !self.begin_power.is_finite() || self.begin_power <= NodeKind::Core.spec().consumption {
            return Err(MapGenError::InvalidBeginPower(self.begin_power));
        }

        Ok(())
    }

    /// Sample the specialization table with a uniform draw `r` in `[0, 1)`.
    ///
    /// Falls back to [`NodeKind::Unspecialized`] when `r` lands past the
    /// last cumulative weight.
    fn pick_kind(&self, r: f64) -> NodeKind {
        let mut summed = 0.0;
        for entry in &self.spec_weights {
            summed += entry.weight;
            if r < summed {
                return entry.kind;
            }
        }
        NodeKind::Unspecialized
    }
}

/// Errors raised while generating a grid.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MapGenError {
    /// Width or height is zero.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },
    /// A probability or weight is out of range.
    #[error("`{name}` out of range: {value}")]
    InvalidProbability {
        /// Config field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Cores would start with non-positive energy.
    #[error("begin power {0} cannot sustain a core")]
    InvalidBeginPower(f64),
    /// No node qualifies as a starting core.
    #[error("no unspecialized, unowned node has {CORE_MIN_NEIGHBOURS} populated neighbours")]
    NoEligibleCore,
}

/// Populate a `width` x `height` grid and place the configured neutral cores.
///
/// Each cell independently stays empty with `nonode_prob`. Otherwise its
/// power is drawn from an exponential distribution scaled by 10 and
/// squared with `highpower_prob`. A node specializes with probability
/// `1 / power`, sampling `spec_weights`. Cloak rolls use `hide_prob` or
/// `hide_prob_spec`; a cloak the node could not sustain is dropped.
///
/// # Errors
///
/// Returns an error if the config is invalid, the dimensions are zero,
/// or a neutral core cannot be placed.
pub fn generate_grid<R: Rng + ?Sized>(
    width: u16,
    height: u16,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Grid, MapGenError> {
    config.validate()?;
    let mut grid = Grid::new(width, height).ok_or(MapGenError::InvalidDimensions { width, height })?;

    for x in 1..=width {
        for y in 1..=height {
            if rng.gen_bool(config.nonode_prob) {
                continue;
            }
            grid.place(roll_node(Coord::new(x, y), config, rng));
        }
    }

    for _ in 0..config.neutral_cores {
        let coord = select_core(&grid, rng)?;
        promote_core(&mut grid, coord, config.begin_power);
    }

    debug!(
        width,
        height,
        nodes = grid.node_count(),
        cores = config.neutral_cores,
        "grid generated"
    );
    Ok(grid)
}

fn roll_node<R: Rng + ?Sized>(coord: Coord, config: &GenerationConfig, rng: &mut R) -> Node {
    let mut power = rng.sample::<f64, _>(Exp1) * POWER_SCALE;
    if rng.gen_bool(config.highpower_prob) {
        power *= power;
    }

    let mut kind = NodeKind::Unspecialized;
    let mut hidden = rng.gen_bool(config.hide_prob);
    if power > 0.0 && rng.gen_bool((1.0 / power).min(1.0)) {
        kind = config.pick_kind(rng.gen_range(0.0..1.0));
        hidden = rng.gen_bool(config.hide_prob_spec);
    }

    let mut node = Node::new(coord, kind, power);
    node.hidden = hidden && power - 2.0 * kind.spec().consumption > 0.0;
    node
}

/// Pick a starting core location uniformly among eligible nodes.
///
/// Eligible nodes are unspecialized, unowned and have at least
/// [`CORE_MIN_NEIGHBOURS`] populated neighbours.
///
/// # Errors
///
/// Returns [`MapGenError::NoEligibleCore`] if no node qualifies.
pub fn select_core<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Result<Coord, MapGenError> {
    let candidates: Vec<Coord> = grid
        .nodes()
        .filter(|node| {
            node.kind == NodeKind::Unspecialized
                && node.owner.is_none()
                && grid.populated_neighbours(node.coord) >= CORE_MIN_NEIGHBOURS
        })
        .map(|node| node.coord)
        .collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or(MapGenError::NoEligibleCore)
}

/// Turn the node at `coord` into a fully built, visible core with `power`.
pub(crate) fn promote_core(grid: &mut Grid, coord: Coord, power: f64) {
    if let Some(node) = grid.get_mut(coord) {
        node.kind = NodeKind::Core;
        node.power = power;
        node.hidden = false;
        node.build_time = 0;
    }
}
