//! Player-issued mutations of the node/link model.
//!
//! Each operation validates fully before touching the grid, so a failed
//! call leaves no trace.

use serde::Serialize;
use tracing::debug;

use crate::error::{GameError, GameResult};
use crate::game::{Coord, EventKind, Grid, NodeKind};

/// What [`Grid::link`] did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// A new link was created.
    Created {
        /// Power of the new link.
        power: f64,
    },
    /// Power was added to an existing link in the same direction.
    Consolidated {
        /// Total power of the link afterwards.
        power: f64,
    },
    /// The opposing reverse link absorbed all of the new power.
    Reduced {
        /// Power left on the reverse link.
        remaining: f64,
    },
    /// The opposing reverse link was deleted.
    Reversed {
        /// Power of the forward link created from the remainder, if any.
        forward: Option<f64>,
    },
}

impl Grid {
    /// Link `source` to `target` with `power`.
    ///
    /// Existing links in the same direction are consolidated. A reverse
    /// link from a node with the same owner is netted against the new
    /// power: a smaller amount only shrinks it, an equal or larger one
    /// deletes it and keeps the remainder as a fresh forward link.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoNode`] if either endpoint is empty,
    /// [`GameError::InvalidArgument`] for non-positive or non-finite power,
    /// and [`GameError::NonNeighbourLink`] if `target` is `source` or not
    /// 8-adjacent to it.
    pub fn link(&mut self, source: Coord, target: Coord, power: f64) -> GameResult<LinkOutcome> {
        let Some(source_owner) = self.get(source).map(|node| node.owner) else {
            return Err(GameError::NoNode(source));
        };
        let Some(target_owner) = self.get(target).map(|node| node.owner) else {
            return Err(GameError::NoNode(target));
        };
        if !power.is_finite() || power <= 0.0 {
            return Err(GameError::InvalidArgument {
                name: "power",
                reason: format!("must be a positive number, got {power}"),
            });
        }
        if !source.is_neighbour(target) {
            return Err(GameError::NonNeighbourLink {
                from: source,
                to: target,
            });
        }

        if let Some(existing) = self.link_power(source, target) {
            let total = existing + power;
            self.set_link_power(source, target, total);
            if let Some(node) = self.get_mut(target) {
                node.record_event(EventKind::PowerIncrease);
            }
            debug!(%source, %target, power = total, "link consolidated");
            return Ok(LinkOutcome::Consolidated { power: total });
        }

        if let Some(reverse) = self.link_power(target, source)
            && target_owner == source_owner
        {
            if power < reverse {
                let remaining = reverse - power;
                self.set_link_power(target, source, remaining);
                if let Some(node) = self.get_mut(source) {
                    node.record_event(EventKind::PowerDecrease);
                }
                debug!(%source, %target, remaining, "reverse link reduced");
                return Ok(LinkOutcome::Reduced { remaining });
            }

            self.remove_link(target, source);
            let remainder = power - reverse;
            let forward = if remainder > 0.0 {
                self.insert_link(source, target, remainder);
                Some(remainder)
            } else {
                None
            };
            debug!(%source, %target, ?forward, "reverse link replaced");
            return Ok(LinkOutcome::Reversed { forward });
        }

        self.insert_link(source, target, power);
        debug!(%source, %target, power, "link created");
        Ok(LinkOutcome::Created { power })
    }

    /// Cloak a node.
    ///
    /// Cloaking an already hidden node is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoNode`] for an empty cell and
    /// [`GameError::NotEnoughPower`] unless energy stays positive after
    /// paying the cloak's extra consumption.
    pub fn hide(&mut self, coord: Coord) -> GameResult<()> {
        let Some(node) = self.get(coord) else {
            return Err(GameError::NoNode(coord));
        };
        if node.hidden {
            return Ok(());
        }

        let projected = self.energy(node) - node.node_type().consumption;
        if projected <= 0.0 {
            return Err(GameError::NotEnoughPower {
                coord,
                kind: node.kind,
                projected,
            });
        }

        if let Some(node) = self.get_mut(coord) {
            node.hidden = true;
        }
        debug!(%coord, "node cloaked");
        Ok(())
    }

    /// Start specializing a node into `kind`.
    ///
    /// The node runs as `kind` immediately but counts as specializing
    /// (resistance 1, vision 1) until `tick + build_duration`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoNode`] for an empty cell and
    /// [`GameError::NotEnoughPower`] unless the projected energy under
    /// the new type stays positive.
    pub fn specialize(&mut self, coord: Coord, kind: NodeKind, tick: u32) -> GameResult<()> {
        let Some(node) = self.get(coord) else {
            return Err(GameError::NoNode(coord));
        };

        let projected = self.projected_energy(node, kind);
        if projected <= 0.0 {
            return Err(GameError::NotEnoughPower {
                coord,
                kind,
                projected,
            });
        }

        if let Some(node) = self.get_mut(coord) {
            node.kind = kind;
            node.build_time = tick + kind.spec().build_duration;
        }
        debug!(%coord, %kind, ready = tick + kind.spec().build_duration, "specializing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Node;

    fn grid_3x3(owner: Option<u8>, power: f64) -> Grid {
        let mut grid = Grid::new(3, 3).unwrap();
        for x in 1..=3 {
            for y in 1..=3 {
                let mut node = Node::new(Coord::new(x, y), NodeKind::Unspecialized, power);
                node.owner = owner;
                grid.place(node);
            }
        }
        grid
    }

    const A: Coord = Coord::new(1, 1);
    const B: Coord = Coord::new(2, 2);

    #[test]
    fn test_link_rejects_self_and_far_targets() {
        let mut grid = grid_3x3(Some(1), 100.0);
        assert!(matches!(
            grid.link(A, A, 5.0),
            Err(GameError::NonNeighbourLink { .. })
        ));
        assert!(matches!(
            grid.link(A, Coord::new(3, 3), 5.0),
            Err(GameError::NonNeighbourLink { .. })
        ));
        assert_eq!(grid.link_count(), 0);
    }

    #[test]
    fn test_link_rejects_missing_nodes_and_bad_power() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.place(Node::new(A, NodeKind::Unspecialized, 10.0));
        assert_eq!(grid.link(A, B, 5.0), Err(GameError::NoNode(B)));

        let mut grid = grid_3x3(Some(1), 100.0);
        assert!(matches!(
            grid.link(A, B, 0.0),
            Err(GameError::InvalidArgument { name: "power", .. })
        ));
        assert!(matches!(
            grid.link(A, B, f64::NAN),
            Err(GameError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_link_consolidates() {
        let mut grid = grid_3x3(Some(1), 100.0);
        assert_eq!(grid.link(A, B, 5.0), Ok(LinkOutcome::Created { power: 5.0 }));
        assert_eq!(
            grid.link(A, B, 7.0),
            Ok(LinkOutcome::Consolidated { power: 12.0 })
        );
        assert_eq!(grid.outlinks(A).count(), 1);
        assert_eq!(grid.link_power(A, B), Some(12.0));
        assert_eq!(
            grid.get(B).unwrap().last_event(),
            Some(EventKind::PowerIncrease)
        );
    }

    #[test]
    fn test_link_smaller_reverse_is_reduced() {
        let mut grid = grid_3x3(Some(1), 100.0);
        grid.link(B, A, 10.0).unwrap();
        assert_eq!(
            grid.link(A, B, 4.0),
            Ok(LinkOutcome::Reduced { remaining: 6.0 })
        );
        assert_eq!(grid.link_power(B, A), Some(6.0));
        assert_eq!(grid.link_power(A, B), None);
        assert_eq!(grid.get(A).unwrap().last_event(), Some(EventKind::PowerDecrease));
    }

    #[test]
    fn test_link_larger_reverse_flips() {
        let mut grid = grid_3x3(Some(1), 100.0);
        grid.link(B, A, 10.0).unwrap();
        assert_eq!(
            grid.link(A, B, 15.0),
            Ok(LinkOutcome::Reversed { forward: Some(5.0) })
        );
        assert_eq!(grid.link_power(B, A), None);
        assert_eq!(grid.link_power(A, B), Some(5.0));
        assert_eq!(grid.inlinks(A).count(), 0);
    }

    #[test]
    fn test_link_equal_reverse_cancels() {
        let mut grid = grid_3x3(Some(1), 100.0);
        grid.link(B, A, 10.0).unwrap();
        assert_eq!(
            grid.link(A, B, 10.0),
            Ok(LinkOutcome::Reversed { forward: None })
        );
        assert_eq!(grid.link_count(), 0);
    }

    #[test]
    fn test_link_enemy_reverse_coexists() {
        let mut grid = grid_3x3(Some(1), 100.0);
        grid.get_mut(B).unwrap().owner = Some(2);
        grid.link(B, A, 10.0).unwrap();
        assert_eq!(grid.link(A, B, 4.0), Ok(LinkOutcome::Created { power: 4.0 }));
        assert_eq!(grid.link_count(), 2);
    }

    #[test]
    fn test_hide_requires_power() {
        let mut grid = grid_3x3(Some(1), 15.0);
        let err = grid.hide(A).unwrap_err();
        assert!(matches!(err, GameError::NotEnoughPower { .. }));
        assert!(!grid.get(A).unwrap().hidden);

        let mut grid = grid_3x3(Some(1), 25.0);
        grid.hide(A).unwrap();
        assert!(grid.get(A).unwrap().hidden);
        let node = grid.get(A).unwrap();
        assert!(grid.energy(node) > 0.0);
    }

    #[test]
    fn test_specialize_sets_build_time() {
        let mut grid = grid_3x3(Some(1), 100.0);
        grid.specialize(A, NodeKind::Shield, 4).unwrap();
        let node = grid.get(A).unwrap();
        assert_eq!(node.kind, NodeKind::Shield);
        assert_eq!(node.build_time, 6);
        assert!(node.is_specializing(5));
    }

    #[test]
    fn test_specialize_requires_power() {
        let mut grid = grid_3x3(Some(1), 100.0);
        let err = grid.specialize(A, NodeKind::Core, 0).unwrap_err();
        assert!(matches!(
            err,
            GameError::NotEnoughPower {
                kind: NodeKind::Core,
                ..
            }
        ));
        assert_eq!(grid.get(A).unwrap().kind, NodeKind::Unspecialized);
    }
}
