//! Energy and strength of nodes.
//!
//! Energy is a node's net power: subgrid power, minus consumption, minus
//! what it sends out, plus what it receives from friendly or collaborator
//! sources. Strength is the defensive value an attacker has to exceed.

use crate::game::{Grid, Link, Node, NodeKind, PlayerId};

impl Grid {
    /// Whether `link` moves power between networks rather than attacking.
    ///
    /// A link belongs to its source's owner. It transfers power when that
    /// owner matches `owner` or when the source is a collaborator.
    fn transfers_power(&self, link: &Link, owner: Option<PlayerId>) -> bool {
        self.get(link.source)
            .is_some_and(|source| source.owner == owner || source.kind == NodeKind::Collaborator)
    }

    /// Net energy of a node.
    #[must_use]
    pub fn energy(&self, node: &Node) -> f64 {
        let mut energy = node.power - node.consumption();

        for link in self.outlinks(node.coord) {
            if self.transfers_power(&link, node.owner) {
                energy -= link.power;
            }
        }
        for link in self.inlinks(node.coord) {
            if self.transfers_power(&link, node.owner) {
                energy += link.power;
            }
        }

        energy
    }

    /// Energy the node would have running as `kind` instead of its current type.
    #[must_use]
    pub fn projected_energy(&self, node: &Node, kind: NodeKind) -> f64 {
        let cloak = if node.hidden { 2.0 } else { 1.0 };
        self.energy(node) + node.consumption() - kind.spec().consumption * cloak
    }

    /// Resistance factor of a node at `tick`.
    ///
    /// Starts from the archetype's resistance and applies, once each:
    /// the sabotage modifier if an enemy sabotage node is linked to,
    /// the attack modifier if an enemy attack node links in, and the
    /// core modifier if a friendly core links in. Nodes still
    /// specializing confer no modifier.
    #[must_use]
    pub fn resistance(&self, node: &Node, tick: u32) -> f64 {
        let mut resistance = node.node_type().resistance;

        let sabotaged = self.outlinks(node.coord).any(|link| {
            self.get(link.target).is_some_and(|target| {
                target.kind == NodeKind::Sabotage
                    && target.owner != node.owner
                    && !target.is_specializing(tick)
            })
        });
        if sabotaged {
            resistance *= NodeKind::Sabotage.spec().resistance_modifier;
        }

        let mut attacked = false;
        let mut reinforced = false;
        for link in self.inlinks(node.coord) {
            let Some(source) = self.get(link.source) else {
                continue;
            };
            if source.is_specializing(tick) {
                continue;
            }
            match source.kind {
                NodeKind::Attack if source.owner != node.owner => attacked = true,
                NodeKind::Core if source.owner == node.owner => reinforced = true,
                _ => {}
            }
        }
        if attacked {
            resistance *= NodeKind::Attack.spec().resistance_modifier;
        }
        if reinforced {
            resistance *= NodeKind::Core.spec().resistance_modifier;
        }

        resistance
    }

    /// Defensive strength of a node at `tick`.
    ///
    /// While specializing the node has no resistance bonus and its
    /// strength is its raw energy.
    #[must_use]
    pub fn strength(&self, node: &Node, tick: u32) -> f64 {
        let energy = self.energy(node);
        if node.is_specializing(tick) {
            return energy;
        }
        energy * self.resistance(node, tick)
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{Coord, Grid, Node, NodeKind};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn grid_with(nodes: &[(u16, u16, NodeKind, f64, Option<u8>)]) -> Grid {
        let mut grid = Grid::new(5, 5).unwrap();
        for &(x, y, kind, power, owner) in nodes {
            let mut node = Node::new(Coord::new(x, y), kind, power);
            node.owner = owner;
            grid.place(node);
        }
        grid
    }

    #[test]
    fn test_energy_basic() {
        let grid = grid_with(&[(2, 2, NodeKind::Unspecialized, 50.0, Some(1))]);
        let node = grid.get(Coord::new(2, 2)).unwrap();
        assert!(approx(grid.energy(node), 40.0));
    }

    #[test]
    fn test_energy_cloak_doubles_consumption() {
        let mut grid = grid_with(&[(2, 2, NodeKind::Shield, 200.0, Some(1))]);
        grid.get_mut(Coord::new(2, 2)).unwrap().hidden = true;
        let node = grid.get(Coord::new(2, 2)).unwrap();
        assert!(approx(grid.energy(node), 100.0));
    }

    #[test]
    fn test_energy_friendly_transfer() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Unspecialized, 100.0, Some(1)),
            (2, 3, NodeKind::Unspecialized, 20.0, Some(1)),
        ]);
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 30.0);

        let source = grid.get(Coord::new(2, 2)).unwrap();
        let target = grid.get(Coord::new(2, 3)).unwrap();
        assert!(approx(grid.energy(source), 60.0));
        assert!(approx(grid.energy(target), 40.0));
    }

    #[test]
    fn test_energy_attack_costs_attacker_only() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Unspecialized, 100.0, Some(1)),
            (2, 3, NodeKind::Unspecialized, 20.0, Some(2)),
        ]);
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 30.0);

        let source = grid.get(Coord::new(2, 2)).unwrap();
        let target = grid.get(Coord::new(2, 3)).unwrap();
        assert!(approx(grid.energy(source), 60.0));
        assert!(approx(grid.energy(target), 10.0));
    }

    #[test]
    fn test_energy_collaborator_feeds_enemy() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Collaborator, 500.0, Some(1)),
            (2, 3, NodeKind::Unspecialized, 20.0, Some(2)),
        ]);
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 30.0);

        let target = grid.get(Coord::new(2, 3)).unwrap();
        assert!(approx(grid.energy(target), 40.0));
    }

    #[test]
    fn test_projected_energy() {
        let grid = grid_with(&[(2, 2, NodeKind::Unspecialized, 100.0, Some(1))]);
        let node = grid.get(Coord::new(2, 2)).unwrap();
        assert!(approx(grid.projected_energy(node, NodeKind::Shield), 50.0));
        assert!(approx(grid.projected_energy(node, NodeKind::Sabotage), -100.0));
    }

    #[test]
    fn test_strength_uses_resistance() {
        let grid = grid_with(&[(2, 2, NodeKind::Shield, 150.0, Some(1))]);
        let node = grid.get(Coord::new(2, 2)).unwrap();
        assert!(approx(grid.strength(node, 0), 500.0));
    }

    #[test]
    fn test_strength_while_specializing_is_energy() {
        let mut grid = grid_with(&[(2, 2, NodeKind::Shield, 150.0, Some(1))]);
        grid.get_mut(Coord::new(2, 2)).unwrap().build_time = 3;
        let node = grid.get(Coord::new(2, 2)).unwrap();
        assert!(approx(grid.strength(node, 1), 100.0));
        assert!(approx(grid.strength(node, 3), 500.0));
    }

    #[test]
    fn test_friendly_core_doubles_resistance() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Core, 2000.0, Some(1)),
            (2, 3, NodeKind::Unspecialized, 50.0, Some(1)),
        ]);
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 10.0);
        let node = grid.get(Coord::new(2, 3)).unwrap();
        assert!(approx(grid.resistance(node, 0), 2.0));
        assert!(approx(grid.strength(node, 0), 100.0));
    }

    #[test]
    fn test_enemy_attack_node_halves_resistance() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Attack, 500.0, Some(2)),
            (2, 3, NodeKind::Shield, 150.0, Some(1)),
        ]);
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 10.0);
        let node = grid.get(Coord::new(2, 3)).unwrap();
        assert!(approx(grid.resistance(node, 0), 2.5));
    }

    #[test]
    fn test_linking_into_enemy_sabotage_halves_resistance() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Shield, 500.0, Some(1)),
            (2, 3, NodeKind::Sabotage, 500.0, Some(2)),
        ]);
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 10.0);
        let node = grid.get(Coord::new(2, 2)).unwrap();
        assert!(approx(grid.resistance(node, 0), 2.5));
    }

    #[test]
    fn test_specializing_source_confers_nothing() {
        let mut grid = grid_with(&[
            (2, 2, NodeKind::Attack, 500.0, Some(2)),
            (2, 3, NodeKind::Shield, 150.0, Some(1)),
        ]);
        grid.get_mut(Coord::new(2, 2)).unwrap().build_time = 2;
        grid.insert_link(Coord::new(2, 2), Coord::new(2, 3), 10.0);
        let node = grid.get(Coord::new(2, 3)).unwrap();
        assert!(approx(grid.resistance(node, 0), 5.0));
    }
}
