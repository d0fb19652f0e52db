//! The per-tick resolution pass.
//!
//! Every node is visited once in grid order. Attack resolution may hand
//! the node to the strongest attacker, then the sustain cascade strips
//! cloak, specialization and finally ownership until the node's energy
//! is positive again. Visibility and the win condition are recomputed
//! after all nodes are done.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GameError, GameResult};
use crate::game::{Coord, EventKind, Game, GameStatus, NodeKind, Player, PlayerId};

/// An ownership change caused by attack resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assimilation {
    /// The node taken over.
    pub coord: Coord,
    /// Previous owner.
    pub from: Option<PlayerId>,
    /// New owner.
    pub to: PlayerId,
    /// Archetype of the node before it was reset.
    pub kind: NodeKind,
    /// Aggregate attack power that won.
    pub attack: f64,
    /// Strength it had to exceed.
    pub strength: f64,
}

/// Summary of one executed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick number after the pass.
    pub tick: u32,
    /// Ownership changes, in grid order.
    pub assimilations: Vec<Assimilation>,
    /// Sustain downgrade steps applied across all nodes.
    pub downgrades: usize,
    /// Players that lost their last core during this tick.
    pub defeated: Vec<PlayerId>,
    /// Game status after the pass.
    pub status: GameStatus,
}

/// One step of the sustain cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Downgrade {
    Uncloak,
    Despecialize,
    Disown,
}

impl Game {
    /// Run one tick over the whole grid.
    ///
    /// Events tagged before the pass are cleared first, so afterwards
    /// each node reports the most important event of this tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the game has already ended.
    pub fn advance(&mut self) -> GameResult<TickReport> {
        if let Some(reason) = self.status.reason() {
            return Err(GameError::GameOver(reason));
        }

        for node in self.grid.nodes_mut() {
            node.clear_event();
        }

        let now = self.tick;
        let mut assimilations = Vec::new();
        let mut downgrades = 0;
        let mut defeated = Vec::new();

        for coord in self.grid.coords() {
            if let Some(assimilation) = self.resolve_attacks(coord, now, &mut defeated) {
                assimilations.push(assimilation);
            }
            downgrades += self.sustain(coord);
        }

        self.tick += 1;
        self.eliminate_coreless(&mut defeated);
        self.refresh_visibility();
        self.check_winner();

        info!(
            game = %self.name(),
            tick = self.tick,
            assimilations = assimilations.len(),
            downgrades,
            "tick advanced"
        );

        Ok(TickReport {
            tick: self.tick,
            assimilations,
            downgrades,
            defeated,
            status: self.status,
        })
    }

    /// Aggregate incoming attacks per owner and assimilate the node if the
    /// strongest attacker beats its strength.
    fn resolve_attacks(
        &mut self,
        coord: Coord,
        tick: u32,
        defeated: &mut Vec<PlayerId>,
    ) -> Option<Assimilation> {
        let node = self.grid.get(coord)?;

        let mut attacks: Vec<(PlayerId, f64)> = Vec::new();
        for link in self.grid.inlinks(coord) {
            let Some(source) = self.grid.get(link.source) else {
                continue;
            };
            if source.kind == NodeKind::Collaborator {
                continue;
            }
            let Some(attacker) = source.owner else {
                continue;
            };
            if node.owner == Some(attacker) {
                continue;
            }
            match attacks.iter_mut().find(|(owner, _)| *owner == attacker) {
                Some((_, total)) => *total += link.power,
                None => attacks.push((attacker, link.power)),
            }
        }

        // Stable sort: ties go to the attacker whose link came first.
        attacks.sort_by(|a, b| b.1.total_cmp(&a.1));
        let &(attacker, attack) = attacks.first()?;
        let strength = self.grid.strength(node, tick);
        if attack <= strength {
            return None;
        }

        let from = node.owner;
        let kind = node.kind;
        self.assimilate(coord, attacker, defeated);
        debug!(%coord, ?from, to = attacker, %kind, attack, strength, "node assimilated");

        Some(Assimilation {
            coord,
            from,
            to: attacker,
            kind,
            attack,
            strength,
        })
    }

    /// Hand the node at `coord` to `attacker` and apply its archetype's
    /// takeover effect.
    fn assimilate(&mut self, coord: Coord, attacker: PlayerId, defeated: &mut Vec<PlayerId>) {
        let Some(node) = self.grid.get_mut(coord) else {
            return;
        };
        let loser = node.owner;
        let kind = node.kind;
        node.record_event(EventKind::AssimilateSuccess);

        match kind {
            NodeKind::Corruption => {
                // Corrupted power never turns positive again.
                if node.power > 0.0 {
                    node.power = -node.power;
                    node.corrupted = true;
                    node.record_event(EventKind::Corruption);
                }
            }
            NodeKind::Destructor => {
                let sources = node.inlink_sources().to_vec();
                for source in sources {
                    if let Some(source) = self.grid.get_mut(source)
                        && source.owner == Some(attacker)
                        && source.kind.is_specialized()
                    {
                        source.kind = NodeKind::Unspecialized;
                        source.record_event(EventKind::Destruction);
                    }
                }
            }
            NodeKind::Core => {
                if let Some(loser) = loser
                    && self.grid.count_cores(loser) <= 1
                {
                    self.defeat(loser, defeated);
                }
            }
            _ => {}
        }

        if let Some(node) = self.grid.get_mut(coord) {
            node.kind = NodeKind::Unspecialized;
            node.hidden = false;
            node.owner = Some(attacker);
        }
    }

    /// Downgrade an owned node until its energy is positive.
    ///
    /// Returns the number of steps taken, at most three.
    fn sustain(&mut self, coord: Coord) -> usize {
        let mut steps = 0;
        loop {
            let Some(node) = self.grid.get(coord) else {
                return steps;
            };
            if node.owner.is_none() || self.grid.energy(node) > 0.0 {
                return steps;
            }

            let step = if node.hidden {
                Downgrade::Uncloak
            } else if node.kind.is_specialized() {
                Downgrade::Despecialize
            } else {
                Downgrade::Disown
            };

            let Some(node) = self.grid.get_mut(coord) else {
                return steps;
            };
            match step {
                Downgrade::Uncloak => {
                    node.hidden = false;
                    node.record_event(EventKind::LostCloak);
                }
                Downgrade::Despecialize => {
                    node.kind = NodeKind::Unspecialized;
                    node.record_event(EventKind::LostSpec);
                }
                Downgrade::Disown => {
                    node.owner = None;
                    node.record_event(EventKind::LostNode);
                }
            }
            debug!(%coord, ?step, "sustain downgrade");
            steps += 1;
        }
    }

    /// Mark a player lost and strip ownership of everything they hold.
    ///
    /// Specializations on the stripped nodes stay in place.
    fn defeat(&mut self, loser: PlayerId, defeated: &mut Vec<PlayerId>) {
        for node in self.grid.nodes_mut() {
            if node.owner == Some(loser) {
                node.owner = None;
            }
        }
        if let Some(player) = self.player_mut(loser) {
            player.eliminate();
            info!(player = %player.name, "player defeated");
        }
        defeated.push(loser);
    }

    /// Defeat active players left without a core, e.g. after starvation.
    fn eliminate_coreless(&mut self, defeated: &mut Vec<PlayerId>) {
        let coreless: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.is_active() && self.grid.count_cores(p.id) == 0)
            .map(|p| p.id)
            .collect();
        for id in coreless {
            self.defeat(id, defeated);
        }
    }

    /// Recompute every owner's visibility set.
    pub(crate) fn refresh_visibility(&mut self) {
        let mut visible: HashMap<PlayerId, BTreeSet<Coord>> = HashMap::new();
        for node in self.grid.nodes() {
            let Some(owner) = node.owner else {
                continue;
            };
            let radius = node.vision(self.tick);
            visible.entry(owner).or_default().extend(
                self.grid
                    .neighbours(node.coord, radius)
                    .filter(|other| other.owner != Some(owner))
                    .map(|other| other.coord),
            );
        }
        self.visible = visible;
    }

    /// End the game if a single player owns every core, or no player
    /// holds a core any more.
    fn check_winner(&mut self) {
        if self.players.is_empty() {
            return;
        }
        if !self.players.iter().any(Player::is_active) {
            self.status = GameStatus::Draw;
            info!(game = %self.name(), tick = self.tick, "every player defeated, draw");
            return;
        }
        if self.players.len() < 2 {
            return;
        }

        let owners: BTreeSet<Option<PlayerId>> = self
            .grid
            .nodes()
            .filter(|node| node.kind == NodeKind::Core)
            .map(|node| node.owner)
            .collect();

        let mut owners = owners.into_iter();
        self.status = match (owners.next(), owners.next()) {
            (None | Some(None), None) => GameStatus::Draw,
            (Some(Some(winner)), None) => {
                if let Some(player) = self.player_mut(winner) {
                    player.wins = true;
                }
                GameStatus::Won { winner }
            }
            _ => return,
        };
        info!(game = %self.name(), tick = self.tick, status = ?self.status, "game over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameOverReason;
    use crate::game::{Grid, Node};
    use crate::session::{Command, CommandOutcome};

    fn open_grid(size: u16, power: f64) -> Grid {
        let mut grid = Grid::new(size, size).unwrap();
        for x in 1..=size {
            for y in 1..=size {
                grid.place(Node::new(Coord::new(x, y), NodeKind::Unspecialized, power));
            }
        }
        grid
    }

    /// Two players with cores at opposite corners of a 6x6 grid.
    fn duel() -> Game {
        let mut game = Game::from_grid("duel", open_grid(6, 100.0), 0);
        game.join_at("alice", Coord::new(1, 1), 2000.0).unwrap();
        game.join_at("bob", Coord::new(6, 6), 2000.0).unwrap();
        game
    }

    fn own(game: &mut Game, coord: Coord, owner: PlayerId) {
        game.grid.get_mut(coord).unwrap().owner = Some(owner);
    }

    #[test]
    fn test_tick_increments_by_one() {
        let mut game = duel();
        for expected in 1..=5 {
            let report = game.advance().unwrap();
            assert_eq!(report.tick, expected);
            assert_eq!(game.tick(), expected);
        }
    }

    #[test]
    fn test_strongest_attacker_assimilates() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        own(&mut game, Coord::new(2, 2), 1);
        game.grid.get_mut(Coord::new(2, 2)).unwrap().power = 1000.0;
        game.grid.link(Coord::new(2, 2), target, 95.0).unwrap();

        // Target strength is 100 - 10 = 90.
        let report = game.advance().unwrap();
        assert_eq!(report.assimilations.len(), 1);
        let node = game.grid.get(target).unwrap();
        assert_eq!(node.owner, Some(1));
        assert_eq!(node.last_event(), Some(EventKind::AssimilateSuccess));
    }

    #[test]
    fn test_weak_attack_fails() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        own(&mut game, Coord::new(2, 2), 1);
        game.grid.link(Coord::new(2, 2), target, 50.0).unwrap();

        let report = game.advance().unwrap();
        assert!(report.assimilations.is_empty());
        assert_eq!(game.grid.get(target).unwrap().owner, Some(2));
    }

    #[test]
    fn test_attacks_from_same_owner_aggregate() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        own(&mut game, Coord::new(2, 2), 1);
        own(&mut game, Coord::new(2, 3), 1);
        game.grid.link(Coord::new(2, 2), target, 50.0).unwrap();
        game.grid.link(Coord::new(2, 3), target, 50.0).unwrap();

        game.advance().unwrap();
        assert_eq!(game.grid.get(target).unwrap().owner, Some(1));
    }

    #[test]
    fn test_collaborator_links_never_attack() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        let source = Coord::new(2, 2);
        own(&mut game, source, 1);
        {
            let node = game.grid.get_mut(source).unwrap();
            node.kind = NodeKind::Collaborator;
            node.power = 1000.0;
        }
        game.grid.link(source, target, 500.0).unwrap();

        game.advance().unwrap();
        assert_eq!(game.grid.get(target).unwrap().owner, Some(2));
    }

    #[test]
    fn test_assimilation_resets_spec_and_cloak() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        {
            let node = game.grid.get_mut(target).unwrap();
            node.kind = NodeKind::Shield;
            node.power = 200.0;
            node.hidden = true;
        }
        own(&mut game, Coord::new(2, 2), 1);
        game.grid.get_mut(Coord::new(2, 2)).unwrap().power = 1000.0;
        game.grid.link(Coord::new(2, 2), target, 600.0).unwrap();

        game.advance().unwrap();
        let node = game.grid.get(target).unwrap();
        assert_eq!(node.owner, Some(1));
        assert_eq!(node.kind, NodeKind::Unspecialized);
        assert!(!node.hidden);
    }

    #[test]
    fn test_corruption_inverts_power_and_drops_node() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        {
            let node = game.grid.get_mut(target).unwrap();
            node.kind = NodeKind::Corruption;
            node.power = 300.0;
        }
        own(&mut game, Coord::new(2, 2), 1);
        game.grid.get_mut(Coord::new(2, 2)).unwrap().power = 1000.0;
        game.grid.link(Coord::new(2, 2), target, 90.0).unwrap();

        // Corruption has resistance 0, any attack wins.
        game.advance().unwrap();
        let node = game.grid.get(target).unwrap();
        assert!(node.power < 0.0);
        assert!(node.corrupted);
        assert_eq!(node.owner, None);
        assert_eq!(node.last_event(), Some(EventKind::Corruption));
    }

    #[test]
    fn test_destructor_reverts_attacker_specializations() {
        let mut game = duel();
        let target = Coord::new(3, 3);
        own(&mut game, target, 2);
        game.grid.get_mut(target).unwrap().kind = NodeKind::Destructor;
        let attacker = Coord::new(2, 2);
        own(&mut game, attacker, 1);
        {
            let node = game.grid.get_mut(attacker).unwrap();
            node.kind = NodeKind::Attack;
            node.power = 5000.0;
        }
        game.grid.link(attacker, target, 1000.0).unwrap();

        game.advance().unwrap();
        assert_eq!(game.grid.get(target).unwrap().owner, Some(1));
        let source = game.grid.get(attacker).unwrap();
        assert_eq!(source.kind, NodeKind::Unspecialized);
        assert_eq!(source.last_event(), Some(EventKind::Destruction));
    }

    #[test]
    fn test_sustain_cascade_runs_all_three_steps() {
        let mut game = duel();
        let coord = Coord::new(3, 3);
        own(&mut game, coord, 1);
        {
            let node = game.grid.get_mut(coord).unwrap();
            node.kind = NodeKind::Shield;
            node.power = 5.0;
            node.hidden = true;
        }

        let report = game.advance().unwrap();
        assert_eq!(report.downgrades, 3);
        let node = game.grid.get(coord).unwrap();
        assert_eq!(node.owner, None);
        assert_eq!(node.kind, NodeKind::Unspecialized);
        assert!(!node.hidden);
        assert_eq!(node.last_event(), Some(EventKind::LostNode));
    }

    #[test]
    fn test_sustain_stops_once_energy_positive() {
        let mut game = duel();
        let coord = Coord::new(3, 3);
        own(&mut game, coord, 1);
        {
            let node = game.grid.get_mut(coord).unwrap();
            node.kind = NodeKind::Shield;
            node.power = 80.0;
            node.hidden = true;
        }

        let report = game.advance().unwrap();
        assert_eq!(report.downgrades, 1);
        let node = game.grid.get(coord).unwrap();
        assert_eq!(node.owner, Some(1));
        assert_eq!(node.kind, NodeKind::Shield);
        assert_eq!(node.last_event(), Some(EventKind::LostCloak));
    }

    #[test]
    fn test_core_capture_defeats_and_wins() {
        let mut game = duel();
        let core = Coord::new(6, 6);
        let attacker = Coord::new(5, 5);
        own(&mut game, attacker, 1);
        own(&mut game, Coord::new(5, 6), 2);
        game.grid.get_mut(attacker).unwrap().power = 50_000.0;
        // Core strength: (2000 - 1000) * 20 = 20000.
        game.grid.link(attacker, core, 25_000.0).unwrap();

        let report = game.advance().unwrap();
        assert_eq!(report.defeated, vec![2]);
        assert_eq!(report.status, GameStatus::Won { winner: 1 });

        assert!(game.player(2).unwrap().lost);
        assert!(game.player(1).unwrap().wins);
        assert_eq!(game.grid.get(Coord::new(5, 6)).unwrap().owner, None);
        assert_eq!(game.grid.get(core).unwrap().kind, NodeKind::Unspecialized);
        assert_eq!(
            game.advance(),
            Err(GameError::GameOver(GameOverReason::Won { winner: 1 }))
        );
        assert_eq!(game.tick(), 1);
    }

    #[test]
    fn test_no_cores_left_is_draw() {
        let mut game = duel();
        for coord in [Coord::new(1, 1), Coord::new(6, 6)] {
            let node = game.grid.get_mut(coord).unwrap();
            node.kind = NodeKind::Unspecialized;
        }

        let report = game.advance().unwrap();
        assert_eq!(report.status, GameStatus::Draw);
        assert_eq!(report.defeated.len(), 2);
    }

    #[test]
    fn test_both_players_starving_is_draw() {
        let mut game = duel();
        {
            let node = game.grid.get_mut(Coord::new(3, 3)).unwrap();
            node.kind = NodeKind::Core;
            node.power = 2000.0;
        }
        for (name, source, target) in [
            ("alice", Coord::new(1, 1), Coord::new(2, 2)),
            ("bob", Coord::new(6, 6), Coord::new(5, 5)),
        ] {
            let link = Command::Link {
                source,
                target,
                power: 1500.0,
            };
            game.submit(name, &link).unwrap();
        }
        game.submit("alice", &Command::Done).unwrap();
        let outcome = game.submit("bob", &Command::Done).unwrap();

        let CommandOutcome::Advanced { report } = outcome else {
            panic!("expected the tick to run");
        };
        assert_eq!(report.defeated, vec![1, 2]);
        assert_eq!(report.status, GameStatus::Draw);
        assert!(game.is_over());
        assert_eq!(
            game.submit("alice", &Command::Done),
            Err(GameError::GameOver(GameOverReason::Draw))
        );
    }

    #[test]
    fn test_lone_player_starving_ends_game() {
        let mut game = Game::from_grid("solo", open_grid(4, 100.0), 0);
        game.join_at("alice", Coord::new(1, 1), 2000.0).unwrap();
        game.grid
            .link(Coord::new(1, 1), Coord::new(2, 2), 1500.0)
            .unwrap();

        let report = game.advance().unwrap();
        assert_eq!(report.defeated, vec![1]);
        assert_eq!(report.status, GameStatus::Draw);
    }

    #[test]
    fn test_neutral_core_blocks_win() {
        let mut game = duel();
        let neutral = Coord::new(3, 3);
        {
            let node = game.grid.get_mut(neutral).unwrap();
            node.kind = NodeKind::Core;
            node.power = 2000.0;
        }
        game.grid.get_mut(Coord::new(6, 6)).unwrap().owner = Some(1);

        let report = game.advance().unwrap();
        assert_eq!(report.status, GameStatus::Running);
    }

    #[test]
    fn test_visibility_excludes_own_nodes() {
        let mut game = duel();
        game.advance().unwrap();
        let seen: Vec<_> = game.visible_to(1).collect();
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&Coord::new(1, 1)));

        own(&mut game, Coord::new(2, 2), 1);
        game.advance().unwrap();
        let seen: Vec<_> = game.visible_to(1).collect();
        assert!(!seen.contains(&Coord::new(2, 2)));
        assert!(seen.contains(&Coord::new(3, 3)));
    }

    #[test]
    fn test_events_cleared_each_tick() {
        let mut game = duel();
        own(&mut game, Coord::new(2, 2), 1);
        game.grid.link(Coord::new(1, 1), Coord::new(2, 2), 10.0).unwrap();
        game.grid.link(Coord::new(1, 1), Coord::new(2, 2), 10.0).unwrap();
        assert_eq!(
            game.grid.get(Coord::new(2, 2)).unwrap().last_event(),
            Some(EventKind::PowerIncrease)
        );

        game.advance().unwrap();
        assert_eq!(game.grid.get(Coord::new(2, 2)).unwrap().last_event(), None);
    }
}
