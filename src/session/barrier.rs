//! The turn barrier and per-player command and query entry points.
//!
//! Each player carries a submitted-turn counter. `done` bumps it, and
//! the game only ticks once every active player's counter matches. A
//! player whose counter is ahead of the global tick is waiting: every
//! read or command they send is refused until the barrier releases.

use serde::Serialize;
use tracing::debug;

use crate::error::{GameError, GameOverReason, GameResult};
use crate::game::{Coord, Game, LinkOutcome, Node, PlayerId, TickReport};
use crate::session::{Command, InitView, QueryResponse, StateView};

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A link was created or changed.
    Linked {
        /// How the link operation resolved.
        link: LinkOutcome,
    },
    /// A node started specializing.
    Specializing {
        /// Tick at which the specialization completes.
        ready: u32,
    },
    /// A node was cloaked.
    Hidden,
    /// The turn was recorded; other players still have to finish.
    Submitted {
        /// Players the barrier is waiting on.
        waiting_for: Vec<String>,
    },
    /// The turn completed the barrier and the game ticked.
    Advanced {
        /// Summary of the executed tick.
        report: TickReport,
    },
}

impl Game {
    /// Names of active players that have not finished the current turn.
    #[must_use]
    pub fn waiting_for(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| p.is_active() && !p.is_waiting(self.tick))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Resolve a player by name and make sure they may act now.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] or, if the player is ahead of
    /// the barrier, [`GameError::Waiting`].
    pub fn resolve_player(&self, name: &str) -> GameResult<PlayerId> {
        let player = self
            .player_by_name(name)
            .ok_or_else(|| GameError::UnknownPlayer(name.to_string()))?;
        if player.is_waiting(self.tick) {
            return Err(GameError::Waiting {
                waiting_for: self.waiting_for(),
            });
        }
        Ok(player.id)
    }

    /// Apply a command on behalf of `player`.
    ///
    /// Mutating commands take effect immediately. `done` records the turn
    /// and ticks the game once every active player has done the same.
    ///
    /// # Errors
    ///
    /// Fails with [`GameError::Waiting`] while the player is ahead of the
    /// barrier, [`GameError::GameOver`] once the game or the player is
    /// done, [`GameError::NotOwner`] for a node the player does not own,
    /// and with the validation and rule errors of the underlying
    /// operation. A failing command changes nothing.
    pub fn submit(&mut self, player: &str, command: &Command) -> GameResult<CommandOutcome> {
        let id = self.resolve_player(player)?;
        if let Some(reason) = self.status.reason() {
            return Err(GameError::GameOver(reason));
        }
        if self.player(id).is_some_and(|p| p.lost) {
            return Err(GameError::GameOver(GameOverReason::Lost));
        }

        let outcome = match *command {
            Command::Link {
                source,
                target,
                power,
            } => {
                self.owned_node(id, source)?;
                if !self.grid.in_bounds(target) {
                    return Err(GameError::InvalidCoordinates(format!(
                        "target {target} is outside the grid"
                    )));
                }
                let link = self.grid.link(source, target, power)?;
                CommandOutcome::Linked { link }
            }
            Command::Specialize { node, kind } => {
                self.owned_node(id, node)?;
                self.grid.specialize(node, kind, self.tick)?;
                CommandOutcome::Specializing {
                    ready: self.tick + kind.spec().build_duration,
                }
            }
            Command::Hide { node } => {
                self.owned_node(id, node)?;
                self.grid.hide(node)?;
                CommandOutcome::Hidden
            }
            Command::Done => return self.finish_turn(id),
        };

        debug!(player, command = command.name(), "command applied");
        Ok(outcome)
    }

    /// Record a finished turn and tick if the barrier is complete.
    fn finish_turn(&mut self, id: PlayerId) -> GameResult<CommandOutcome> {
        if let Some(player) = self.player_mut(id) {
            player.submit_turn();
            debug!(player = %player.name, time = player.time, "turn submitted");
        }

        let waiting_for = self.waiting_for();
        if !waiting_for.is_empty() {
            return Ok(CommandOutcome::Submitted { waiting_for });
        }

        let report = self.advance()?;
        Ok(CommandOutcome::Advanced { report })
    }

    /// The node at `coord`, provided `player` owns it.
    fn owned_node(&self, player: PlayerId, coord: Coord) -> GameResult<&Node> {
        if !self.grid.in_bounds(coord) {
            return Err(GameError::InvalidCoordinates(format!(
                "{coord} is outside the grid"
            )));
        }
        let node = self.grid.get(coord).ok_or(GameError::NoNode(coord))?;
        if node.owner != Some(player) {
            return Err(GameError::NotOwner(coord));
        }
        Ok(node)
    }

    /// Answer a state query.
    ///
    /// Without a player this is the init query: metadata and catalogs.
    /// With one, it returns every player plus that player's nodes and
    /// visibility set, or the whole grid once the player has won or lost
    /// or the game is over. Reads never change the game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] or [`GameError::Waiting`].
    pub fn query(&self, player: Option<&str>) -> GameResult<QueryResponse> {
        let Some(name) = player else {
            return Ok(QueryResponse::Init(InitView::new(self)));
        };

        let id = self.resolve_player(name)?;
        let reveal_all = self.is_over() || self.player(id).is_some_and(|p| p.wins || p.lost);
        let coords = if reveal_all {
            self.grid.coords()
        } else {
            self.perspective(id)
        };
        Ok(QueryResponse::State(StateView::new(self, coords)))
    }
}
