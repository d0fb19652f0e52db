//! Game state management.

use std::collections::{BTreeSet, HashMap};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::info;

use crate::error::{GameError, GameOverReason, GameResult};
use crate::game::mapgen::{generate_grid, promote_core, select_core};
use crate::game::{Coord, GenerationConfig, Grid, Player, PlayerId};

/// Maximum number of players in a game.
pub const MAX_PLAYERS: usize = 16;

/// Whether the game still accepts ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameStatus {
    /// Ticks are still processed.
    Running,
    /// One player holds every core.
    Won {
        /// The winning player.
        winner: PlayerId,
    },
    /// No core is left on the grid.
    Draw,
}

impl GameStatus {
    /// Whether the game has reached a terminal state.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// The game-over outcome, if terminal.
    #[must_use]
    pub const fn reason(self) -> Option<GameOverReason> {
        match self {
            Self::Running => None,
            Self::Won { winner } => Some(GameOverReason::Won { winner }),
            Self::Draw => Some(GameOverReason::Draw),
        }
    }
}

/// Complete game state.
#[derive(Debug, Clone)]
pub struct Game {
    /// Registry key of the game.
    name: String,
    /// The node grid.
    pub grid: Grid,
    /// All players, indexed by `id - 1`.
    pub players: Vec<Player>,
    /// Global tick counter, starts at 0.
    pub(crate) tick: u32,
    /// Nodes each player can currently see beyond their own.
    pub(crate) visible: HashMap<PlayerId, BTreeSet<Coord>>,
    /// Terminal state, if reached.
    pub(crate) status: GameStatus,
    /// Power granted to each joining player's core.
    begin_power: f64,
    /// Source of core placement for joining players.
    rng: SmallRng,
}

impl Game {
    /// Generate a grid from `config` and wrap it in a new game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Generation`] if the config is invalid or the
    /// grid has no room for the neutral cores.
    pub fn create(
        name: impl Into<String>,
        width: u16,
        height: u16,
        config: &GenerationConfig,
        seed: u64,
    ) -> GameResult<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = generate_grid(width, height, config, &mut rng)?;
        let name = name.into();
        info!(game = %name, width, height, seed, nodes = grid.node_count(), "game created");

        Ok(Self {
            name,
            grid,
            players: Vec::new(),
            tick: 0,
            visible: HashMap::new(),
            status: GameStatus::Running,
            begin_power: config.begin_power,
            rng,
        })
    }

    /// Wrap a prepared grid, e.g. for scripted scenarios.
    #[must_use]
    pub fn from_grid(name: impl Into<String>, grid: Grid, seed: u64) -> Self {
        Self {
            name: name.into(),
            grid,
            players: Vec::new(),
            tick: 0,
            visible: HashMap::new(),
            status: GameStatus::Running,
            begin_power: GenerationConfig::default().begin_power,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Game name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current tick.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Whether the game is running or over.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Check if the game is over.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.status.is_over()
    }

    /// Get a player by ID.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(id).checked_sub(1)?)
    }

    /// Get a mutable reference to a player by ID.
    #[must_use]
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(usize::from(id).checked_sub(1)?)
    }

    /// Look a player up by name.
    #[must_use]
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Display name of an owner.
    #[must_use]
    pub fn owner_name(&self, owner: Option<PlayerId>) -> Option<&str> {
        owner
            .and_then(|id| self.player(id))
            .map(|p| p.name.as_str())
    }

    /// Nodes a player sees beyond their own, as of the last tick or join.
    pub fn visible_to(&self, player: PlayerId) -> impl Iterator<Item = Coord> + '_ {
        self.visible.get(&player).into_iter().flatten().copied()
    }

    /// The player's own nodes plus everything they can see, in grid order.
    #[must_use]
    pub fn perspective(&self, player: PlayerId) -> Vec<Coord> {
        let seen = self.visible.get(&player);
        self.grid
            .nodes()
            .filter(|node| {
                node.owner == Some(player) || seen.is_some_and(|set| set.contains(&node.coord))
            })
            .map(|node| node.coord)
            .collect()
    }

    /// Add a player and grant them a randomly chosen starting core.
    ///
    /// The core is picked like a neutral core at generation time and
    /// gets the configured begin power. Late joiners start with their
    /// turn counter at the current tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] once the game has ended,
    /// [`GameError::DuplicatePlayer`], [`GameError::TooManyPlayers`], or
    /// [`GameError::Generation`] if no node qualifies as a core.
    pub fn join(&mut self, name: &str) -> GameResult<PlayerId> {
        self.check_joinable(name)?;
        let coord = select_core(&self.grid, &mut self.rng)?;
        self.admit(name, coord, self.begin_power)
    }

    /// Add a player whose starting core is the node at `coord`.
    ///
    /// # Errors
    ///
    /// As [`Game::join`], plus [`GameError::NoNode`] for an empty cell and
    /// [`GameError::InvalidArgument`] if the node is already owned.
    pub fn join_at(&mut self, name: &str, coord: Coord, power: f64) -> GameResult<PlayerId> {
        self.check_joinable(name)?;
        let node = self.grid.get(coord).ok_or(GameError::NoNode(coord))?;
        if node.owner.is_some() {
            return Err(GameError::InvalidArgument {
                name: "coord",
                reason: format!("node {coord} is already owned"),
            });
        }
        self.admit(name, coord, power)
    }

    fn check_joinable(&self, name: &str) -> GameResult<()> {
        if let Some(reason) = self.status.reason() {
            return Err(GameError::GameOver(reason));
        }
        if self.player_by_name(name).is_some() {
            return Err(GameError::DuplicatePlayer(name.to_string()));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::TooManyPlayers(MAX_PLAYERS));
        }
        Ok(())
    }

    fn admit(&mut self, name: &str, coord: Coord, power: f64) -> GameResult<PlayerId> {
        let id = PlayerId::try_from(self.players.len() + 1)
            .map_err(|_| GameError::TooManyPlayers(MAX_PLAYERS))?;

        promote_core(&mut self.grid, coord, power);
        if let Some(node) = self.grid.get_mut(coord) {
            node.owner = Some(id);
        }
        self.players.push(Player::new(id, name, coord, self.tick));
        self.refresh_visibility();

        info!(game = %self.name, player = name, id, %coord, tick = self.tick, "player joined");
        Ok(id)
    }
}
