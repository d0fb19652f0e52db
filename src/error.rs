//! Error types for the simulation engine.
//!
//! Every failing operation leaves the game untouched. Callers branch on
//! [`GameError::kind`] to tell validation failures, rule violations, the
//! turn-barrier waiting signal and terminal game-over outcomes apart.

use std::fmt;

use serde::Serialize;

use crate::game::{Coord, MapGenError, NodeKind, PlayerId};

/// Coarse classification of a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or incomplete request.
    Validation,
    /// Well-formed request that the game rules refuse.
    RuleViolation,
    /// The player is ahead of the turn barrier and must retry later.
    Waiting,
    /// The game is over for this player.
    GameOver,
}

/// Why the game ended for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GameOverReason {
    /// A single player holds every core node.
    Won {
        /// The winning player.
        winner: PlayerId,
    },
    /// No core node is left anywhere on the grid.
    Draw,
    /// The calling player has lost all of their cores.
    Lost,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won { winner } => write!(f, "player {winner} wins"),
            Self::Draw => write!(f, "no player holds a core, draw"),
            Self::Lost => write!(f, "you lost"),
        }
    }
}

/// Errors raised by engine operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// Coordinates outside the grid or not numeric.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
    /// The addressed grid cell holds no node.
    #[error("no node at {0}")]
    NoNode(Coord),
    /// Command name not recognised.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    /// Specialization type not in the catalog.
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),
    /// A required argument is absent.
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
    /// An argument is present but unusable.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// No player with that name in this game.
    #[error("no player named {0:?}")]
    UnknownPlayer(String),
    /// A player with that name already joined.
    #[error("player {0:?} already joined")]
    DuplicatePlayer(String),
    /// The roster is full.
    #[error("too many players (maximum {0})")]
    TooManyPlayers(usize),
    /// A game with that name is already registered.
    #[error("game {0:?} already exists")]
    GameExists(String),
    /// No game with that name is registered.
    #[error("game {0:?} not found")]
    GameNotFound(String),
    /// Client and engine protocol versions differ.
    #[error("client version {client:?} does not match engine version {engine:?}")]
    VersionMismatch {
        /// Version sent by the client.
        client: String,
        /// Version spoken by the engine.
        engine: &'static str,
    },
    /// Grid generation failed.
    #[error(transparent)]
    Generation(#[from] MapGenError),
    /// The node is not owned by the issuing player.
    #[error("node {0} is not owned by the issuing player")]
    NotOwner(Coord),
    /// Link target is the source itself or not 8-adjacent to it.
    #[error("cannot link {from} to non-neighbour {to}")]
    NonNeighbourLink {
        /// Link source.
        from: Coord,
        /// Requested target.
        to: Coord,
    },
    /// Node energy would not stay positive.
    #[error("not enough power at {coord} for {kind:?} (projected energy {projected:.2})")]
    NotEnoughPower {
        /// The node that lacks power.
        coord: Coord,
        /// Type the node would run as.
        kind: NodeKind,
        /// Energy after the change.
        projected: f64,
    },
    /// The player already submitted this turn and others have not.
    #[error("waiting for other players to complete their turn: {}", waiting_for.join(","))]
    Waiting {
        /// Names of players the barrier is still waiting on.
        waiting_for: Vec<String>,
    },
    /// The game ended, or ended for this player.
    #[error("game over: {0}")]
    GameOver(GameOverReason),
}

impl GameError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCoordinates(_)
            | Self::NoNode(_)
            | Self::UnknownCommand(_)
            | Self::UnknownNodeType(_)
            | Self::MissingArgument(_)
            | Self::InvalidArgument { .. }
            | Self::UnknownPlayer(_)
            | Self::DuplicatePlayer(_)
            | Self::TooManyPlayers(_)
            | Self::GameExists(_)
            | Self::GameNotFound(_)
            | Self::VersionMismatch { .. }
            | Self::Generation(_) => ErrorKind::Validation,
            Self::NotOwner(_) | Self::NonNeighbourLink { .. } | Self::NotEnoughPower { .. } => {
                ErrorKind::RuleViolation
            }
            Self::Waiting { .. } => ErrorKind::Waiting,
            Self::GameOver(_) => ErrorKind::GameOver,
        }
    }
}

/// Result type for engine operations.
pub type GameResult<T> = Result<T, GameError>;
