//! Named games behind one lock each, and the request dispatcher a
//! transport hands decoded requests to.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, GameError, GameOverReason, GameResult};
use crate::game::{Game, GenerationConfig, PlayerId};
use crate::session::{
    Command, CommandArgs, CommandOutcome, GameInfo, PROTOCOL_VERSION, PlayerView, QueryResponse,
};

/// One game plus the condition players block on until their turn opens.
///
/// Every command and tick runs under the game's mutex, so a tick never
/// interleaves with another command on the same game.
#[derive(Debug)]
pub struct GameHandle {
    game: Mutex<Game>,
    turn: Condvar,
}

impl GameHandle {
    /// Wrap a game.
    #[must_use]
    pub fn new(game: Game) -> Self {
        Self {
            game: Mutex::new(game),
            turn: Condvar::new(),
        }
    }

    /// Exclusive access to the game.
    ///
    /// A panic while holding the lock cannot leave a half-applied command
    /// behind, so a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a player. See [`Game::join`].
    ///
    /// # Errors
    ///
    /// As [`Game::join`].
    pub fn join(&self, player: &str) -> GameResult<PlayerId> {
        self.lock().join(player)
    }

    /// Apply a command and wake waiting players if the game ticked.
    ///
    /// # Errors
    ///
    /// As [`Game::submit`].
    pub fn submit(&self, player: &str, command: &Command) -> GameResult<CommandOutcome> {
        let outcome = self.lock().submit(player, command)?;
        if matches!(outcome, CommandOutcome::Advanced { .. }) {
            self.turn.notify_all();
        }
        Ok(outcome)
    }

    /// Answer a state query. See [`Game::query`].
    ///
    /// # Errors
    ///
    /// As [`Game::query`].
    pub fn query(&self, player: Option<&str>) -> GameResult<QueryResponse> {
        self.lock().query(player)
    }

    /// Block until `player` is no longer ahead of the barrier.
    ///
    /// Returns `false` if `timeout` elapsed first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] for an unknown name.
    pub fn wait_for_turn(&self, player: &str, timeout: Duration) -> GameResult<bool> {
        let game = self.lock();
        let id = game
            .player_by_name(player)
            .map(|p| p.id)
            .ok_or_else(|| GameError::UnknownPlayer(player.to_string()))?;

        let (_game, result) = self
            .turn
            .wait_timeout_while(game, timeout, |game| {
                game.player(id)
                    .is_some_and(|p| p.is_active() && p.is_waiting(game.tick()))
            })
            .unwrap_or_else(PoisonError::into_inner);
        Ok(!result.timed_out())
    }
}

/// A request as decoded by a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "lowercase")]
pub enum Request {
    /// Create and register a new game.
    Create {
        /// Name to register the game under.
        game: String,
        /// Grid width.
        width: u16,
        /// Grid height.
        height: u16,
        /// Generation parameters.
        #[serde(default)]
        config: GenerationConfig,
        /// Seed for all randomness in the game.
        #[serde(default)]
        seed: u64,
    },
    /// Join a game as a new player.
    Join {
        /// Target game.
        game: String,
        /// Player name.
        player: String,
    },
    /// Read state; without a player this is the init query.
    Query {
        /// Target game.
        game: String,
        /// Querying player.
        #[serde(default)]
        player: Option<String>,
    },
    /// Issue a player command.
    Command {
        /// Target game.
        game: String,
        /// Client protocol version.
        version: String,
        /// Issuing player.
        player: String,
        /// Command name.
        command: String,
        /// Command arguments.
        #[serde(default)]
        args: CommandArgs,
    },
    /// List registered games.
    List,
}

/// The answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    /// A game was created.
    Created {
        /// Metadata of the new game.
        game: GameInfo,
    },
    /// A player joined.
    Joined {
        /// The new player.
        player: PlayerView,
    },
    /// State query result.
    State {
        /// Init payload or per-player snapshot.
        state: QueryResponse,
    },
    /// Command result.
    Command {
        /// What the command did.
        outcome: CommandOutcome,
    },
    /// Registered game names.
    Games {
        /// Sorted names.
        names: Vec<String>,
    },
    /// The player must wait for others to finish the turn.
    Waiting {
        /// Players the barrier is waiting on.
        waiting_for: Vec<String>,
    },
    /// The game is over for the caller.
    GameOver {
        /// Why.
        #[serde(flatten)]
        reason: GameOverReason,
    },
    /// A validation or rule error.
    Error {
        /// Error class.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}

impl From<GameError> for Response {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Waiting { waiting_for } => Self::Waiting { waiting_for },
            GameError::GameOver(reason) => Self::GameOver { reason },
            other => Self::Error {
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

/// All games of a process, keyed by name.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<String, Arc<GameHandle>>>,
}

impl GameRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and register a new game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameExists`] for a taken name, or the
    /// generation error.
    pub fn create(
        &self,
        name: &str,
        width: u16,
        height: u16,
        config: &GenerationConfig,
        seed: u64,
    ) -> GameResult<Arc<GameHandle>> {
        if self.read().contains_key(name) {
            return Err(GameError::GameExists(name.to_string()));
        }
        let game = Game::create(name, width, height, config, seed)?;
        self.insert(game)
    }

    /// Register an existing game under its name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameExists`] for a taken name.
    pub fn insert(&self, game: Game) -> GameResult<Arc<GameHandle>> {
        let mut games = self.write();
        if games.contains_key(game.name()) {
            return Err(GameError::GameExists(game.name().to_string()));
        }
        let name = game.name().to_string();
        let handle = Arc::new(GameHandle::new(game));
        games.insert(name, Arc::clone(&handle));
        Ok(handle)
    }

    /// Look a game up.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameNotFound`].
    pub fn get(&self, name: &str) -> GameResult<Arc<GameHandle>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::GameNotFound(name.to_string()))
    }

    /// Unregister a game, returning it if it existed.
    pub fn remove(&self, name: &str) -> Option<Arc<GameHandle>> {
        self.write().remove(name)
    }

    /// Registered game names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Handle a request, mapping every failure to a response.
    pub fn dispatch(&self, request: Request) -> Response {
        self.handle(request).unwrap_or_else(Response::from)
    }

    fn handle(&self, request: Request) -> GameResult<Response> {
        match request {
            Request::Create {
                game,
                width,
                height,
                config,
                seed,
            } => {
                let handle = self.create(&game, width, height, &config, seed)?;
                let info = GameInfo::new(&handle.lock());
                Ok(Response::Created { game: info })
            }
            Request::Join { game, player } => {
                let handle = self.get(&game)?;
                let mut game = handle.lock();
                let id = game.join(&player)?;
                let view = game
                    .player(id)
                    .map(PlayerView::from)
                    .ok_or(GameError::UnknownPlayer(player))?;
                Ok(Response::Joined { player: view })
            }
            Request::Query { game, player } => {
                let state = self.get(&game)?.query(player.as_deref())?;
                Ok(Response::State { state })
            }
            Request::Command {
                game,
                version,
                player,
                command,
                args,
            } => {
                if version != PROTOCOL_VERSION {
                    return Err(GameError::VersionMismatch {
                        client: version,
                        engine: PROTOCOL_VERSION,
                    });
                }
                let handle = self.get(&game)?;
                let command = Command::parse(&command, &args)?;
                let outcome = handle.submit(&player, &command)?;
                Ok(Response::Command { outcome })
            }
            Request::List => Ok(Response::Games {
                names: self.names(),
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<GameHandle>>> {
        self.games.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<GameHandle>>> {
        self.games.write().unwrap_or_else(PoisonError::into_inner)
    }
}
