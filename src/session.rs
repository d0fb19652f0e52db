//! Session layer: commands, the turn barrier, client views and the game
//! registry.
//!
//! The layer is transport-agnostic. A transport decodes a [`Request`],
//! hands it to [`GameRegistry::dispatch`] and encodes the [`Response`].

mod barrier;
mod command;
mod registry;
mod view;

pub use barrier::CommandOutcome;
pub use command::{Command, CommandArgs, PROTOCOL_VERSION};
pub use registry::{GameHandle, GameRegistry, Request, Response};
pub use view::{GameInfo, InitView, LinkView, NodeView, PlayerView, QueryResponse, StateView};
