//! Player commands and their parsing from loose string arguments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::game::{Coord, NodeKind};

/// Protocol version clients must send with every command.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Untyped command arguments as sent by a transport, e.g. query parameters.
pub type CommandArgs = BTreeMap<String, String>;

/// A command a player issues against a game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Command {
    /// Send `power` from `source` to the neighbouring `target`.
    Link {
        /// Issuing node, must be owned by the player.
        source: Coord,
        /// Receiving node.
        target: Coord,
        /// Power to send.
        power: f64,
    },
    /// Start specializing a node.
    Specialize {
        /// Node to specialize, must be owned by the player.
        node: Coord,
        /// New archetype.
        kind: NodeKind,
    },
    /// Cloak a node.
    Hide {
        /// Node to cloak, must be owned by the player.
        node: Coord,
    },
    /// End the player's turn.
    Done,
}

impl Command {
    /// Build a command from its name and string arguments.
    ///
    /// Recognised names are `link`, `specialize` (or `spec`), `hide` and
    /// `done`. Node coordinates come from `x`/`y`, link targets from
    /// `targetx`/`targety`, link power from `power` and the archetype
    /// from `type`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown command or node type, a
    /// missing argument, or a value that does not parse.
    pub fn parse(name: &str, args: &CommandArgs) -> GameResult<Self> {
        match name {
            "link" => Ok(Self::Link {
                source: coord_arg(args, "x", "y")?,
                target: coord_arg(args, "targetx", "targety")?,
                power: power_arg(args)?,
            }),
            "specialize" | "spec" => {
                let node = coord_arg(args, "x", "y")?;
                let kind = required(args, "type")?;
                let kind = kind.parse::<NodeKind>().map_err(GameError::UnknownNodeType)?;
                Ok(Self::Specialize { node, kind })
            }
            "hide" => Ok(Self::Hide {
                node: coord_arg(args, "x", "y")?,
            }),
            "done" => Ok(Self::Done),
            other => Err(GameError::UnknownCommand(other.to_string())),
        }
    }

    /// Command name on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Link { .. } => "link",
            Self::Specialize { .. } => "specialize",
            Self::Hide { .. } => "hide",
            Self::Done => "done",
        }
    }

    /// The node the command acts through, which the player must own.
    #[must_use]
    pub const fn node(&self) -> Option<Coord> {
        match self {
            Self::Link { source, .. } => Some(*source),
            Self::Specialize { node, .. } | Self::Hide { node } => Some(*node),
            Self::Done => None,
        }
    }
}

fn required<'a>(args: &'a CommandArgs, key: &'static str) -> GameResult<&'a str> {
    args.get(key)
        .map(String::as_str)
        .ok_or(GameError::MissingArgument(key))
}

fn coord_arg(args: &CommandArgs, x_key: &'static str, y_key: &'static str) -> GameResult<Coord> {
    let x = required(args, x_key)?;
    let y = required(args, y_key)?;
    match (x.trim().parse::<u16>(), y.trim().parse::<u16>()) {
        (Ok(x), Ok(y)) => Ok(Coord::new(x, y)),
        _ => Err(GameError::InvalidCoordinates(format!(
            "{x_key}={x}, {y_key}={y} is not numeric"
        ))),
    }
}

fn power_arg(args: &CommandArgs) -> GameResult<f64> {
    let raw = required(args, "power")?;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| GameError::InvalidArgument {
            name: "power",
            reason: format!("{raw:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> CommandArgs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_link() {
        let cmd = Command::parse(
            "link",
            &args(&[
                ("x", "2"),
                ("y", "3"),
                ("targetx", "3"),
                ("targety", "3"),
                ("power", "12.5"),
            ]),
        )
        .unwrap();
        assert_eq!(
            cmd,
            Command::Link {
                source: Coord::new(2, 3),
                target: Coord::new(3, 3),
                power: 12.5,
            }
        );
        assert_eq!(cmd.node(), Some(Coord::new(2, 3)));
    }

    #[test]
    fn test_parse_specialize_aliases() {
        let a = args(&[("x", "1"), ("y", "1"), ("type", "shield")]);
        let expected = Command::Specialize {
            node: Coord::new(1, 1),
            kind: NodeKind::Shield,
        };
        assert_eq!(Command::parse("specialize", &a).unwrap(), expected);
        assert_eq!(Command::parse("spec", &a).unwrap(), expected);

        let a = args(&[("x", "2"), ("y", "3"), ("type", "unspecialised")]);
        assert_eq!(
            Command::parse("spec", &a).unwrap(),
            Command::Specialize {
                node: Coord::new(2, 3),
                kind: NodeKind::Unspecialized,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Command::parse("fly", &CommandArgs::new()),
            Err(GameError::UnknownCommand("fly".into()))
        );
        assert_eq!(
            Command::parse("hide", &args(&[("x", "1")])),
            Err(GameError::MissingArgument("y"))
        );
        assert!(matches!(
            Command::parse("hide", &args(&[("x", "one"), ("y", "1")])),
            Err(GameError::InvalidCoordinates(_))
        ));
        assert!(matches!(
            Command::parse("hide", &args(&[("x", "-1"), ("y", "1")])),
            Err(GameError::InvalidCoordinates(_))
        ));
        assert_eq!(
            Command::parse("spec", &args(&[("x", "1"), ("y", "1"), ("type", "teleporter")])),
            Err(GameError::UnknownNodeType("teleporter".into()))
        );
        assert!(matches!(
            Command::parse(
                "link",
                &args(&[
                    ("x", "1"),
                    ("y", "1"),
                    ("targetx", "2"),
                    ("targety", "2"),
                    ("power", "lots"),
                ])
            ),
            Err(GameError::InvalidArgument { name: "power", .. })
        ));
    }

    #[test]
    fn test_done_needs_no_args() {
        let cmd = Command::parse("done", &CommandArgs::new()).unwrap();
        assert_eq!(cmd, Command::Done);
        assert_eq!(cmd.node(), None);
        assert_eq!(cmd.name(), "done");
    }

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_string(&Command::Hide {
            node: Coord::new(4, 5),
        })
        .unwrap();
        assert_eq!(json, r#"{"command":"hide","node":{"x":4,"y":5}}"#);
    }
}
