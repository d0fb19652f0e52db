//! Serializable snapshots of a game as clients see it.
//!
//! Field names follow the wire format clients already speak, so most of
//! them are flat lowercase words (`buildtime`, `lasteventpriority`).

use serde::Serialize;

use crate::game::{
    Coord, EVENTS, Event, Game, GameStatus, Link, NO_EVENT_PRIORITY, NODE_TYPES, Node, NodeType,
    Player,
};
use crate::session::PROTOCOL_VERSION;

/// A link as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkView {
    /// Source column.
    pub sourcex: u16,
    /// Source row.
    pub sourcey: u16,
    /// Target column.
    pub targetx: u16,
    /// Target row.
    pub targety: u16,
    /// Power carried.
    pub power: f64,
}

impl From<Link> for LinkView {
    fn from(link: Link) -> Self {
        Self {
            sourcex: link.source.x,
            sourcey: link.source.y,
            targetx: link.target.x,
            targety: link.target.y,
            power: link.power,
        }
    }
}

/// A node with its derived energy and strength.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Archetype id.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Subgrid power.
    pub power: f64,
    /// Net energy.
    pub energy: f64,
    /// Defensive strength at the current tick.
    pub strength: f64,
    /// Owner name, if owned.
    pub owner: Option<String>,
    /// Tick at which a pending specialization completes.
    pub buildtime: u32,
    /// Whether the node is cloaked.
    pub hidden: bool,
    /// Outgoing links in creation order.
    pub outlinks: Vec<LinkView>,
    /// Incoming links in creation order.
    pub inlinks: Vec<LinkView>,
    /// Label of the last event, empty if none.
    pub lastevent: &'static str,
    /// Priority of the last event, [`NO_EVENT_PRIORITY`] if none.
    pub lasteventpriority: u8,
}

impl NodeView {
    /// Snapshot `node` within `game`.
    #[must_use]
    pub fn new(game: &Game, node: &Node) -> Self {
        let grid = &game.grid;
        let event = node.last_event().map(|e| e.spec());
        Self {
            x: node.coord.x,
            y: node.coord.y,
            kind: node.kind.id(),
            power: node.power,
            energy: grid.energy(node),
            strength: grid.strength(node, game.tick()),
            owner: game.owner_name(node.owner).map(str::to_string),
            buildtime: node.build_time,
            hidden: node.hidden,
            outlinks: grid.outlinks(node.coord).map(LinkView::from).collect(),
            inlinks: grid.inlinks(node.coord).map(LinkView::from).collect(),
            lastevent: event.map_or("", |e| e.label),
            lasteventpriority: event.map_or(NO_EVENT_PRIORITY, |e| e.priority),
        }
    }
}

/// A player as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// Player name.
    pub name: String,
    /// Starting core column.
    pub beginx: u16,
    /// Starting core row.
    pub beginy: u16,
    /// Submitted turns.
    pub time: u32,
    /// Whether the player won.
    pub wins: bool,
    /// Whether the player lost.
    pub lost: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            beginx: player.begin.x,
            beginy: player.begin.y,
            time: player.time,
            wins: player.wins,
            lost: player.lost,
        }
    }
}

/// Game metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameInfo {
    /// Game name.
    pub name: String,
    /// Every player.
    pub players: Vec<PlayerView>,
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Current tick.
    pub time: u32,
    /// Engine protocol version.
    pub version: &'static str,
    /// Running, won or drawn.
    pub status: GameStatus,
}

impl GameInfo {
    /// Snapshot the metadata of `game`.
    #[must_use]
    pub fn new(game: &Game) -> Self {
        Self {
            name: game.name().to_string(),
            players: game.players.iter().map(PlayerView::from).collect(),
            width: game.grid.width(),
            height: game.grid.height(),
            time: game.tick(),
            version: PROTOCOL_VERSION,
            status: game.status(),
        }
    }
}

/// Payload a client needs before it joins: metadata plus both catalogs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitView {
    /// Game metadata.
    pub game: GameInfo,
    /// Node archetype catalog.
    pub nodetypes: &'static [NodeType],
    /// Event catalog.
    pub events: &'static [Event],
}

impl InitView {
    /// Build the init payload for `game`.
    #[must_use]
    pub fn new(game: &Game) -> Self {
        Self {
            game: GameInfo::new(game),
            nodetypes: &NODE_TYPES,
            events: &EVENTS,
        }
    }
}

/// Per-player snapshot: every player plus the nodes the caller may see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateView {
    /// Every player.
    pub players: Vec<PlayerView>,
    /// Nodes in grid order.
    pub nodes: Vec<NodeView>,
}

impl StateView {
    /// Snapshot the nodes at `coords`.
    #[must_use]
    pub fn new(game: &Game, coords: impl IntoIterator<Item = Coord>) -> Self {
        Self {
            players: game.players.iter().map(PlayerView::from).collect(),
            nodes: coords
                .into_iter()
                .filter_map(|coord| game.grid.get(coord))
                .map(|node| NodeView::new(game, node))
                .collect(),
        }
    }
}

/// Answer to a state query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    /// Anonymous init query.
    Init(InitView),
    /// Per-player query.
    State(StateView),
}
