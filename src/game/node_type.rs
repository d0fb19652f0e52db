//! Node specialization archetypes.
//!
//! The catalog is a static table built at compile time and never mutated.
//! Every node refers to its archetype by [`NodeKind`], and the stats are
//! looked up through [`NodeKind::spec`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a node archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum NodeKind {
    /// Plain node without specialization.
    Unspecialized = 0,
    /// Hardened node, more resistant to takeover.
    Shield = 1,
    /// Halves the resistance of enemy nodes linking into it.
    Sabotage = 2,
    /// Halves the resistance of enemy nodes it links to.
    Attack = 3,
    /// Poisons its own subgrid when assimilated.
    Corruption = 4,
    /// Strips specializations from attackers when assimilated.
    Destructor = 5,
    /// Extended vision radius.
    Sensor = 6,
    /// Keeps its owner in the game; doubles resistance of linked friends.
    Core = 7,
    /// Outgoing links feed power to other players instead of attacking.
    Collaborator = 8,
}

/// Static stats of a node archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeType {
    /// Archetype identifier.
    pub id: NodeKind,
    /// Short display label.
    pub label: &'static str,
    /// Player-facing description.
    pub description: &'static str,
    /// Base resistance multiplier applied to energy for strength.
    pub resistance: f64,
    /// Power consumed every tick (doubled while cloaked).
    pub consumption: f64,
    /// Vision radius in cells.
    pub vision: u16,
    /// Ticks needed to finish specializing into this type.
    #[serde(rename = "buildduration")]
    pub build_duration: u32,
    /// Factor this type applies to the resistance of nodes it affects.
    #[serde(rename = "resistancemodifier")]
    pub resistance_modifier: f64,
}

/// All archetypes, indexed by `NodeKind as usize`.
pub static NODE_TYPES: [NodeType; 9] = [
    NodeType {
        id: NodeKind::Unspecialized,
        label: "Unspecialized node",
        description: "A regular unspecialized node",
        resistance: 1.0,
        consumption: 10.0,
        vision: 1,
        build_duration: 1,
        resistance_modifier: 1.0,
    },
    NodeType {
        id: NodeKind::Shield,
        label: "Shielded node",
        description: "Shielded nodes are hardened nodes and are more resistant to enemy takeover",
        resistance: 5.0,
        consumption: 50.0,
        vision: 1,
        build_duration: 2,
        resistance_modifier: 1.0,
    },
    NodeType {
        id: NodeKind::Sabotage,
        label: "Sabotage node",
        description: "Sabotage nodes halve the resistance of incoming enemy nodes and have fairly \
                      high resistance themselves. Good for instant counterattacks.",
        resistance: 4.0,
        consumption: 200.0,
        vision: 1,
        build_duration: 3,
        resistance_modifier: 0.5,
    },
    NodeType {
        id: NodeKind::Attack,
        label: "Attack node",
        description: "Attack nodes halve the resistance of enemy nodes you link to, and have \
                      moderate resistance themselves.",
        resistance: 3.0,
        consumption: 150.0,
        vision: 1,
        build_duration: 2,
        resistance_modifier: 0.5,
    },
    NodeType {
        id: NodeKind::Corruption,
        label: "Corruption node",
        description: "Corruption nodes irreversibly poison their own subgrid when assimilated by \
                      the enemy, making the spot cost power instead of yield power",
        resistance: 0.0,
        consumption: 200.0,
        vision: 1,
        build_duration: 3,
        resistance_modifier: 1.0,
    },
    NodeType {
        id: NodeKind::Destructor,
        label: "Destruction node",
        description: "Destroys any specialization on neighbouring enemy nodes when an attempt to \
                      assimilate it is made",
        resistance: 2.0,
        consumption: 200.0,
        vision: 1,
        build_duration: 3,
        resistance_modifier: 1.0,
    },
    NodeType {
        id: NodeKind::Sensor,
        label: "Sensor node",
        description: "Sensor nodes provide an enhanced field of vision",
        resistance: 2.0,
        consumption: 100.0,
        vision: 3,
        build_duration: 2,
        resistance_modifier: 1.0,
    },
    NodeType {
        id: NodeKind::Core,
        label: "Core node",
        description: "Core nodes regulate your network's power flow. Without a core node the \
                      whole network falls apart. They are power-hungry fortresses and double the \
                      resistance of linked neighbouring nodes",
        resistance: 20.0,
        consumption: 1000.0,
        vision: 1,
        build_duration: 10,
        resistance_modifier: 2.0,
    },
    NodeType {
        id: NodeKind::Collaborator,
        label: "Collaborator node",
        description: "Feeds power to other players. Outgoing links from a collaborator never \
                      assimilate but give power away, allowing alliances and conspiracies",
        resistance: 1.0,
        consumption: 200.0,
        vision: 1,
        build_duration: 1,
        resistance_modifier: 1.0,
    },
];

impl NodeKind {
    /// Every archetype in catalog order.
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Unspecialized,
        NodeKind::Shield,
        NodeKind::Sabotage,
        NodeKind::Attack,
        NodeKind::Corruption,
        NodeKind::Destructor,
        NodeKind::Sensor,
        NodeKind::Core,
        NodeKind::Collaborator,
    ];

    /// Catalog entry for this archetype.
    #[must_use]
    #[inline]
    pub fn spec(self) -> &'static NodeType {
        &NODE_TYPES[self as usize]
    }

    /// Wire identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Unspecialized => "unspecialized",
            Self::Shield => "shield",
            Self::Sabotage => "sabotage",
            Self::Attack => "attack",
            Self::Corruption => "corruption",
            Self::Destructor => "destructor",
            Self::Sensor => "sensor",
            Self::Core => "core",
            Self::Collaborator => "collaborator",
        }
    }

    /// Whether this is a specialization (anything but unspecialized).
    #[must_use]
    pub const fn is_specialized(self) -> bool {
        !matches!(self, Self::Unspecialized)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "unspecialised" {
            return Ok(Self::Unspecialized);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| s.to_string())
    }
}
