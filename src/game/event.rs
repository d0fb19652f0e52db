//! Notification events tagged on nodes after simulation steps.
//!
//! Lower priority numbers take precedence. A node keeps only the most
//! important event tagged since the last tick began.

use serde::{Deserialize, Serialize};

/// Identifier of an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EventKind {
    /// Ownership dropped for lack of power.
    LostNode = 0,
    /// Cloak dropped for lack of power.
    LostCloak = 1,
    /// Specialization dropped for lack of power.
    LostSpec = 2,
    /// Node taken over by the enemy.
    LostAssimilated = 3,
    /// Node taken over by its new owner.
    AssimilateSuccess = 4,
    /// Node receives more power.
    PowerIncrease = 5,
    /// Node receives less power.
    PowerDecrease = 6,
    /// Subgrid poisoned by corruption.
    Corruption = 7,
    /// Specialization destroyed by a destructor.
    Destruction = 8,
}

/// Static description of an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event identifier.
    pub id: EventKind,
    /// Player-facing message.
    pub label: &'static str,
    /// Precedence, lower is more important.
    pub priority: u8,
}

/// All event kinds, indexed by `EventKind as usize`.
pub static EVENTS: [Event; 9] = [
    Event {
        id: EventKind::LostNode,
        label: "Node was lost due to insufficient power!",
        priority: 2,
    },
    Event {
        id: EventKind::LostCloak,
        label: "Node lost its cloak due to insufficient power!",
        priority: 3,
    },
    Event {
        id: EventKind::LostSpec,
        label: "Node lost its specialization due to insufficient power!",
        priority: 4,
    },
    Event {
        id: EventKind::LostAssimilated,
        label: "Node was taken over by the enemy!",
        priority: 1,
    },
    Event {
        id: EventKind::AssimilateSuccess,
        label: "Node successfully assimilated!",
        priority: 5,
    },
    Event {
        id: EventKind::PowerIncrease,
        label: "Node received more energy",
        priority: 7,
    },
    Event {
        id: EventKind::PowerDecrease,
        label: "Node now has less energy",
        priority: 6,
    },
    Event {
        id: EventKind::Corruption,
        label: "Corruption took place! The subgrid got poisoned!",
        priority: 1,
    },
    Event {
        id: EventKind::Destruction,
        label: "Your specialization was destroyed!",
        priority: 1,
    },
];

/// Priority reported when a node carries no event.
pub const NO_EVENT_PRIORITY: u8 = 100;

impl EventKind {
    /// Catalog entry for this event kind.
    #[must_use]
    #[inline]
    pub fn spec(self) -> &'static Event {
        &EVENTS[self as usize]
    }

    /// Precedence of this event kind.
    #[must_use]
    pub fn priority(self) -> u8 {
        self.spec().priority
    }

    /// Whether `self` should replace `current` as a node's last event.
    ///
    /// Ties keep the event that was tagged first.
    #[must_use]
    pub fn supersedes(self, current: Option<EventKind>) -> bool {
        match current {
            None => true,
            Some(current) => self.priority() < current.priority(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_indexed_by_kind() {
        for event in &EVENTS {
            assert_eq!(event.id.spec(), event);
        }
    }

    #[test]
    fn test_lower_priority_number_wins() {
        assert!(EventKind::LostNode.supersedes(Some(EventKind::PowerIncrease)));
        assert!(!EventKind::PowerIncrease.supersedes(Some(EventKind::LostNode)));
    }

    #[test]
    fn test_ties_keep_first() {
        assert!(!EventKind::Destruction.supersedes(Some(EventKind::Corruption)));
        assert!(EventKind::Corruption.supersedes(None));
    }
}
