//! Player state management.

use crate::game::Coord;

/// Unique identifier for a player, 1-based in join order.
pub type PlayerId = u8;

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Unique display name, the key callers address the player by.
    pub name: String,
    /// Location of the core node the player started from.
    pub begin: Coord,
    /// Number of turns this player has submitted.
    pub time: u32,
    /// Set once the player holds every core on the grid.
    pub wins: bool,
    /// Set once the player has lost all of their cores.
    pub lost: bool,
}

impl Player {
    /// Create a new player starting at `begin` with turn counter `time`.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, begin: Coord, time: u32) -> Self {
        Self {
            id,
            name: name.into(),
            begin,
            time,
            wins: false,
            lost: false,
        }
    }

    /// Record a submitted turn.
    pub fn submit_turn(&mut self) {
        self.time += 1;
    }

    /// Whether the player still takes part in the turn barrier.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.lost
    }

    /// Whether the player is ahead of the global tick.
    #[must_use]
    pub const fn is_waiting(&self, tick: u32) -> bool {
        self.time > tick
    }

    /// Mark the player as defeated.
    pub fn eliminate(&mut self) {
        self.lost = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new(1, "alice", Coord::new(5, 5), 0);
        assert_eq!(player.id, 1);
        assert_eq!(player.name, "alice");
        assert_eq!(player.begin, Coord::new(5, 5));
        assert!(player.is_active());
        assert!(!player.wins);
    }

    #[test]
    fn test_player_submit_turn_waits() {
        let mut player = Player::new(1, "alice", Coord::new(1, 1), 0);
        assert!(!player.is_waiting(0));
        player.submit_turn();
        assert_eq!(player.time, 1);
        assert!(player.is_waiting(0));
        assert!(!player.is_waiting(1));
    }

    #[test]
    fn test_player_eliminate() {
        let mut player = Player::new(2, "bob", Coord::new(1, 1), 0);
        player.eliminate();
        assert!(player.lost);
        assert!(!player.is_active());
    }
}
