use std::collections::HashMap;

use super::entity::{Food, Pellet, Virus};
use super::player::{Pid, Player};

/// The authoritative set of all entities at a point in time.
///
/// The player map is the single source of truth for identifier-based
/// lookups; pellets, viruses and foods are unordered collections that
/// are depleted and regenerated independently of players.
#[derive(Debug, Default)]
pub struct WorldState {
    pub players: HashMap<Pid, Player>,
    pub pellets: Vec<Pellet>,
    pub viruses: Vec<Virus>,
    pub foods: Vec<Food>,
}

impl WorldState {
    pub fn new() -> Self {
        WorldState::default()
    }

    /// Player identifiers in ascending order. Consumption and bot
    /// processing iterate in this order so tie-breaks are stable.
    pub fn sorted_pids(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.players.keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    pub fn player(&self, pid: Pid) -> crate::error::Result<&Player> {
        self.players
            .get(&pid)
            .ok_or(crate::error::EnvError::NotFound(pid))
    }

    pub fn player_mut(&mut self, pid: Pid) -> crate::error::Result<&mut Player> {
        self.players
            .get_mut(&pid)
            .ok_or(crate::error::EnvError::NotFound(pid))
    }

    /// Total number of live cells across all players.
    pub fn cell_count(&self) -> usize {
        self.players.values().map(|p| p.cells.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnvError;

    #[test]
    fn test_empty_world() {
        let world = WorldState::new();
        assert!(world.players.is_empty());
        assert!(world.pellets.is_empty());
        assert_eq!(world.cell_count(), 0);
    }

    #[test]
    fn test_player_lookup_not_found() {
        let world = WorldState::new();
        assert_eq!(world.player(7).unwrap_err(), EnvError::NotFound(7));
    }

    #[test]
    fn test_sorted_pids() {
        let mut world = WorldState::new();
        for pid in [5, 1, 3] {
            world.players.insert(pid, Player::new(pid, "p"));
        }
        assert_eq!(world.sorted_pids(), vec![1, 3, 5]);
    }

    #[test]
    fn test_cell_count() {
        let mut world = WorldState::new();
        let mut a = Player::new(1, "a");
        a.add_cell(0.0, 0.0, 25.0);
        a.add_cell(1.0, 1.0, 25.0);
        let mut b = Player::new(2, "b");
        b.add_cell(2.0, 2.0, 25.0);
        world.players.insert(1, a);
        world.players.insert(2, b);
        assert_eq!(world.cell_count(), 3);
    }
}
