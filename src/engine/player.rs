use super::entity::Cell;

/// Unique player identifier.
pub type Pid = u32;

/// Sentinel marking a player that has not been assigned an identifier.
pub const UNASSIGNED_PID: Pid = Pid::MAX;

/// Discrete action taken alongside a movement target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Act {
    #[default]
    None,
    Split,
    Feed,
}

/// A staged player decision: where to move, and what to do.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    pub target_x: f32,
    pub target_y: f32,
    pub act: Act,
}

impl Action {
    pub fn new(target_x: f32, target_y: f32, act: Act) -> Self {
        Action {
            target_x,
            target_y,
            act,
        }
    }
}

/// A named, colored controller owning zero or more cells.
///
/// A player with no cells is dead; `add_cell` is the only way a dead
/// player comes back to life.
#[derive(Clone, Debug)]
pub struct Player {
    pub pid: Pid,
    pub name: String,
    pub color: u8,
    pub cells: Vec<Cell>,
    /// The most recently staged action, consumed by the engine each frame.
    pub action: Action,
}

impl Player {
    pub fn new(pid: Pid, name: &str) -> Self {
        Player {
            pid,
            name: name.to_string(),
            color: (pid % 16) as u8,
            cells: Vec::new(),
            action: Action::default(),
        }
    }

    /// Create a player without an assigned identifier.
    pub fn unassigned(name: &str) -> Self {
        Self::new(UNASSIGNED_PID, name)
    }

    pub fn dead(&self) -> bool {
        self.cells.is_empty()
    }

    /// Mean x position of all owned cells. Callers must check `dead()`
    /// first; a dead player has no position.
    pub fn x(&self) -> f32 {
        debug_assert!(!self.dead(), "position of a dead player");
        self.cells.iter().map(|c| c.x).sum::<f32>() / self.cells.len() as f32
    }

    /// Mean y position of all owned cells. See `x()`.
    pub fn y(&self) -> f32 {
        debug_assert!(!self.dead(), "position of a dead player");
        self.cells.iter().map(|c| c.y).sum::<f32>() / self.cells.len() as f32
    }

    /// Summed mass of all owned cells. Zero when dead.
    pub fn total_mass(&self) -> f32 {
        self.cells.iter().map(|c| c.mass()).sum()
    }

    /// Mass of the player's heaviest cell. Zero when dead.
    pub fn largest_cell_mass(&self) -> f32 {
        self.cells.iter().map(|c| c.mass()).fold(0.0, f32::max)
    }

    /// Append a new cell, reviving the player if it was dead.
    pub fn add_cell(&mut self, x: f32, y: f32, mass: f32) {
        self.cells.push(Cell::new(x, y, mass));
    }

    /// Remove all cells, transitioning the player to dead.
    pub fn kill(&mut self) {
        self.cells.clear();
    }

    /// Stage the next movement target and discrete action.
    pub fn stage_action(&mut self, action: Action) {
        self.action = action;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starts_dead() {
        let player = Player::new(0, "TestPlayer");
        assert!(player.dead());
        assert_eq!(player.cells.len(), 0);
        assert_eq!(player.total_mass(), 0.0);
    }

    #[test]
    fn test_unassigned_sentinel() {
        let player = Player::unassigned("TestName");
        assert_eq!(player.pid, UNASSIGNED_PID);
        assert_eq!(player.name, "TestName");
    }

    #[test]
    fn test_add_cell_revives() {
        let mut player = Player::new(0, "TestPlayer");
        player.add_cell(100.0, 125.0, 25.0);
        assert!(!player.dead());
        assert_eq!(player.cells.len(), 1);
        assert_eq!(player.cells[0].mass(), 25.0);
        assert_eq!(player.cells[0].x, 100.0);
        assert_eq!(player.cells[0].y, 125.0);
    }

    #[test]
    fn test_kill_transitions_to_dead() {
        let mut player = Player::new(0, "TestPlayer");
        player.add_cell(0.0, 0.0, 25.0);
        assert!(!player.dead());
        player.kill();
        assert!(player.dead());
        assert_eq!(player.cells.len(), 0);
    }

    #[test]
    fn test_single_cell_location() {
        let mut player = Player::new(0, "TestPlayer");
        player.add_cell(100.0, 100.0, 25.0);
        assert_eq!(player.x(), 100.0);
        assert_eq!(player.y(), 100.0);
    }

    #[test]
    fn test_centroid_location() {
        let mut player = Player::new(0, "TestPlayer");
        player.add_cell(0.0, 0.0, 25.0);
        player.add_cell(2.0, 2.0, 50.0);
        // Centroid is the unweighted mean of cell positions
        assert_eq!(player.x(), 1.0);
        assert_eq!(player.y(), 1.0);
    }

    #[test]
    fn test_total_and_largest_mass() {
        let mut player = Player::new(0, "TestPlayer");
        player.add_cell(0.0, 0.0, 25.0);
        player.add_cell(5.0, 5.0, 40.0);
        assert_eq!(player.total_mass(), 65.0);
        assert_eq!(player.largest_cell_mass(), 40.0);
    }

    #[test]
    fn test_stage_action() {
        let mut player = Player::new(0, "TestPlayer");
        player.stage_action(Action::new(3.0, 4.0, Act::Split));
        assert_eq!(player.action.act, Act::Split);
        assert_eq!(player.action.target_x, 3.0);
    }
}
