//! Built-in bot strategies. A strategy is a pure decision function
//! over a read-only view of the world; the engine stages whatever it
//! returns and the action takes effect on the next frame.

use crate::engine::config::CONSUME_RATIO;
use crate::engine::{Act, Action, Player, WorldState};

/// How far away a bigger enemy cell has to be before a shy bot stops
/// worrying about it.
const FLEE_RADIUS: f32 = 120.0;

/// How far past its own position a fleeing bot aims.
const FLEE_DISTANCE: f32 = 100.0;

/// Decision policy for a bot-controlled player.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// Pick the next action for `player`. Called once per frame while
    /// the player is alive.
    fn choose_action(&self, player: &Player, world: &WorldState) -> Action;
}

/// Heads for the nearest pellet or food, ignoring everything else.
pub struct HungryBot;

/// Like [`HungryBot`], but flees when a cell big enough to eat it
/// comes close.
pub struct HungryShyBot;

/// Chases the nearest enemy cell it can eat, and grazes like
/// [`HungryBot`] when no prey is in reach.
pub struct AggressiveBot;

impl Strategy for HungryBot {
    fn name(&self) -> &'static str {
        "hungry"
    }

    fn choose_action(&self, player: &Player, world: &WorldState) -> Action {
        graze(player, world)
    }
}

impl Strategy for HungryShyBot {
    fn name(&self) -> &'static str {
        "hungry-shy"
    }

    fn choose_action(&self, player: &Player, world: &WorldState) -> Action {
        let (px, py) = (player.x(), player.y());
        let threshold = CONSUME_RATIO * player.largest_cell_mass();

        // Run directly away from the mass-weighted sum of nearby threats.
        let mut away = (0.0f32, 0.0f32);
        let mut threatened = false;
        for pid in world.sorted_pids() {
            if pid == player.pid {
                continue;
            }
            for cell in &world.players[&pid].cells {
                if cell.mass() < threshold {
                    continue;
                }
                let (dx, dy) = (px - cell.x, py - cell.y);
                if dx * dx + dy * dy < FLEE_RADIUS * FLEE_RADIUS {
                    away.0 += dx;
                    away.1 += dy;
                    threatened = true;
                }
            }
        }

        if threatened {
            let norm = (away.0 * away.0 + away.1 * away.1).sqrt().max(1e-6);
            return Action::new(
                px + away.0 / norm * FLEE_DISTANCE,
                py + away.1 / norm * FLEE_DISTANCE,
                Act::None,
            );
        }
        graze(player, world)
    }
}

impl Strategy for AggressiveBot {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn choose_action(&self, player: &Player, world: &WorldState) -> Action {
        let (px, py) = (player.x(), player.y());
        let power = player.largest_cell_mass();

        let mut prey: Option<(f32, f32, f32)> = None;
        for pid in world.sorted_pids() {
            if pid == player.pid {
                continue;
            }
            for cell in &world.players[&pid].cells {
                if power < CONSUME_RATIO * cell.mass() {
                    continue;
                }
                let (dx, dy) = (cell.x - px, cell.y - py);
                let dist2 = dx * dx + dy * dy;
                if prey.map_or(true, |(best, _, _)| dist2 < best) {
                    prey = Some((dist2, cell.x, cell.y));
                }
            }
        }

        match prey {
            Some((_, x, y)) => Action::new(x, y, Act::None),
            None => graze(player, world),
        }
    }
}

/// Head for the nearest pellet or food; hold position in a barren
/// arena.
fn graze(player: &Player, world: &WorldState) -> Action {
    let (px, py) = (player.x(), player.y());
    let mut best: Option<(f32, f32, f32)> = None;

    let mut consider = |x: f32, y: f32| {
        let (dx, dy) = (x - px, y - py);
        let dist2 = dx * dx + dy * dy;
        if best.map_or(true, |(b, _, _)| dist2 < b) {
            best = Some((dist2, x, y));
        }
    };
    for pellet in &world.pellets {
        consider(pellet.x, pellet.y);
    }
    for food in &world.foods {
        consider(food.x, food.y);
    }

    match best {
        Some((_, x, y)) => Action::new(x, y, Act::None),
        None => Action::new(px, py, Act::None),
    }
}

/// The default bot line-up: strategies are dealt round-robin so an
/// arena always mixes temperaments.
pub fn default_roster(count: usize) -> Vec<Box<dyn Strategy>> {
    (0..count)
        .map(|i| -> Box<dyn Strategy> {
            match i % 3 {
                0 => Box::new(HungryBot),
                1 => Box::new(HungryShyBot),
                _ => Box::new(AggressiveBot),
            }
        })
        .collect()
}
