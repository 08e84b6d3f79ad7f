//! The authoritative simulation engine: owns the world state and the
//! spatial index, and advances the arena one fixed-duration frame at a
//! time. Deterministic given the world state, staged actions and the
//! RNG seed.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bots::Strategy;
use crate::error::Result;

use super::config::*;
use super::entity::{Cell, Food, Pellet, Velocity, Virus};
use super::player::{Act, Action, Pid, Player};
use super::spatial::{EntityKind, SpatialEntry, SpatialGrid};
use super::world::WorldState;

/// Top-level game state and frame loop.
pub struct Engine {
    pub world: WorldState,
    config: EngineConfig,
    grid: SpatialGrid,
    rng: StdRng,
    next_pid: Pid,
    /// Bot-controlled players and their decision strategies.
    strategies: HashMap<Pid, Box<dyn Strategy>>,
    frame: u64,
}

impl Engine {
    /// Create an engine with the initial pellet and virus population.
    /// Players (and bots) are added separately.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid = SpatialGrid::new(config.arena_size);
        let mut engine = Engine {
            world: WorldState::new(),
            grid,
            rng,
            next_pid: 0,
            strategies: HashMap::new(),
            frame: 0,
            config,
        };
        engine.populate();
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn arena_size(&self) -> f32 {
        self.config.arena_size
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Add a (dead) player and return its identifier. The player comes
    /// alive once a cell is spawned for it.
    pub fn add_player(&mut self, name: &str) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        self.world.players.insert(pid, Player::new(pid, name));
        pid
    }

    /// Add a bot-controlled player driven by the given strategy, and
    /// spawn its first cell.
    pub fn add_bot(&mut self, name: &str, strategy: Box<dyn Strategy>) -> Pid {
        let pid = self.add_player(name);
        self.strategies.insert(pid, strategy);
        // The pid was just inserted, so the spawn cannot fail.
        let _ = self.spawn_cell(pid);
        pid
    }

    pub fn is_bot(&self, pid: Pid) -> bool {
        self.strategies.contains_key(&pid)
    }

    /// Spawn a fresh starting cell for the player at a random position.
    pub fn spawn_cell(&mut self, pid: Pid) -> Result<()> {
        let x = self.rng.gen_range(0.0..self.config.arena_size);
        let y = self.rng.gen_range(0.0..self.config.arena_size);
        self.world.player_mut(pid)?.add_cell(x, y, SPAWN_MASS);
        Ok(())
    }

    /// Stage a player's next movement target and discrete action.
    /// Targets outside the arena are clamped, never rejected.
    pub fn take_action(&mut self, pid: Pid, action: Action) -> Result<()> {
        let arena = self.config.arena_size;
        let clamped = Action {
            target_x: action.target_x.clamp(0.0, arena),
            target_y: action.target_y.clamp(0.0, arena),
            act: action.act,
        };
        self.world.player_mut(pid)?.stage_action(clamped);
        Ok(())
    }

    /// Advance the simulation by exactly one frame.
    pub fn advance(&mut self) {
        self.integrate_motion();
        self.apply_actions();
        self.drive_bots();
        self.rebuild_spatial_index();
        self.resolve_consumption();
        self.merge_sibling_cells();
        if self.config.pellet_regen {
            self.regenerate_pellets();
        }
        self.eliminate_players();
        self.frame += 1;
    }

    // --- Frame steps ---

    /// Apply current velocities to positions, clamp to arena bounds,
    /// decay boosts and tick down merge cooldowns.
    fn integrate_motion(&mut self) {
        let arena = self.config.arena_size;
        for player in self.world.players.values_mut() {
            for cell in &mut player.cells {
                cell.x = (cell.x + cell.velocity.dx + cell.boost.dx).clamp(0.0, arena);
                cell.y = (cell.y + cell.velocity.dy + cell.boost.dy).clamp(0.0, arena);
                cell.boost.decay();
                cell.merge_cooldown = cell.merge_cooldown.saturating_sub(1);
            }
        }
        for food in &mut self.world.foods {
            food.x = (food.x + food.boost.dx).clamp(0.0, arena);
            food.y = (food.y + food.boost.dy).clamp(0.0, arena);
            food.boost.decay();
        }
    }

    /// Point every cell's steering velocity at its owner's target, and
    /// perform any requested split or ejection. Split/feed requests are
    /// one-shot; the movement target persists across frames.
    fn apply_actions(&mut self) {
        for pid in self.world.sorted_pids() {
            let player = self.world.players.get_mut(&pid).expect("pid from key set");
            let action = player.action;
            player.action.act = Act::None;

            for cell in &mut player.cells {
                let (dx, dy) = direction(cell.x, cell.y, action.target_x, action.target_y);
                let speed = speed_for_mass(cell.mass());
                cell.velocity = Velocity::new(dx * speed, dy * speed);
            }

            match action.act {
                Act::None => {}
                Act::Split => Self::split_player(player),
                Act::Feed => {
                    let foods = Self::eject_food(player);
                    self.world.foods.extend(foods);
                }
            }
        }
    }

    /// Each cell above the minimum splittable mass divides into two
    /// cells of half mass, both launched toward the target: the new
    /// one at full boost, the survivor at half.
    fn split_player(player: &mut Player) {
        let (tx, ty) = (player.action.target_x, player.action.target_y);
        let count = player.cells.len();
        let mut spawned = Vec::new();
        for cell in &mut player.cells {
            if count + spawned.len() >= MAX_CELLS_PER_PLAYER {
                break;
            }
            if cell.mass() < MIN_SPLIT_MASS {
                continue;
            }
            let half = cell.mass() / 2.0;
            let (dx, dy) = direction(cell.x, cell.y, tx, ty);
            cell.set_mass(half);
            cell.boost = Velocity::new(dx * SPLIT_BOOST_SURVIVOR, dy * SPLIT_BOOST_SURVIVOR);
            cell.merge_cooldown = MERGE_COOLDOWN_FRAMES;

            let mut child = Cell::new(cell.x, cell.y, half);
            child.boost = Velocity::new(dx * SPLIT_BOOST, dy * SPLIT_BOOST);
            child.merge_cooldown = MERGE_COOLDOWN_FRAMES;
            spawned.push(child);
        }
        player.cells.extend(spawned);
    }

    /// Each cell above the ejection threshold sheds a food pellet
    /// toward the target, losing the ejected mass.
    fn eject_food(player: &mut Player) -> Vec<Food> {
        let (tx, ty) = (player.action.target_x, player.action.target_y);
        let mut foods = Vec::new();
        for cell in &mut player.cells {
            if cell.mass() < EJECT_MIN_MASS {
                continue;
            }
            cell.set_mass(cell.mass() - EJECT_MASS);
            let (dx, dy) = direction(cell.x, cell.y, tx, ty);
            // Spawn clear of the ejecting cell so it is not re-eaten
            // on the same frame.
            let offset = cell.radius() + 2.0 * mass_to_radius(EJECT_MASS);
            let mut food = Food::new(cell.x + dx * offset, cell.y + dy * offset);
            food.boost = Velocity::new(dx * EJECT_BOOST, dy * EJECT_BOOST);
            foods.push(food);
        }
        foods
    }

    /// Ask each bot strategy for its next action and stage it. A staged
    /// action takes effect on the next frame's steering pass.
    fn drive_bots(&mut self) {
        let mut staged: Vec<(Pid, Action)> = Vec::new();
        for pid in self.world.sorted_pids() {
            let Some(strategy) = self.strategies.get(&pid) else {
                continue;
            };
            let player = self.world.players.get(&pid).expect("pid from key set");
            if player.dead() {
                continue;
            }
            staged.push((pid, strategy.choose_action(player, &self.world)));
        }
        for (pid, action) in staged {
            // pid is known to exist; clamping happens in take_action
            let _ = self.take_action(pid, action);
        }
    }

    /// Rebuild the spatial index over every entity position.
    fn rebuild_spatial_index(&mut self) {
        self.grid.clear();
        for (index, p) in self.world.pellets.iter().enumerate() {
            self.grid.insert(SpatialEntry {
                kind: EntityKind::Pellet,
                pid: 0,
                index,
                x: p.x,
                y: p.y,
                radius: p.radius(),
            });
        }
        for (index, v) in self.world.viruses.iter().enumerate() {
            self.grid.insert(SpatialEntry {
                kind: EntityKind::Virus,
                pid: 0,
                index,
                x: v.x,
                y: v.y,
                radius: v.radius(),
            });
        }
        for (index, f) in self.world.foods.iter().enumerate() {
            self.grid.insert(SpatialEntry {
                kind: EntityKind::Food,
                pid: 0,
                index,
                x: f.x,
                y: f.y,
                radius: f.radius(),
            });
        }
        for pid in self.world.sorted_pids() {
            let player = &self.world.players[&pid];
            for (index, c) in player.cells.iter().enumerate() {
                self.grid.insert(SpatialEntry {
                    kind: EntityKind::Cell,
                    pid,
                    index,
                    x: c.x,
                    y: c.y,
                    radius: c.radius(),
                });
            }
        }
    }

    /// Resolve all consumption for this frame. Eaters are processed in
    /// ascending (pid, cell index) order so simultaneous mutual
    /// eligibility breaks ties stably, and every eaten entity is marked
    /// before the single sweep at the end so nothing is consumed twice.
    fn resolve_consumption(&mut self) {
        let pids = self.world.sorted_pids();
        let mut pellet_eaten = vec![false; self.world.pellets.len()];
        let mut food_eaten = vec![false; self.world.foods.len()];
        let mut virus_eaten = vec![false; self.world.viruses.len()];
        let mut cell_eaten: HashMap<Pid, Vec<bool>> = pids
            .iter()
            .map(|&p| (p, vec![false; self.world.players[&p].cells.len()]))
            .collect();

        for &pid in &pids {
            let cell_count = cell_eaten[&pid].len();
            for i in 0..cell_count {
                if cell_eaten[&pid][i] {
                    continue;
                }
                let (ax, ay, mut amass) = {
                    let c = &self.world.players[&pid].cells[i];
                    (c.x, c.y, c.mass())
                };
                let mut popped_virus = false;

                for entry in self.grid.query_circle(ax, ay, mass_to_radius(amass)) {
                    let aradius = mass_to_radius(amass);
                    match entry.kind {
                        EntityKind::Pellet => {
                            if !pellet_eaten[entry.index]
                                && touches(ax, ay, aradius, entry.x, entry.y, entry.radius)
                            {
                                pellet_eaten[entry.index] = true;
                                amass += PELLET_MASS;
                            }
                        }
                        EntityKind::Food => {
                            if !food_eaten[entry.index]
                                && touches(ax, ay, aradius, entry.x, entry.y, entry.radius)
                            {
                                food_eaten[entry.index] = true;
                                amass += FOOD_MASS;
                            }
                        }
                        EntityKind::Virus => {
                            if !virus_eaten[entry.index]
                                && amass >= VIRUS_EAT_RATIO * VIRUS_MASS
                                && covers(ax, ay, aradius, entry.x, entry.y, entry.radius)
                            {
                                virus_eaten[entry.index] = true;
                                popped_virus = true;
                            }
                        }
                        EntityKind::Cell => {
                            // A player's own cells never eat each other;
                            // they rejoin only via the merge step.
                            if entry.pid == pid {
                                continue;
                            }
                            if cell_eaten[&entry.pid][entry.index] {
                                continue;
                            }
                            let bmass =
                                self.world.players[&entry.pid].cells[entry.index].mass();
                            if amass >= CONSUME_RATIO * bmass
                                && covers(ax, ay, aradius, entry.x, entry.y, entry.radius)
                            {
                                cell_eaten.get_mut(&entry.pid).expect("tracked pid")
                                    [entry.index] = true;
                                amass += bmass;
                            }
                        }
                    }
                }

                let player = self.world.players.get_mut(&pid).expect("pid from key set");
                if popped_virus {
                    Self::fragment_cell(player, i, amass);
                } else {
                    player.cells[i].set_mass(amass);
                }
            }
        }

        // Single sweep: remove everything marked eaten this frame.
        retain_unmarked(&mut self.world.pellets, &pellet_eaten);
        retain_unmarked(&mut self.world.foods, &food_eaten);
        retain_unmarked(&mut self.world.viruses, &virus_eaten);
        for &pid in &pids {
            let eaten = &cell_eaten[&pid];
            let player = self.world.players.get_mut(&pid).expect("pid from key set");
            let mut index = 0;
            player.cells.retain(|_| {
                // Cells appended by virus pops sit past the marker vec
                // and are always kept.
                let keep = index >= eaten.len() || !eaten[index];
                index += 1;
                keep
            });
        }
    }

    /// A virus pop: split the cell at `index` into fragments of equal
    /// mass launched radially. Total fragment mass equals the cell's
    /// pre-pop mass; the virus mass itself is not gained. A player
    /// already at the cell cap absorbs the virus mass instead.
    fn fragment_cell(player: &mut Player, index: usize, mass: f32) {
        let slots = MAX_CELLS_PER_PLAYER.saturating_sub(player.cells.len());
        let fragments = VIRUS_FRAGMENTS.min(slots);
        if fragments == 0 {
            player.cells[index].set_mass(mass + VIRUS_MASS);
            return;
        }

        let piece = mass / (fragments + 1) as f32;
        let (x, y) = (player.cells[index].x, player.cells[index].y);
        {
            let cell = &mut player.cells[index];
            cell.set_mass(piece);
            cell.merge_cooldown = MERGE_COOLDOWN_FRAMES;
        }
        for k in 0..fragments {
            let angle = 2.0 * std::f32::consts::PI * k as f32 / fragments as f32;
            let mut child = Cell::new(x, y, piece);
            child.boost = Velocity::new(angle.cos() * SPLIT_BOOST, angle.sin() * SPLIT_BOOST);
            child.merge_cooldown = MERGE_COOLDOWN_FRAMES;
            player.cells.push(child);
        }
    }

    /// Merge same-player cells that are past their cooldown and now
    /// overlap, into one cell of summed mass at the mass-weighted
    /// centroid. Merged cells can cascade within the same frame.
    fn merge_sibling_cells(&mut self) {
        for player in self.world.players.values_mut() {
            let mut i = 0;
            while i < player.cells.len() {
                if player.cells[i].merge_cooldown > 0 {
                    i += 1;
                    continue;
                }
                let mut j = i + 1;
                while j < player.cells.len() {
                    let mergeable = player.cells[j].merge_cooldown == 0 && {
                        let (a, b) = (&player.cells[i], &player.cells[j]);
                        a.overlaps(b.x, b.y, b.radius())
                    };
                    if mergeable {
                        let (ma, mb) = (player.cells[i].mass(), player.cells[j].mass());
                        let (bx, by) = (player.cells[j].x, player.cells[j].y);
                        let total = ma + mb;
                        let cell = &mut player.cells[i];
                        cell.x = (cell.x * ma + bx * mb) / total;
                        cell.y = (cell.y * ma + by * mb) / total;
                        cell.add_mass(mb);
                        player.cells.remove(j);
                    } else {
                        j += 1;
                    }
                }
                i += 1;
            }
        }
    }

    /// Top the pellet population back up to the configured count, at
    /// random positions outside any live cell. Placement attempts are
    /// bounded; a crowded arena just regenerates fewer pellets this
    /// frame.
    fn regenerate_pellets(&mut self) {
        let arena = self.config.arena_size;
        while self.world.pellets.len() < self.config.num_pellets {
            let mut placed = false;
            for _ in 0..PELLET_PLACEMENT_ATTEMPTS {
                let x = self.rng.gen_range(0.0..arena);
                let y = self.rng.gen_range(0.0..arena);
                if !self.grid.point_occupied_by_cell(x, y) {
                    self.world.pellets.push(Pellet::new(x, y));
                    placed = true;
                    break;
                }
            }
            if !placed {
                break;
            }
        }
    }

    /// Log eliminations and respawn dead bots when configured. The
    /// identifier of an eliminated player stays valid for respawn.
    fn eliminate_players(&mut self) {
        for pid in self.world.sorted_pids() {
            if !self.world.players[&pid].dead() {
                continue;
            }
            if self.strategies.contains_key(&pid) {
                tracing::debug!(pid, frame = self.frame, "bot eliminated");
                if self.config.respawn_bots {
                    let _ = self.spawn_cell(pid);
                }
            } else {
                tracing::debug!(pid, frame = self.frame, "player eliminated");
            }
        }
    }

    // --- Initial population ---

    /// Scatter the initial pellets and viruses.
    fn populate(&mut self) {
        let arena = self.config.arena_size;
        for _ in 0..self.config.num_pellets {
            let x = self.rng.gen_range(0.0..arena);
            let y = self.rng.gen_range(0.0..arena);
            self.world.pellets.push(Pellet::new(x, y));
        }
        for _ in 0..self.config.num_viruses {
            let x = self.rng.gen_range(0.0..arena);
            let y = self.rng.gen_range(0.0..arena);
            self.world.viruses.push(Virus::new(x, y));
        }
    }
}

/// Unit direction from (x, y) toward (tx, ty); zero when already there.
fn direction(x: f32, y: f32, tx: f32, ty: f32) -> (f32, f32) {
    let dx = tx - x;
    let dy = ty - y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < 1e-6 {
        (0.0, 0.0)
    } else {
        (dx / dist, dy / dist)
    }
}

/// Plain circle overlap, used for always-edible pellets and foods.
fn touches(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    let reach = ar + br;
    dx * dx + dy * dy < reach * reach
}

/// Coverage rule for eating cells and viruses: the eater must reach
/// within `ar - EAT_OVERLAP * br` of the target center.
fn covers(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    let reach = ar - EAT_OVERLAP * br;
    reach > 0.0 && dx * dx + dy * dy < reach * reach
}

/// Drop every element whose index is marked.
fn retain_unmarked<T>(items: &mut Vec<T>, marked: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !marked[index];
        index += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An empty arena: no pellets, viruses, bots or regen.
    fn bare_config() -> EngineConfig {
        EngineConfig {
            arena_size: 1000.0,
            num_pellets: 0,
            num_viruses: 0,
            num_bots: 0,
            pellet_regen: false,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn engine_with_player() -> (Engine, Pid) {
        let mut engine = Engine::new(bare_config()).unwrap();
        let pid = engine.add_player("agent");
        (engine, pid)
    }

    #[test]
    fn test_take_action_unknown_pid() {
        let mut engine = Engine::new(bare_config()).unwrap();
        let err = engine
            .take_action(42, Action::new(0.0, 0.0, Act::None))
            .unwrap_err();
        assert_eq!(err, crate::error::EnvError::NotFound(42));
    }

    #[test]
    fn test_action_target_clamped_to_arena() {
        let (mut engine, pid) = engine_with_player();
        engine
            .take_action(pid, Action::new(-500.0, 99999.0, Act::None))
            .unwrap();
        let action = engine.world.players[&pid].action;
        assert_eq!(action.target_x, 0.0);
        assert_eq!(action.target_y, 1000.0);
    }

    #[test]
    fn test_pellet_consumed_on_overlap() {
        let (mut engine, pid) = engine_with_player();
        engine.world.players.get_mut(&pid).unwrap().add_cell(500.0, 500.0, 25.0);
        engine.world.pellets.push(Pellet::new(503.0, 500.0));
        engine.advance();
        assert!(engine.world.pellets.is_empty());
        assert_eq!(
            engine.world.players[&pid].cells[0].mass(),
            25.0 + PELLET_MASS
        );
    }

    #[test]
    fn test_cell_eats_smaller_cell_mass_conserved() {
        let (mut engine, a) = engine_with_player();
        let b = engine.add_player("victim");
        engine.world.players.get_mut(&a).unwrap().add_cell(500.0, 500.0, 100.0);
        engine.world.players.get_mut(&b).unwrap().add_cell(502.0, 500.0, 25.0);
        engine.advance();
        assert_eq!(engine.world.players[&a].cells[0].mass(), 125.0);
        assert!(engine.world.players[&b].dead());
    }

    #[test]
    fn test_no_consumption_below_mass_ratio() {
        let (mut engine, a) = engine_with_player();
        let b = engine.add_player("peer");
        // 1.2x is below the 1.25x threshold: nobody eats anybody.
        engine.world.players.get_mut(&a).unwrap().add_cell(500.0, 500.0, 30.0);
        engine.world.players.get_mut(&b).unwrap().add_cell(500.5, 500.0, 25.0);
        engine.advance();
        assert_eq!(engine.world.players[&a].cells.len(), 1);
        assert_eq!(engine.world.players[&b].cells.len(), 1);
    }

    #[test]
    fn test_own_cells_never_eat_each_other() {
        let (mut engine, pid) = engine_with_player();
        let player = engine.world.players.get_mut(&pid).unwrap();
        player.add_cell(500.0, 500.0, 100.0);
        player.add_cell(500.5, 500.0, 25.0);
        // Keep them apart from the merge path too.
        for cell in &mut player.cells {
            cell.merge_cooldown = MERGE_COOLDOWN_FRAMES;
        }
        engine.advance();
        let player = &engine.world.players[&pid];
        assert_eq!(player.cells.len(), 2);
        assert_eq!(player.total_mass(), 125.0);
    }

    #[test]
    fn test_split_conserves_mass() {
        let (mut engine, pid) = engine_with_player();
        engine.world.players.get_mut(&pid).unwrap().add_cell(500.0, 500.0, 64.0);
        engine
            .take_action(pid, Action::new(600.0, 500.0, Act::Split))
            .unwrap();
        engine.advance();
        let player = &engine.world.players[&pid];
        assert_eq!(player.cells.len(), 2);
        assert_eq!(player.total_mass(), 64.0);
        assert_eq!(player.cells[0].mass(), 32.0);
        assert_eq!(player.cells[1].mass(), 32.0);
        assert!(player.cells.iter().all(|c| c.merge_cooldown > 0));
    }

    #[test]
    fn test_small_cell_does_not_split() {
        let (mut engine, pid) = engine_with_player();
        engine
            .world
            .players
            .get_mut(&pid)
            .unwrap()
            .add_cell(500.0, 500.0, MIN_SPLIT_MASS - 1.0);
        engine
            .take_action(pid, Action::new(600.0, 500.0, Act::Split))
            .unwrap();
        engine.advance();
        assert_eq!(engine.world.players[&pid].cells.len(), 1);
    }

    #[test]
    fn test_split_respects_cell_cap() {
        let (mut engine, pid) = engine_with_player();
        {
            let player = engine.world.players.get_mut(&pid).unwrap();
            for _ in 0..MAX_CELLS_PER_PLAYER {
                player.add_cell(500.0, 500.0, 64.0);
            }
            for cell in &mut player.cells {
                cell.merge_cooldown = MERGE_COOLDOWN_FRAMES;
            }
        }
        engine
            .take_action(pid, Action::new(600.0, 500.0, Act::Split))
            .unwrap();
        engine.advance();
        assert_eq!(engine.world.players[&pid].cells.len(), MAX_CELLS_PER_PLAYER);
    }

    #[test]
    fn test_split_boosts_both_halves() {
        let (mut engine, pid) = engine_with_player();
        engine.world.players.get_mut(&pid).unwrap().add_cell(500.0, 500.0, 64.0);
        engine
            .take_action(pid, Action::new(600.0, 500.0, Act::Split))
            .unwrap();
        engine.advance();
        let player = &engine.world.players[&pid];
        // Both halves launch toward the target, the new one harder.
        assert_eq!(player.cells[0].boost.dx, SPLIT_BOOST_SURVIVOR);
        assert_eq!(player.cells[1].boost.dx, SPLIT_BOOST);
        assert_eq!(player.cells[0].boost.dy, 0.0);
    }

    #[test]
    fn test_virus_absorbed_at_cell_cap() {
        let (mut engine, pid) = engine_with_player();
        {
            let player = engine.world.players.get_mut(&pid).unwrap();
            for i in 0..MAX_CELLS_PER_PLAYER {
                player.add_cell(30.0 + 60.0 * i as f32, 100.0, 200.0);
            }
        }
        engine.world.viruses.push(Virus::new(30.0, 100.0));
        engine.advance();
        let player = &engine.world.players[&pid];
        // No free cell slot: the virus is swallowed whole instead of
        // fragmenting the cell.
        assert!(engine.world.viruses.is_empty());
        assert_eq!(player.cells.len(), MAX_CELLS_PER_PLAYER);
        assert_eq!(player.cells[0].mass(), 200.0 + VIRUS_MASS);
        let expected = MAX_CELLS_PER_PLAYER as f32 * 200.0 + VIRUS_MASS;
        assert!((player.total_mass() - expected).abs() < 1e-2);
    }

    #[test]
    fn test_feed_ejects_food() {
        let (mut engine, pid) = engine_with_player();
        engine.world.players.get_mut(&pid).unwrap().add_cell(500.0, 500.0, 64.0);
        engine
            .take_action(pid, Action::new(600.0, 500.0, Act::Feed))
            .unwrap();
        engine.advance();
        assert_eq!(engine.world.foods.len(), 1);
        let player = &engine.world.players[&pid];
        assert_eq!(player.cells[0].mass(), 64.0 - EJECT_MASS);
        // Ejected toward the target, so to the right of the cell.
        assert!(engine.world.foods[0].x > player.cells[0].x);
    }

    #[test]
    fn test_virus_pop_conserves_cell_mass() {
        let (mut engine, pid) = engine_with_player();
        engine.world.players.get_mut(&pid).unwrap().add_cell(500.0, 500.0, 200.0);
        engine.world.viruses.push(Virus::new(500.0, 500.0));
        engine.advance();
        let player = &engine.world.players[&pid];
        assert!(engine.world.viruses.is_empty());
        assert_eq!(player.cells.len(), 1 + VIRUS_FRAGMENTS);
        let total: f32 = player.total_mass();
        assert!((total - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_small_cell_cannot_eat_virus() {
        let (mut engine, pid) = engine_with_player();
        // Below VIRUS_EAT_RATIO * VIRUS_MASS.
        engine.world.players.get_mut(&pid).unwrap().add_cell(500.0, 500.0, 110.0);
        engine.world.viruses.push(Virus::new(500.0, 500.0));
        engine.advance();
        assert_eq!(engine.world.viruses.len(), 1);
        assert_eq!(engine.world.players[&pid].cells.len(), 1);
    }

    #[test]
    fn test_merge_waits_for_cooldown() {
        let (mut engine, pid) = engine_with_player();
        {
            let player = engine.world.players.get_mut(&pid).unwrap();
            player.add_cell(500.0, 500.0, 32.0);
            player.add_cell(501.0, 500.0, 32.0);
            for cell in &mut player.cells {
                cell.merge_cooldown = 2;
            }
        }
        engine.advance();
        assert_eq!(engine.world.players[&pid].cells.len(), 2);
        engine.advance();
        engine.advance();
        let player = &engine.world.players[&pid];
        assert_eq!(player.cells.len(), 1);
        assert_eq!(player.cells[0].mass(), 64.0);
    }

    #[test]
    fn test_merge_at_weighted_centroid() {
        let (mut engine, pid) = engine_with_player();
        {
            let player = engine.world.players.get_mut(&pid).unwrap();
            player.add_cell(500.0, 500.0, 30.0);
            player.add_cell(506.0, 500.0, 10.0);
        }
        // Hold position so motion does not drift the cells first.
        engine
            .take_action(pid, Action::new(500.0, 500.0, Act::None))
            .unwrap();
        engine.advance();
        let player = &engine.world.players[&pid];
        assert_eq!(player.cells.len(), 1);
        // 3:1 mass ratio puts the centroid a quarter of the way over.
        assert!((player.cells[0].x - 501.5).abs() < 1.0);
    }

    #[test]
    fn test_pellet_regen_restores_count() {
        let config = EngineConfig {
            num_pellets: 50,
            pellet_regen: true,
            num_viruses: 0,
            num_bots: 0,
            seed: Some(3),
            ..Default::default()
        };
        let mut engine = Engine::new(config).unwrap();
        assert_eq!(engine.world.pellets.len(), 50);
        engine.world.pellets.truncate(30);
        engine.advance();
        assert_eq!(engine.world.pellets.len(), 50);
    }

    #[test]
    fn test_no_pellet_regen_when_disabled() {
        let mut engine = Engine::new(bare_config()).unwrap();
        engine.advance();
        assert!(engine.world.pellets.is_empty());
    }

    #[test]
    fn test_motion_clamped_to_arena() {
        let (mut engine, pid) = engine_with_player();
        {
            let player = engine.world.players.get_mut(&pid).unwrap();
            player.add_cell(2.0, 2.0, 25.0);
            player.cells[0].boost = Velocity::new(-50.0, -50.0);
        }
        engine.advance();
        let cell = &engine.world.players[&pid].cells[0];
        assert_eq!(cell.x, 0.0);
        assert_eq!(cell.y, 0.0);
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let run = || {
            let config = EngineConfig {
                num_pellets: 100,
                num_viruses: 5,
                seed: Some(99),
                ..Default::default()
            };
            let mut engine = Engine::new(config).unwrap();
            let pid = engine.add_player("agent");
            engine.spawn_cell(pid).unwrap();
            engine
                .take_action(pid, Action::new(900.0, 900.0, Act::None))
                .unwrap();
            for _ in 0..20 {
                engine.advance();
            }
            let p = &engine.world.players[&pid];
            (p.total_mass(), p.x(), p.y(), engine.world.pellets.len())
        };
        assert_eq!(run(), run());
    }
}
