use serde::Deserialize;

// Entity masses
pub const PELLET_MASS: f32 = 1.0;
pub const FOOD_MASS: f32 = 10.0;
pub const VIRUS_MASS: f32 = 100.0;

// Mass a freshly spawned (or respawned) player cell starts with.
pub const SPAWN_MASS: f32 = 25.0;

// Radius = RADIUS_SCALE * sqrt(mass). Mass 25 -> radius 5.
pub const RADIUS_SCALE: f32 = 1.0;

// A cell eats another player's cell only when its mass exceeds the
// target's by this ratio.
pub const CONSUME_RATIO: f32 = 1.25;

// Coverage rule for eating cells and viruses: the eater's edge must reach
// within `eater_radius - EAT_OVERLAP * target_radius` of the target center.
pub const EAT_OVERLAP: f32 = 0.5;

// Eating a virus requires mass above this multiple of the virus mass.
pub const VIRUS_EAT_RATIO: f32 = 1.25;

// Number of extra cells a virus pop produces (fragments beyond the
// surviving cell), capped by the per-player cell limit.
pub const VIRUS_FRAGMENTS: usize = 7;

// Splitting
pub const MIN_SPLIT_MASS: f32 = 32.0;
pub const MAX_CELLS_PER_PLAYER: usize = 16;
pub const SPLIT_BOOST: f32 = 12.0;

// Impulse on the surviving half of a split. The launched half gets the
// full SPLIT_BOOST; the survivor follows with half of it.
pub const SPLIT_BOOST_SURVIVOR: f32 = SPLIT_BOOST / 2.0;

// Post-split frames before two sibling cells may merge back together.
pub const MERGE_COOLDOWN_FRAMES: u32 = 300;

// Mass ejection (feeding)
pub const EJECT_MIN_MASS: f32 = 32.0;
pub const EJECT_MASS: f32 = FOOD_MASS;
pub const EJECT_BOOST: f32 = 16.0;

// Boost velocities (splits, ejections) decay by this factor each frame.
pub const BOOST_DECAY: f32 = 0.9;

// Movement speed law: speed = CELL_SPEED / mass^SPEED_MASS_EXPONENT,
// in distance units per frame. Heavier cells move slower.
pub const CELL_SPEED: f32 = 12.0;
pub const SPEED_MASS_EXPONENT: f32 = 0.44;

// Spatial grid bucket size, sized for the largest radius cells are
// expected to reach so query fan-out stays bounded.
pub const GRID_BUCKET_SIZE: f32 = 64.0;

// Attempts per missing pellet when regenerating into unoccupied space.
pub const PELLET_PLACEMENT_ATTEMPTS: usize = 8;

/// Construction parameters for an environment and its engine.
///
/// Defaults mirror the standard difficulty: a 1000-unit arena, 1000
/// regenerating pellets, 25 viruses and 25 bots, with 4 simulation
/// frames per agent decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation frames advanced per environment step.
    pub frames_per_step: u32,
    /// Side length of the square arena, in distance units.
    pub arena_size: f32,
    /// Whether eaten pellets are replaced up to `num_pellets`.
    pub pellet_regen: bool,
    pub num_pellets: usize,
    pub num_viruses: usize,
    pub num_bots: usize,
    /// Whether eliminated bots respawn with a fresh cell. The controlled
    /// player never respawns; its death ends the episode.
    pub respawn_bots: bool,
    /// Optional episode length cap, in environment steps.
    pub max_steps: Option<u32>,
    /// RNG seed for deterministic pellet/virus/spawn placement.
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            frames_per_step: 4,
            arena_size: 1000.0,
            pellet_regen: true,
            num_pellets: 1000,
            num_viruses: 25,
            num_bots: 25,
            respawn_bots: true,
            max_steps: None,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from its JSON representation.
    /// Unspecified fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// Reject malformed parameters at construction time.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::EnvError;
        if self.arena_size <= 0.0 || !self.arena_size.is_finite() {
            return Err(EnvError::InvalidArgument(format!(
                "arena_size must be positive, got {}",
                self.arena_size
            )));
        }
        if self.frames_per_step == 0 {
            return Err(EnvError::InvalidArgument(
                "frames_per_step must be at least 1".into(),
            ));
        }
        if let Some(0) = self.max_steps {
            return Err(EnvError::InvalidArgument(
                "max_steps must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Visual radius for a given mass.
#[inline]
pub fn mass_to_radius(mass: f32) -> f32 {
    RADIUS_SCALE * mass.sqrt()
}

/// Per-frame movement speed for a cell of the given mass.
#[inline]
pub fn speed_for_mass(mass: f32) -> f32 {
    CELL_SPEED / mass.max(1.0).powf(SPEED_MASS_EXPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_arena_rejected() {
        let config = EngineConfig {
            arena_size: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_frames_per_step_rejected() {
        let config = EngineConfig {
            frames_per_step: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"arena_size": 500, "num_bots": 3}"#).unwrap();
        assert_eq!(config.arena_size, 500.0);
        assert_eq!(config.num_bots, 3);
        // Unspecified fields keep their defaults
        assert_eq!(config.frames_per_step, 4);
        assert!(config.pellet_regen);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(EngineConfig::from_json("not json").is_err());
        assert!(EngineConfig::from_json(r#"{"arena_size": -10}"#).is_err());
    }

    #[test]
    fn test_mass_radius_mapping() {
        assert_eq!(mass_to_radius(25.0), 5.0 * RADIUS_SCALE);
        assert!(mass_to_radius(100.0) > mass_to_radius(25.0));
    }

    #[test]
    fn test_heavier_is_slower() {
        assert!(speed_for_mass(25.0) > speed_for_mass(100.0));
    }
}
