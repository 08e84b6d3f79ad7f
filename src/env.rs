//! The environment facade: an episodic, gym-style wrapper around the
//! engine. One player (the agent) is driven externally through
//! `take_action` and `step`; every other player is a bot.

use crate::bots::default_roster;
use crate::engine::{Act, Action, Engine, EngineConfig, Pid, WorldState};
use crate::error::{EnvError, Result};
use crate::observation::{Encoder, FullEncoder, Observation};
use crate::render::{Camera, Renderer};

/// Where the environment is in its episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Constructed or re-armed; no episode is running yet.
    Reset,
    /// An episode is in progress.
    Running,
    /// The episode terminated; only `reset` moves on from here.
    Done,
}

pub struct Environment {
    config: EngineConfig,
    engine: Engine,
    encoder: Box<dyn Encoder>,
    camera: Camera,
    agent: Pid,
    status: Status,
    steps: u32,
    last_mass: f32,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("agent", &self.agent)
            .field("status", &self.status)
            .field("steps", &self.steps)
            .field("last_mass", &self.last_mass)
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Validate the configuration and build an armed environment. The
    /// agent has no cells until [`reset`](Self::reset) starts an
    /// episode.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let (engine, agent) = Self::build_arena(&config)?;
        Ok(Environment {
            engine,
            agent,
            encoder: Box::new(FullEncoder),
            camera: Camera::new(),
            status: Status::Reset,
            steps: 0,
            last_mass: 0.0,
            config,
        })
    }

    /// Swap the observation encoder. The default is [`FullEncoder`].
    pub fn set_encoder(&mut self, encoder: Box<dyn Encoder>) {
        self.encoder = encoder;
    }

    fn build_arena(config: &EngineConfig) -> Result<(Engine, Pid)> {
        let mut engine = Engine::new(config.clone())?;
        for (i, strategy) in default_roster(config.num_bots).into_iter().enumerate() {
            let name = format!("{}-{}", strategy.name(), i);
            engine.add_bot(&name, strategy);
        }
        let agent = engine.add_player("agent");
        Ok((engine, agent))
    }

    /// Start a fresh episode and return its first observation. The
    /// arena is rebuilt from scratch, so with a fixed seed every reset
    /// replays the same initial layout.
    pub fn reset(&mut self) -> Result<Observation> {
        let (engine, agent) = Self::build_arena(&self.config)?;
        self.engine = engine;
        self.agent = agent;
        self.engine.spawn_cell(agent)?;
        self.last_mass = self.engine.world.players[&agent].total_mass();
        self.steps = 0;
        self.status = Status::Running;
        self.camera.follow(&self.engine.world.players[&agent]);
        tracing::info!(
            agent,
            bots = self.config.num_bots,
            cells = self.engine.world.cell_count(),
            arena = self.config.arena_size,
            "episode reset"
        );
        self.get_state()
    }

    /// Stage the agent's next action. It takes effect over the frames
    /// of the next [`step`](Self::step) call; calling again before
    /// stepping replaces the previous action.
    pub fn take_action(&mut self, target_x: f32, target_y: f32, act: Act) -> Result<()> {
        if self.status != Status::Running {
            return Err(EnvError::InvalidState("take_action outside a running episode"));
        }
        self.engine.take_action(self.agent, Action::new(target_x, target_y, act))
    }

    /// Advance the episode by one environment step (a fixed number of
    /// simulation frames) and return the reward: the change in the
    /// agent's total mass over the step.
    pub fn step(&mut self) -> Result<f32> {
        match self.status {
            Status::Reset => return Err(EnvError::InvalidState("step before reset")),
            Status::Done => return Err(EnvError::InvalidState("step after episode end")),
            Status::Running => {}
        }

        for _ in 0..self.config.frames_per_step {
            self.engine.advance();
        }
        self.steps += 1;

        let agent = &self.engine.world.players[&self.agent];
        let mass = agent.total_mass();
        let reward = mass - self.last_mass;
        self.last_mass = mass;
        self.camera.follow(agent);

        if agent.dead() {
            tracing::info!(steps = self.steps, "agent eliminated, episode done");
            self.status = Status::Done;
        } else if self.config.max_steps.is_some_and(|max| self.steps >= max) {
            tracing::info!(steps = self.steps, "step limit reached, episode done");
            self.status = Status::Done;
        }
        Ok(reward)
    }

    /// Encode the current world from the agent's point of view. Pure:
    /// repeated calls on the same state return identical observations.
    pub fn get_state(&self) -> Result<Observation> {
        if self.status == Status::Done {
            return Err(EnvError::InvalidState("get_state after episode end"));
        }
        let agent = &self.engine.world.players[&self.agent];
        Ok(self.encoder.encode(agent, &self.engine.world))
    }

    pub fn done(&self) -> bool {
        self.status == Status::Done
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn agent_pid(&self) -> Pid {
        self.agent
    }

    pub fn world(&self) -> &WorldState {
        &self.engine.world
    }

    /// Direct engine access, for embedders that script scenarios.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Draw the current frame through the given renderer, with the
    /// camera tracking the agent.
    pub fn render(&mut self, renderer: &mut dyn Renderer) {
        self.camera.follow(&self.engine.world.players[&self.agent]);
        renderer.render(&self.camera, &self.engine.world);
    }
}
