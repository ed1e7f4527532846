use macroquad::prelude::*;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::entity::{Agent, AgentId};
use crate::physics::{ForceModel, Integrator};
use crate::random::RandomSource;
use crate::turns::TurnScheduler;
use crate::world::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnsemblePhase {
    Unseeded,
    Running,
    TornDown,
}

/// The full set of wandering sprites and the per-tick pipeline that
/// moves them: forces, integration, then boundary reflection.
pub struct SpriteEnsemble<R> {
    config: SimulationConfig,
    agents: Vec<Agent>,
    turns: TurnScheduler,
    forces: ForceModel,
    integrator: Integrator,
    rng: R,
    phase: EnsemblePhase,
    /// Published once per tick, after every agent has been updated.
    positions: Vec<Vec2>,
}

impl<R: RandomSource> SpriteEnsemble<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Self {
        let count = config.sprite_count;
        Self {
            agents: vec![Agent::new(config.sprite_size); count],
            turns: TurnScheduler::new(count, config.turn_interval_range),
            forces: ForceModel::new(&config),
            integrator: Integrator::new(&config),
            positions: vec![Vec2::ZERO; count],
            config,
            rng,
            phase: EnsemblePhase::Unseeded,
        }
    }

    /// Scatter every agent across `bounds` with a gentle random heading and
    /// a fresh turn timer counted from `now`. Safe to repeat; a no-op on an
    /// unmeasurable surface or after teardown.
    pub fn seed(&mut self, bounds: Viewport, now: f64) {
        if self.phase == EnsemblePhase::TornDown {
            return;
        }
        if !bounds.is_measurable() {
            debug!(?bounds, "viewport not measurable yet, seeding deferred");
            return;
        }

        let size = self.config.sprite_size;
        let margin = self.config.seed_margin;
        let [lo_frac, hi_frac] = self.config.initial_speed_fraction;
        let max_speed = self.config.max_speed;

        for (idx, agent) in self.agents.iter_mut().enumerate() {
            agent.pos = vec2(
                placement(&mut self.rng, bounds.width, size, margin),
                placement(&mut self.rng, bounds.height, size, margin),
            );
            let heading = self.rng.angle();
            let speed = self.rng.uniform_in(lo_frac, hi_frac) * max_speed;
            agent.velocity = Vec2::from_angle(heading) * speed;
            self.turns.reset_for_seed(AgentId(idx), now, &mut self.rng);
        }

        self.publish();
        if self.phase == EnsemblePhase::Unseeded {
            info!(sprites = self.agents.len(), width = bounds.width, height = bounds.height, "sprite field seeded");
        } else {
            info!(width = bounds.width, height = bounds.height, "sprite field reseeded");
        }
        self.phase = EnsemblePhase::Running;
    }

    /// Advance every agent by `dt` seconds against one viewport snapshot.
    /// Returns `false` when the tick was skipped.
    pub fn tick(&mut self, now: f64, dt: f32, bounds: Viewport) -> bool {
        if self.phase != EnsemblePhase::Running || !bounds.is_measurable() {
            return false;
        }

        for (idx, agent) in self.agents.iter_mut().enumerate() {
            let accel = self
                .forces
                .acceleration_for(AgentId(idx), now, &mut self.turns, &mut self.rng);
            self.integrator.step(agent, accel, dt);
            let (pos, velocity) = bounds.reflect(agent.pos, agent.velocity, agent.size);
            agent.pos = pos;
            agent.velocity = velocity;
        }

        self.publish();
        true
    }

    fn publish(&mut self) {
        self.positions.clear();
        self.positions.extend(self.agents.iter().map(|a| a.pos));
    }
}

impl<R> SpriteEnsemble<R> {
    /// Terminal: later seeds and ticks do nothing.
    pub fn tear_down(&mut self) {
        self.phase = EnsemblePhase::TornDown;
    }

    /// Render-ready top-left corners, one per agent, in id order.
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn phase(&self) -> EnsemblePhase {
        self.phase
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn turns_fired(&self) -> u64 {
        self.turns.fired()
    }
}

/// One coordinate in `[margin, extent - size - margin]`, or the origin
/// when that range is empty.
fn placement(rng: &mut impl RandomSource, extent: f32, size: f32, margin: f32) -> f32 {
    let lo = margin;
    let hi = extent - size - margin;
    if hi < lo {
        return 0.0;
    }
    rng.uniform_in(lo, hi)
}
