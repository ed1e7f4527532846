use macroquad::prelude::*;

use crate::config::{self, SimulationConfig};
use crate::entity::{Agent, AgentId};
use crate::random::RandomSource;
use crate::turns::TurnScheduler;

/// Per-tick acceleration: continuous jitter plus an occasional turn impulse.
#[derive(Clone, Copy, Debug)]
pub struct ForceModel {
    pub jitter_accel: f32,
    pub turn_force: f32,
}

impl ForceModel {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            jitter_accel: config.jitter_accel,
            turn_force: config.turn_force,
        }
    }

    /// Advances the agent's turn schedule when a turn fires.
    pub fn acceleration_for(
        &self,
        id: AgentId,
        now: f64,
        turns: &mut TurnScheduler,
        rng: &mut impl RandomSource,
    ) -> Vec2 {
        let mut accel = vec2(
            rng.uniform_in(-1.0, 1.0) * self.jitter_accel,
            rng.uniform_in(-1.0, 1.0) * self.jitter_accel,
        );

        if turns.is_due(id, now) {
            let theta = rng.angle();
            accel += Vec2::from_angle(theta) * self.turn_force;
            turns.reschedule(id, now, rng);
            turns.record_fired();
        }

        accel
    }
}

/// Semi-implicit Euler with a clamped step and a hard speed ceiling.
#[derive(Clone, Copy, Debug)]
pub struct Integrator {
    pub max_speed: f32,
    pub max_dt: f32,
}

impl Integrator {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            max_speed: config.max_speed,
            max_dt: config.max_dt_seconds,
        }
    }

    /// Effective step length; long host pauses collapse to `max_dt`.
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }

    /// Advance velocity then position. The result may sit outside the
    /// viewport; reflection runs afterwards.
    pub fn step(&self, agent: &mut Agent, acceleration: Vec2, dt: f32) {
        let dt = self.clamp_dt(dt);

        let mut velocity = agent.velocity + acceleration * dt;
        let speed = velocity.length();
        if speed > self.max_speed {
            velocity *= self.max_speed / speed.max(config::SPEED_EPSILON);
        }

        agent.velocity = velocity;
        agent.pos += velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random;

    fn integrator(max_speed: f32, max_dt: f32) -> Integrator {
        Integrator { max_speed, max_dt }
    }

    #[test]
    fn step_applies_velocity_over_dt() {
        let mut agent = Agent::new(100.0);
        agent.pos = vec2(40.0, 60.0);
        agent.velocity = vec2(50.0, 0.0);
        integrator(90.0, 0.05).step(&mut agent, Vec2::ZERO, 0.016);
        assert!((agent.pos.x - 40.8).abs() < 1e-4);
        assert_eq!(agent.pos.y, 60.0);
    }

    #[test]
    fn speed_is_capped_and_direction_kept() {
        let mut agent = Agent::new(10.0);
        agent.velocity = vec2(30.0, 40.0);
        integrator(10.0, 0.05).step(&mut agent, vec2(3000.0, 4000.0), 0.05);
        assert!(agent.speed() <= 10.0 + 1e-4);
        let dir = agent.velocity.normalize();
        assert!((dir - vec2(0.6, 0.8)).length() < 1e-4);
    }

    #[test]
    fn long_pause_moves_no_further_than_max_dt() {
        let integ = integrator(100.0, 0.05);
        let mut paused = Agent::new(10.0);
        paused.velocity = vec2(80.0, -20.0);
        let mut reference = paused.clone();

        integ.step(&mut paused, vec2(5.0, 5.0), 5.0);
        integ.step(&mut reference, vec2(5.0, 5.0), 0.05);
        assert_eq!(paused.pos, reference.pos);
        assert_eq!(paused.velocity, reference.velocity);
    }

    #[test]
    fn bad_dt_is_a_no_op() {
        let integ = integrator(100.0, 0.05);
        let mut agent = Agent::new(10.0);
        agent.velocity = vec2(10.0, 0.0);
        integ.step(&mut agent, Vec2::ZERO, f32::NAN);
        integ.step(&mut agent, Vec2::ZERO, -1.0);
        assert_eq!(agent.pos, Vec2::ZERO);
    }

    #[test]
    fn zero_speed_ceiling_does_not_divide_by_zero() {
        let mut agent = Agent::new(10.0);
        integrator(0.0, 0.05).step(&mut agent, vec2(1e-9, 0.0), 0.01);
        assert!(agent.velocity.x.is_finite());
        assert!(agent.speed() <= 1e-6);
    }

    #[test]
    fn jitter_only_when_no_turn_is_due() {
        let forces = ForceModel {
            jitter_accel: 5.0,
            turn_force: 1000.0,
        };
        let mut turns = TurnScheduler::new(1, [1.5, 3.5]);
        let mut rng = random::seeded(4);
        turns.reset_for_seed(AgentId(0), 0.0, &mut rng);

        for _ in 0..100 {
            let a = forces.acceleration_for(AgentId(0), 0.5, &mut turns, &mut rng);
            assert!(a.x.abs() <= 5.0 && a.y.abs() <= 5.0);
        }
        assert_eq!(turns.fired(), 0);
    }

    #[test]
    fn due_turn_adds_impulse_and_rearms() {
        let forces = ForceModel {
            jitter_accel: 0.0,
            turn_force: 1000.0,
        };
        let mut turns = TurnScheduler::new(1, [1.5, 3.5]);
        let mut rng = random::seeded(4);
        turns.reset_for_seed(AgentId(0), 0.0, &mut rng);

        let a = forces.acceleration_for(AgentId(0), 4.0, &mut turns, &mut rng);
        assert!((a.length() - 1000.0).abs() < 1e-2);
        assert_eq!(turns.fired(), 1);
        assert!(!turns.is_due(AgentId(0), 4.0));
    }

    #[test]
    fn turn_cadence_over_ten_seconds() {
        let forces = ForceModel {
            jitter_accel: 0.0,
            turn_force: 1.0,
        };
        let mut turns = TurnScheduler::new(1, [1.5, 3.5]);
        let mut rng = random::seeded(42);
        turns.reset_for_seed(AgentId(0), 0.0, &mut rng);

        let dt = 1.0 / 60.0;
        for frame in 1..=600 {
            forces.acceleration_for(AgentId(0), frame as f64 * dt, &mut turns, &mut rng);
        }
        let fired = turns.fired();
        assert!(fired >= (10.0f64 / 3.5).floor() as u64);
        assert!(fired <= (10.0f64 / 1.5).ceil() as u64);
    }
}
