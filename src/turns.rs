use crate::entity::AgentId;
use crate::random::RandomSource;

/// Independent per-agent countdowns deciding when a large turn fires.
///
/// Times are seconds on the host's monotonic clock.
pub struct TurnScheduler {
    next_turn_at: Vec<f64>,
    interval: [f32; 2],
    fired: u64,
}

impl TurnScheduler {
    pub fn new(agent_count: usize, interval: [f32; 2]) -> Self {
        Self {
            next_turn_at: vec![f64::INFINITY; agent_count],
            interval,
            fired: 0,
        }
    }

    pub fn is_due(&self, id: AgentId, now: f64) -> bool {
        self.next_turn_at
            .get(id.0)
            .map_or(false, |&at| now >= at)
    }

    /// Arm the next turn one random interval after `now`.
    pub fn reschedule(&mut self, id: AgentId, now: f64, rng: &mut impl RandomSource) {
        let wait = rng.uniform_in(self.interval[0], self.interval[1]) as f64;
        if let Some(slot) = self.next_turn_at.get_mut(id.0) {
            *slot = now + wait;
        }
    }

    /// Same as `reschedule`; called at (re)seed so agents start out of phase.
    pub fn reset_for_seed(&mut self, id: AgentId, now: f64, rng: &mut impl RandomSource) {
        self.reschedule(id, now, rng);
    }

    pub fn record_fired(&mut self) {
        self.fired += 1;
    }

    /// Turn impulses applied since construction.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    pub fn next_turn_at(&self, id: AgentId) -> Option<f64> {
        self.next_turn_at.get(id.0).copied()
    }
}
