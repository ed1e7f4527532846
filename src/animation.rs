use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use macroquad::prelude::Vec2;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::random::RandomSource;
use crate::reporting::{FrameReport, FrameSummary};
use crate::simulation::{EnsemblePhase, SpriteEnsemble};
use crate::viewport::{ResizeSubscription, Surface, ViewportController};
use crate::world::Viewport;

/// Cancellation token for the frame loop. Clones share one flag.
#[derive(Clone, Debug, Default)]
pub struct LoopHandle {
    cancelled: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Host-facing lifecycle around a sprite ensemble: start, per-frame tick,
/// resize, stop. Stopping also happens on drop.
pub struct SpriteField<S, R> {
    ensemble: Rc<RefCell<SpriteEnsemble<R>>>,
    viewport: ViewportController<S>,
    resize: Option<ResizeSubscription>,
    handle: Option<LoopHandle>,
    report: Rc<RefCell<FrameReport>>,
    /// Latest host clock reading; reseeds count turn timers from it.
    clock: Rc<Cell<f64>>,
    stopped: bool,
}

impl<S: Surface, R: RandomSource + 'static> SpriteField<S, R> {
    pub fn new(config: SimulationConfig, surface: S, rng: R) -> Self {
        Self {
            ensemble: Rc::new(RefCell::new(SpriteEnsemble::new(config, rng))),
            viewport: ViewportController::new(surface),
            resize: None,
            handle: None,
            report: Rc::new(RefCell::new(FrameReport::new())),
            clock: Rc::new(Cell::new(0.0)),
            stopped: false,
        }
    }

    /// Seed against the current surface at host time `now` and begin
    /// accepting ticks.
    pub fn start(&mut self, now: f64) -> LoopHandle {
        if let Some(handle) = &self.handle {
            return handle.clone();
        }
        if self.stopped {
            let handle = LoopHandle::default();
            handle.cancel();
            return handle;
        }

        self.clock.set(now);
        let bounds = self.viewport.measure();
        self.ensemble.borrow_mut().seed(bounds, now);

        let ensemble = Rc::clone(&self.ensemble);
        let report = Rc::clone(&self.report);
        let clock = Rc::clone(&self.clock);
        self.resize = Some(self.viewport.on_resize(move |bounds| {
            ensemble.borrow_mut().seed(bounds, clock.get());
            report.borrow_mut().record_reseed();
        }));

        let handle = LoopHandle::default();
        self.handle = Some(handle.clone());
        info!(width = bounds.width, height = bounds.height, "sprite field started");
        handle
    }

    /// Advance one frame. Returns `false` once the loop has been cancelled
    /// and the host should stop requesting frames.
    pub fn tick(&mut self, now: f64, dt: f32) -> bool {
        let running = match &self.handle {
            Some(handle) => !handle.is_cancelled(),
            None => false,
        };
        if !running {
            if self.handle.is_some() {
                self.stop();
            }
            return false;
        }

        self.clock.set(now);
        self.viewport.poll();
        let bounds = self.viewport.current();

        let mut ensemble = self.ensemble.borrow_mut();
        // First frames can arrive before the surface was measurable.
        if ensemble.phase() == EnsemblePhase::Unseeded {
            ensemble.seed(bounds, now);
        }
        let max_dt = ensemble.config().max_dt_seconds;
        let mut report = self.report.borrow_mut();
        if ensemble.tick(now, dt, bounds) {
            report.record_tick(dt, max_dt);
        } else {
            debug!("tick skipped");
            report.record_skip();
        }
        true
    }

    /// Explicit reseed for hosts that track the surface size themselves.
    pub fn on_resize(&mut self, bounds: Viewport) {
        if self.stopped {
            return;
        }
        self.ensemble.borrow_mut().seed(bounds, self.clock.get());
        self.report.borrow_mut().record_reseed();
    }

    /// Cancel the loop, release the resize subscription and tear the
    /// ensemble down. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        self.resize = None;

        match self.ensemble.try_borrow_mut() {
            Ok(mut ensemble) => ensemble.tear_down(),
            Err(_) => warn!("ensemble busy during stop"),
        }

        let summary = self.summary();
        match serde_json::to_string(&summary) {
            Ok(json) => info!(summary = %json, "sprite field stopped"),
            Err(e) => warn!("could not serialize frame summary: {e}"),
        }
    }

    pub fn positions(&self) -> Ref<'_, [Vec2]> {
        Ref::map(self.ensemble.borrow(), |e| e.positions())
    }

    pub fn sprite_size(&self) -> f32 {
        self.ensemble.borrow().config().sprite_size
    }

    pub fn bounds(&self) -> Viewport {
        self.viewport.current()
    }

    pub fn summary(&self) -> FrameSummary {
        let turns = self.ensemble.try_borrow().map_or(0, |e| e.turns_fired());
        self.report.borrow().summary(turns)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_cancelled())
    }
}

impl<S, R> Drop for SpriteField<S, R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        self.resize = None;
        if let Ok(mut ensemble) = self.ensemble.try_borrow_mut() {
            ensemble.tear_down();
        }
    }
}
