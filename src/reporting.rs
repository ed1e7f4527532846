use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

/// Emitted once when the animation stops.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSummary {
    pub ticks: u64,
    pub clamped_ticks: u64,
    pub skipped_ticks: u64,
    pub reseeds: u64,
    pub turns: u64,
    pub dt_ms: DtSummary,
}

/// Frame gaps kept for percentiles; older samples are overwritten.
pub const DT_WINDOW: usize = 1024;

/// Fixed-capacity sample window, oldest overwritten first.
#[derive(Debug, Clone)]
struct RingBuffer {
    data: Vec<f64>,
    head: usize,
    capacity: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            head: 0,
            capacity: capacity.max(1),
        }
    }

    fn push(&mut self, value: f64) {
        if self.data.len() < self.capacity {
            self.data.push(value);
        } else {
            self.data[self.head] = value;
        }
        self.head = (self.head + 1) % self.capacity;
    }

    fn values(&self) -> &[f64] {
        &self.data
    }
}

/// Host cadence as seen by the simulation: frame gaps and how often they
/// had to be clamped. Totals cover every tick; percentiles cover the most
/// recent `DT_WINDOW` ticks.
#[derive(Debug, Clone)]
pub struct FrameReport {
    recent_dt_ms: RingBuffer,
    ticks: u64,
    sum_ms: f64,
    min_ms: f64,
    max_ms: f64,
    clamped: u64,
    skipped: u64,
    reseeds: u64,
}

impl Default for FrameReport {
    fn default() -> Self {
        Self::with_window(DT_WINDOW)
    }
}

impl FrameReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            recent_dt_ms: RingBuffer::new(window),
            ticks: 0,
            sum_ms: 0.0,
            min_ms: f64::INFINITY,
            max_ms: f64::NEG_INFINITY,
            clamped: 0,
            skipped: 0,
            reseeds: 0,
        }
    }

    pub fn record_tick(&mut self, dt: f32, max_dt: f32) {
        let ms = dt as f64 * 1000.0;
        self.recent_dt_ms.push(ms);
        self.ticks += 1;
        self.sum_ms += ms;
        self.min_ms = self.min_ms.min(ms);
        self.max_ms = self.max_ms.max(ms);
        if dt > max_dt {
            self.clamped += 1;
        }
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_reseed(&mut self) {
        self.reseeds += 1;
    }

    /// Samples currently held for percentiles.
    pub fn retained(&self) -> usize {
        self.recent_dt_ms.values().len()
    }

    pub fn summary(&self, turns: u64) -> FrameSummary {
        let dt_ms = if self.ticks == 0 {
            DtSummary::default()
        } else {
            let mut sorted = self.recent_dt_ms.values().to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            DtSummary {
                min: self.min_ms,
                max: self.max_ms,
                mean: self.sum_ms / self.ticks as f64,
                p50: nearest_rank(&sorted, 0.50),
                p95: nearest_rank(&sorted, 0.95),
            }
        };
        FrameSummary {
            ticks: self.ticks,
            clamped_ticks: self.clamped,
            skipped_ticks: self.skipped,
            reseeds: self.reseeds,
            turns,
            dt_ms,
        }
    }
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((p * sorted.len() as f64).ceil() as usize).saturating_sub(1);
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_all_zero() {
        assert_eq!(FrameReport::new().summary(0), FrameSummary::default());
    }

    #[test]
    fn counts_clamped_ticks_and_percentiles() {
        let mut report = FrameReport::new();
        for i in 1..=100 {
            report.record_tick(i as f32 / 1000.0, 0.05);
        }
        report.record_skip();
        report.record_reseed();

        let s = report.summary(3);
        assert_eq!(s.ticks, 100);
        assert_eq!(s.clamped_ticks, 50);
        assert_eq!(s.skipped_ticks, 1);
        assert_eq!(s.reseeds, 1);
        assert_eq!(s.turns, 3);
        assert!((s.dt_ms.p50 - 50.0).abs() < 1e-3);
        assert!((s.dt_ms.p95 - 95.0).abs() < 1e-3);
        assert!((s.dt_ms.max - 100.0).abs() < 1e-3);
    }

    #[test]
    fn an_hour_of_frames_keeps_a_bounded_window() {
        let mut report = FrameReport::new();
        for i in 0..216_000 {
            let dt = if i % 1000 == 0 { 0.2 } else { 1.0 / 60.0 };
            report.record_tick(dt, 0.05);
        }
        assert_eq!(report.retained(), DT_WINDOW);

        let s = report.summary(0);
        assert_eq!(s.ticks, 216_000);
        assert_eq!(s.clamped_ticks, 216);
        assert!((s.dt_ms.max - 200.0).abs() < 1e-3);
        assert!((s.dt_ms.p50 - 1000.0 / 60.0).abs() < 1e-3);
    }

    #[test]
    fn window_reports_most_recent_samples() {
        let mut report = FrameReport::with_window(4);
        for ms in [100.0f32, 100.0, 100.0, 100.0, 10.0, 10.0, 10.0, 10.0] {
            report.record_tick(ms / 1000.0, 1.0);
        }
        let s = report.summary(0);
        assert_eq!(report.retained(), 4);
        assert!((s.dt_ms.p95 - 10.0).abs() < 1e-3);
        assert!((s.dt_ms.max - 100.0).abs() < 1e-3);
        assert!((s.dt_ms.mean - 55.0).abs() < 1e-3);
    }

    #[test]
    fn summary_serializes_camel_case() {
        let json = serde_json::to_string(&FrameReport::new().summary(0)).unwrap();
        assert!(json.contains("\"clampedTicks\":0"));
        assert!(json.contains("\"dtMs\""));
    }
}
