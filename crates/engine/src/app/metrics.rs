use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub worst_tick_ms: f32,
}

/// Rolls frame and tick counts over a fixed wall-clock interval.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
    worst_tick: Duration,
    latest: LoopMetricsSnapshot,
}

impl LoopMetrics {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
            worst_tick: Duration::ZERO,
            latest: LoopMetricsSnapshot::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, tick_duration: Duration) {
        self.ticks = self.ticks.saturating_add(1);
        self.worst_tick = self.worst_tick.max(tick_duration);
    }

    pub(crate) fn latest(&self) -> LoopMetricsSnapshot {
        self.latest
    }

    /// Closes the interval once it has elapsed and returns the new snapshot.
    pub(crate) fn roll_interval(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() * 1000.0 / self.frames as f32
        };
        self.latest = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            worst_tick_ms: self.worst_tick.as_secs_f32() * 1000.0,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;
        self.worst_tick = Duration::ZERO;

        Some(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_snapshot_computes_rates() {
        let base = Instant::now();
        let mut metrics = LoopMetrics::new(Duration::from_secs(1), base);

        metrics.record_frame(Duration::from_millis(16));
        metrics.record_frame(Duration::from_millis(16));
        for tick_ms in [1, 3, 2, 1] {
            metrics.record_tick(Duration::from_millis(tick_ms));
        }

        let snapshot = metrics
            .roll_interval(base + Duration::from_secs(1))
            .expect("interval elapsed");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 16.0).abs() < 0.001);
        assert!((snapshot.worst_tick_ms - 3.0).abs() < 0.001);
        assert_eq!(metrics.latest(), snapshot);
    }

    #[test]
    fn no_snapshot_before_interval_elapses() {
        let base = Instant::now();
        let mut metrics = LoopMetrics::new(Duration::from_secs(1), base);
        metrics.record_frame(Duration::from_millis(16));

        assert!(metrics
            .roll_interval(base + Duration::from_millis(500))
            .is_none());
        assert_eq!(metrics.latest(), LoopMetricsSnapshot::default());
    }

    #[test]
    fn rolling_resets_worst_tick() {
        let base = Instant::now();
        let mut metrics = LoopMetrics::new(Duration::from_secs(1), base);
        metrics.record_tick(Duration::from_millis(9));
        metrics.roll_interval(base + Duration::from_secs(1));

        metrics.record_tick(Duration::from_millis(2));
        let snapshot = metrics
            .roll_interval(base + Duration::from_secs(2))
            .expect("second interval");
        assert!((snapshot.worst_tick_ms - 2.0).abs() < 0.001);
    }
}
