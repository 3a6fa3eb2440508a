//! Frame clock with resize-safe time re-basing.

use std::time::{Duration, Instant};

/// A monotonic source of "now", measured from an arbitrary fixed origin.
pub trait TimeSource {
    /// Time since the source's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Tracks elapsed animation time as an explicit `epoch` / `last_elapsed` pair.
///
/// `tick` reports `now - epoch`. `on_resize` moves the epoch to
/// `now - last_elapsed`, so the next tick continues from the last reported
/// value instead of jumping.
#[derive(Debug, Clone)]
pub struct FrameClock<S: TimeSource = MonotonicClock> {
    source: S,
    epoch: Duration,
    last_elapsed: Duration,
}

impl FrameClock<MonotonicClock> {
    /// Creates a clock on the wall-clock source, starting now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(MonotonicClock::new())
    }
}

impl Default for FrameClock<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> FrameClock<S> {
    /// Creates a clock whose epoch is the source's current time.
    pub fn with_source(source: S) -> Self {
        let epoch = source.now();
        Self {
            source,
            epoch,
            last_elapsed: Duration::ZERO,
        }
    }

    /// Computes and records elapsed seconds. Call once per frame.
    pub fn tick(&mut self) -> f32 {
        self.last_elapsed = self.source.now().saturating_sub(self.epoch);
        self.last_elapsed.as_secs_f32()
    }

    /// Re-bases the epoch so the next tick is continuous with the last one.
    pub fn on_resize(&mut self) {
        self.epoch = self.source.now().saturating_sub(self.last_elapsed);
        log::debug!(
            "frame clock re-based at {:.3}s elapsed",
            self.last_elapsed.as_secs_f32()
        );
    }

    /// The value returned by the most recent tick.
    #[must_use]
    pub fn last_elapsed(&self) -> f32 {
        self.last_elapsed.as_secs_f32()
    }

    /// The underlying time source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Hand-driven clock for tests.
    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<Duration>>);

    impl ManualClock {
        fn advance(&self, secs: f32) {
            self.0.set(self.0.get() + Duration::from_secs_f32(secs));
        }
    }

    impl TimeSource for ManualClock {
        fn now(&self) -> Duration {
            self.0.get()
        }
    }

    #[test]
    fn test_tick_reports_elapsed() {
        let source = ManualClock::default();
        source.advance(10.0);
        let mut clock = FrameClock::with_source(source.clone());
        assert_eq!(clock.tick(), 0.0);
        source.advance(1.5);
        assert!((clock.tick() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_resize_keeps_time_continuous() {
        let source = ManualClock::default();
        let mut clock = FrameClock::with_source(source.clone());
        source.advance(3.0);
        let e1 = clock.tick();
        clock.on_resize();
        let e2 = clock.tick();
        assert!((e2 - e1).abs() < 1.0 / 60.0);
        assert!(e2 > 0.0);
    }

    #[test]
    fn test_resize_absorbs_time_since_last_tick() {
        let source = ManualClock::default();
        let mut clock = FrameClock::with_source(source.clone());
        source.advance(2.0);
        let e1 = clock.tick();
        // the window sits mid-resize for a while before the handler fires
        source.advance(5.0);
        clock.on_resize();
        source.advance(0.016);
        let e2 = clock.tick();
        assert!((e2 - (e1 + 0.016)).abs() < 1e-3);
    }

    #[test]
    fn test_monotonic_clock_never_runs_backwards() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(b >= a);
        clock.on_resize();
        assert!(clock.tick() >= b);
    }
}
