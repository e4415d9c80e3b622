use std::time::{Duration, Instant};

/// Source of monotonically increasing frame timestamps.
pub trait TickSource {
    /// Timestamp of the current frame, measured from an arbitrary origin.
    fn now(&mut self) -> Duration;
}

/// Deterministic source that advances by a fixed step on every frame.
#[derive(Clone, Copy, Debug)]
pub struct FixedStep {
    step: Duration,
    now: Duration,
}

impl FixedStep {
    /// Creates a source starting at zero and advancing by `step` per frame.
    #[must_use]
    pub const fn new(step: Duration) -> Self {
        Self {
            step,
            now: Duration::ZERO,
        }
    }
}

impl TickSource for FixedStep {
    fn now(&mut self) -> Duration {
        let current = self.now;
        self.now = self.now.saturating_add(self.step);
        current
    }
}

/// Source backed by the monotonic system clock.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    /// Creates a source whose origin is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for WallClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}
