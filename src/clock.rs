use instant::Instant;

/// Largest step the simulation will take, in seconds. A stall (window dragged,
/// machine asleep) must not teleport the cat across the screen.
pub const MAX_DELTA: f32 = 0.1;

/// Frame clock. Measures the time between consecutive ticks.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    previous: Instant,
    current: Instant,
    delta: f32,
}

impl Clock {
    /// Seed the clock at `now`. The first tick measures from here.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            previous: now,
            current: now,
            delta: 0.0,
        }
    }

    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Advance to the current monotonic time. Returns the clamped delta.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Returns seconds since the previous tick, clamped to
    /// `[0, MAX_DELTA]`.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        self.previous = self.current;
        self.current = now;
        let dt = now.saturating_duration_since(self.previous).as_secs_f32();
        self.delta = dt.min(MAX_DELTA);
        self.delta
    }

    /// Delta computed by the last tick (0 before the first one).
    pub fn delta(&self) -> f32 {
        self.delta
    }
}
