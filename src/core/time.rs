//! Frame clock for driving animation ticks

use std::time::{Duration, Instant};

/// Source of frame timestamps in milliseconds.
///
/// Animation code only ever sees the millisecond values, so a simulated clock and a
/// wall clock are interchangeable.
pub struct FrameClock {
    mode: ClockMode,
    now_ms: f64,
    delta: Duration,
    frame_count: u64,
}

enum ClockMode {
    Wall { start: Instant, last_frame: Instant },
    Fixed { step: Duration },
}

impl FrameClock {
    /// Clock backed by `Instant`, starting at 0 ms.
    pub fn wall() -> Self {
        let now = Instant::now();
        Self {
            mode: ClockMode::Wall { start: now, last_frame: now },
            now_ms: 0.0,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Clock that advances by a fixed step every tick (headless previews and tests).
    pub fn fixed(step: Duration) -> Self {
        Self {
            mode: ClockMode::Fixed { step },
            now_ms: 0.0,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Call once per frame. Returns the new timestamp in milliseconds.
    pub fn tick(&mut self) -> f64 {
        match &mut self.mode {
            ClockMode::Wall { start, last_frame } => {
                let now = Instant::now();
                self.delta = now - *last_frame;
                *last_frame = now;
                self.now_ms = (now - *start).as_secs_f64() * 1000.0;
            }
            ClockMode::Fixed { step } => {
                self.delta = *step;
                self.now_ms += step.as_secs_f64() * 1000.0;
            }
        }
        self.frame_count += 1;
        self.now_ms
    }

    /// Timestamp of the last tick in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::wall()
    }
}
