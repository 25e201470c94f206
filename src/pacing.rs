// FPS measurement. The cap itself is minifb's `set_target_fps`.
// Visual expectation: with debug logging on, an "FPS: 60.0" line every second.
use std::time::{Duration, Instant};

/// Counts frames and reports the rate roughly once per second.
pub struct FpsCounter {
    since: Instant,
    frames: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self { since: now, frames: 0 }
    }

    /// Record one presented frame; returns the FPS when a full second has passed.
    pub fn frame(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.duration_since(self.since);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.since = now;
        Some(fps)
    }
}
