/// Frame timing decoupled from any particular render loop
use std::time::Duration;

use crate::animator::sanitize_delta;

/// Time handed to a frame handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the first frame
    pub elapsed: f64,
    /// Seconds since the previous frame
    pub delta: f32,
}

/// Anything driven once per rendered frame
pub trait FrameHandler {
    fn on_frame(&mut self, tick: FrameTick);
}

/// Turns host timestamps into monotonic frame ticks
///
/// The first timestamp starts the clock with a zero delta. A timestamp older
/// than the previous one also yields a zero delta.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Duration>,
    elapsed: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Record a frame at host time `now`
    pub fn advance(&mut self, now: Duration) -> FrameTick {
        let delta = match self.last {
            Some(last) if now > last => (now - last).as_secs_f32(),
            _ => 0.0,
        };
        if self.last.map_or(true, |last| now > last) {
            self.last = Some(now);
        }

        let delta = sanitize_delta(delta);
        self.elapsed += f64::from(delta);
        self.frames += 1;

        FrameTick {
            elapsed: self.elapsed,
            delta,
        }
    }

    /// Record a frame and forward it to `handler`
    pub fn drive<H: FrameHandler + ?Sized>(&mut self, now: Duration, handler: &mut H) -> FrameTick {
        let tick = self.advance(now);
        handler.on_frame(tick);
        tick
    }
}
