use std::{
    thread,
    time::{Duration, Instant},
};

use tracing::trace;

use super::{Host, HostEvent};

pub const DEFAULT_FRAME_RATE: u32 = 60;

/// A host which starts a frame every `1 / frame_rate` seconds.
///
/// A frame that overruns its slot pushes every later deadline back, so slow frames never cause
/// a burst of catch-up frames.
pub struct FixedRateHost {
    period: Duration,
    next_tick: Instant,
    frame_limit: Option<u64>,
}

impl FixedRateHost {
    pub fn new(frame_rate: u32, frame_limit: Option<u64>) -> Self {
        let period = Duration::from_secs(1) / frame_rate.max(1);
        Self {
            period,
            next_tick: Instant::now() + period,
            frame_limit,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for FixedRateHost {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE, None)
    }
}

impl Host for FixedRateHost {
    fn wait_for_tick(&mut self, frames: u64) -> HostEvent {
        if let Some(limit) = self.frame_limit {
            if frames >= limit {
                return HostEvent::Exit;
            }
        }

        let now = Instant::now();
        if let Some(remaining) = self.next_tick.checked_duration_since(now) {
            thread::sleep(remaining);
            self.next_tick += self.period;
        } else {
            trace!(frames, behind = ?now - self.next_tick, "frame overran its slot");
            self.next_tick = now + self.period;
        }

        HostEvent::Tick
    }
}
