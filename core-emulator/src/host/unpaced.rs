use super::{Host, HostEvent};

/// A host which ticks immediately, optionally stopping after a number of frames.
pub struct UnpacedHost {
    frame_limit: Option<u64>,
}

impl UnpacedHost {
    pub fn new(frame_limit: Option<u64>) -> Self {
        Self { frame_limit }
    }
}

impl Host for UnpacedHost {
    fn wait_for_tick(&mut self, frames: u64) -> HostEvent {
        match self.frame_limit {
            Some(limit) if frames >= limit => HostEvent::Exit,
            _ => HostEvent::Tick,
        }
    }
}
