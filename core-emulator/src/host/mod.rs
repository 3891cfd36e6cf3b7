//! Drivers that pace [`Console::run`](crate::Console::run), one frame per tick.

mod unpaced;
pub use unpaced::*;

mod fixed_rate;
pub use fixed_rate::*;

pub trait Host {
    /// Called after each frame that ended at a frame boundary. `frames` counts the frames run
    /// so far.
    fn wait_for_tick(&mut self, frames: u64) -> HostEvent;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Run the next frame.
    Tick,

    /// Stop running.
    Exit,
}
