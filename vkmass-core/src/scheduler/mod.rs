//! Timer queue that drives the per-account automation cycle.

pub mod clock;
pub mod delay;
pub mod driver;

pub use clock::{Clock, ManualClock, TokioClock};
pub use delay::{DelaySource, FixedDelay, UniformDelay, sample_delay};
pub use driver::{COMMENT_DISPLAY_CHARS, CycleDriver, RunSignal, apply_step};
