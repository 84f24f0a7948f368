pub mod jitter;
pub mod scheduler;
pub mod timer;

pub use jitter::JitterRange;
pub use scheduler::TrialScheduler;
pub use timer::{HighPrecisionTimer, Timer};
