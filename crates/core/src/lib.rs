#![forbid(unsafe_code)]

pub mod model;
pub mod navigation;
pub mod session;
pub mod time;
pub mod timer;

pub use session::{Session, SessionError, SessionStatus, Submission, TickOutcome};
pub use time::Clock;
pub use timer::{CountdownTimer, TimerError, TimerStatus, format_remaining};
