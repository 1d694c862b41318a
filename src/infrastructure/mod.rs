pub mod clock;
pub mod limiter;
pub mod logging;
pub mod persistence;
