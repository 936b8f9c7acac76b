//! Shared utilities

pub mod logger;
pub mod timer;

pub use logger::{init_logger, LogLevel, UnknownLogLevel};
pub use timer::{whole_millis, Timer};
