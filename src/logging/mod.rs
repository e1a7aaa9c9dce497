//! Logging setup.
//!
//! - Custom log formatting with bracketed output
//! - stdout output, plus an optional timestamped log file

mod formatter;
mod setup;

pub use setup::setup_logging;
