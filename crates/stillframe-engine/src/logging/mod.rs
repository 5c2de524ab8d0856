//! Logging utilities.
//!
//! Logger initialization lives here so the binary and tests share one setup.
//! Everything else in the workspace logs through the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
