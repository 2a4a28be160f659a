//! Logging setup.
//!
//! The engine logs through the `log` facade; binaries install `env_logger`
//! once through [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
