//! Logging utilities.
//!
//! Centralizes logger initialization. Code elsewhere only uses the `log`
//! facade; `env_logger` is the backend.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
