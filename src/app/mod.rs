//! Application module
//!
//! This module contains application-level functionality including:
//! - Process configuration (verbosity)
//! - Logging setup
//! - Fatal error handling and exit codes
//! - Runtime signals

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

// Re-export main application functions
pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use runtime::{cancel_on_ctrl_c, initialize_app, shutdown_signal};
