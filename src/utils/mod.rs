//! Utility functions and helpers
//!
//! Application paths and the tracing setup shared by the TUI and print mode.

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
