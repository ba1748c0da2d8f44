//! Service layer
//!
//! Runs the view without the TUI for print and export.

pub mod batch_runner;
