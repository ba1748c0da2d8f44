//! Configuration module
//!
//! Settings loaded from `config.toml` and the command line arguments.

pub mod cli;
pub mod config;
