//! View state
//!
//! The controller holding the displayed patients and sort direction,
//! and the commands the UI sends it.

pub mod controller;
pub mod dispatcher;
pub mod events;
