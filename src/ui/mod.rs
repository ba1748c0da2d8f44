//! Terminal user interface
//!
//! The card screen, its grid layout and the plain table output used by print mode.

pub mod app;
pub mod card_grid;
pub mod table_display;
