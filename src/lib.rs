pub mod config;
pub mod data;
pub mod services;
pub mod ui;
pub mod utils;
pub mod view;
pub mod widgets;
