//! logpane: a terminal log viewer over `logpane-core`.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod keymap;
pub mod page;
pub mod single_log;
pub mod tail;
pub mod theme;
pub mod widgets;
