pub mod commands;
pub mod config;
pub mod repl;
pub mod state;
