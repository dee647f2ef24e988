//! Training plan CLI library.
//!
//! This crate provides the `tp` command-line interface over the rule engine
//! in `tp-core` and the storage in `tp-db`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PresetsAction, RuleSource};
pub use config::Config;
