//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the scenewright binary.

mod commands;
mod generate;

pub use commands::{Cli, Commands, GenerateArgs};
pub use generate::run_generate;
