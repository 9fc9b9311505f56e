//! CLI layer for paperseek.
//!
//! Provides the command-line interface using clap, with commands for
//! querying, classifying, evaluating, and inspecting the agent.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
