//! Command line interface for code2xml.
//!
//! This module provides argument parsing, command execution, and colored
//! user feedback for the converter.

mod args;
mod execute;
mod output;

pub use args::{Args, RuntimeConfig};
pub use execute::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
