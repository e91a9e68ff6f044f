//! code2xml - flatten a project directory or file into one document.
//!
//! Registered in the Explorer context menu as `code2xml "<file>"` for files
//! and `code2xml "<dir>" -i` for directory backgrounds.

#![cfg_attr(all(windows, feature = "windowless"), windows_subsystem = "windows")]

use code2xml::cli;
use code2xml::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));

            for suggestion in e.recovery_suggestions() {
                output.error_detail(&suggestion);
            }

            process::exit(e.exit_code());
        }
    }
}
