//! cbuild - incremental build driver for small C projects
//!
//! ## Architecture
//!
//! ```text
//! cli → config (resolve once) → commands/{build,clean} → build/ modules → cc
//! ```

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod utils;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use error::{BuildError, GENERIC_FAILURE_EXIT};
use utils::terminal::print_error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<BuildError>() {
            Some(build_err) => {
                build_err.display_with_hints();
                ExitCode::from(build_err.exit_code())
            }
            None => {
                print_error(&format!("{:#}", err));
                ExitCode::from(GENERIC_FAILURE_EXIT)
            }
        },
    }
}
