//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::commands::{build::BuildCommand, clean::CleanCommand};
use crate::config::{BuildConfig, Mode, Platform};

/// Words that select what a run does; any order, any position
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Selector {
    /// Delete and recreate the build directory instead of building
    Clean,
    /// Use release flags instead of debug flags
    Release,
}

/// cbuild - incremental build driver for C projects
///
/// Recompiles sources whose objects are missing or out of date (including
/// through headers, via the compiler's dependency listings) and relinks the
/// binary when anything was recompiled.
#[derive(Parser, Debug)]
#[command(name = "cbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// `clean` and/or `release`; without them a debug build runs
    #[arg(value_enum)]
    pub selectors: Vec<Selector>,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Print commands without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    #[command(flatten)]
    pub build: BuildCommand,
}

impl Cli {
    /// Mode picked by the selectors
    pub fn mode(&self) -> Mode {
        if self.selectors.contains(&Selector::Release) {
            Mode::Release
        } else {
            Mode::Debug
        }
    }

    /// Whether this run cleans instead of building
    pub fn is_clean(&self) -> bool {
        self.selectors.contains(&Selector::Clean)
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let root = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };

        let platform = Platform::host()?;
        let config = BuildConfig::resolve(&root, platform, self.mode())?;
        let touch = self.build.touch_policy(config.touch);
        let config = config.with_touch_policy(touch);

        if self.verbose {
            config.print_summary();
        }

        if self.is_clean() {
            CleanCommand {
                dry_run: self.dry_run,
            }
            .execute(&config, self.verbose)
        } else {
            self.build.execute(&config, self.dry_run, self.verbose)
        }
    }
}
