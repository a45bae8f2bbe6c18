//! Clean command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::utils::terminal::{print_info, print_success};

/// Delete the output tree and recreate it empty
#[derive(Debug, Default)]
pub struct CleanCommand {
    /// Show what would be deleted
    pub dry_run: bool,
}

impl CleanCommand {
    /// Execute the clean command
    ///
    /// A missing output tree is an error, not a no-op.
    pub fn execute(&self, config: &BuildConfig, verbose: bool) -> Result<()> {
        let build_root = config.build_root();
        if !build_root.is_dir() {
            return Err(BuildError::MissingOutputDir { path: build_root }.into());
        }

        let size = get_dir_size(&build_root);
        let name = format!("{}/", config.build_dir.display());

        if self.dry_run {
            println!("  [DRY RUN] Would remove: {} ({})", name, format_size(size));
            return Ok(());
        }

        fs::remove_dir_all(&build_root)
            .with_context(|| format!("Failed to remove {}", build_root.display()))?;
        fs::create_dir(&build_root)
            .with_context(|| format!("Failed to recreate {}", build_root.display()))?;

        if verbose {
            print_info(&format!("recreated empty {}", name));
        }
        print_success(&format!("removed {} ({})", name, format_size(size)));
        Ok(())
    }
}

fn get_dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|entry| entry.metadata().ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}

fn format_size(size_bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}
