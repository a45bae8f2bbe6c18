//! `compile_commands.json` export
//!
//! Writes the clang JSON compilation database for every unit of the last
//! build so editors and linters see the same flags the build used.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::executor::compile_invocation;
use crate::config::BuildConfig;

pub const FILE_NAME: &str = "compile_commands.json";

/// One entry of the compilation database
#[derive(Debug, Serialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    pub arguments: Vec<String>,
    pub output: String,
}

/// Build the database entries for `(source, object)` pairs
pub fn entries<'p>(
    config: &BuildConfig,
    units: impl IntoIterator<Item = (&'p Path, &'p Path)>,
) -> Vec<CompileCommand> {
    let directory = config.root.to_string_lossy().into_owned();

    units
        .into_iter()
        .map(|(source, object)| CompileCommand {
            directory: directory.clone(),
            file: source.to_string_lossy().into_owned(),
            arguments: compile_invocation(config, source, object).to_argv(),
            output: object.to_string_lossy().into_owned(),
        })
        .collect()
}

/// Write the database into the output root, returning its path
pub fn write(config: &BuildConfig, commands: &[CompileCommand]) -> Result<PathBuf> {
    let path = config.build_root().join(FILE_NAME);

    let json = serde_json::to_string_pretty(commands)
        .context("Failed to serialize compilation database")?;

    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
