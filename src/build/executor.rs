//! Compile and link orchestration
//!
//! Units are processed one at a time in enumeration order. A unit is
//! compiled when it has no object or the staleness check says so, and the
//! final binary is linked only when at least one unit was compiled.

use std::path::Path;

use anyhow::Result;

use super::incremental::StalenessDetector;
use super::sources::sources;
use super::{BuildResult, SourceUnit};
use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::exec::{Invocation, Toolchain};
use crate::utils::paths::ensure_dir;
use crate::utils::terminal::{print_command, print_info};

/// Flags asking the compiler to write a `.d` listing with phony header rules
pub const DEPENDENCY_FLAGS: [&str; 2] = ["-MMD", "-MP"];

/// Options for one executor run
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Echo commands without running them, creating directories or touching sources
    pub dry_run: bool,
    /// Print why each unit is compiled
    pub verbose: bool,
}

/// `<cc> <cflags> -MMD -MP -c <source> -o <object>`
pub fn compile_invocation(config: &BuildConfig, source: &Path, object: &Path) -> Invocation {
    Invocation::new(&config.cc)
        .args(&config.flags().cflags)
        .args(DEPENDENCY_FLAGS)
        .arg("-c")
        .arg(source)
        .arg("-o")
        .arg(object)
}

/// `<cc> <ldflags> <objects...> -o <binary> <libs...>`
pub fn link_invocation<P: AsRef<Path>>(config: &BuildConfig, objects: &[P]) -> Invocation {
    Invocation::new(&config.cc)
        .args(&config.flags().ldflags)
        .args(objects.iter().map(|o| o.as_ref()))
        .arg("-o")
        .arg(&config.binary)
        .args(&config.libs)
}

/// Drives one build over a configuration and a toolchain
pub struct Executor<'a, T: Toolchain> {
    config: &'a BuildConfig,
    toolchain: T,
    options: BuildOptions,
}

impl<'a, T: Toolchain> Executor<'a, T> {
    pub fn new(config: &'a BuildConfig, toolchain: T, options: BuildOptions) -> Self {
        Self {
            config,
            toolchain,
            options,
        }
    }

    /// Build every stale unit, then link if anything was compiled
    ///
    /// The first failing compile aborts the run with
    /// [`BuildError::CompileFailed`]; objects already written stay in place.
    pub fn run(&mut self) -> Result<BuildResult> {
        let config = self.config;
        let detector = StalenessDetector::new(config, self.options.dry_run);
        let mut result = BuildResult::default();

        for unit in sources(config) {
            let object = unit.object(config);
            let verdict = detector.check(&unit)?;

            if verdict.is_stale() {
                if self.options.verbose {
                    print_info(&format!("{}: {}", unit.path().display(), verdict));
                }
                self.compile(&unit, &object)?;
                result.compiled.push((unit.path().to_path_buf(), verdict));
            }

            result.sources.push(unit.path().to_path_buf());
            result.objects.push(object);
        }

        if result.any_recompiled() {
            self.link(&result.objects)?;
            result.linked = true;
        }

        Ok(result)
    }

    fn compile(&mut self, unit: &SourceUnit, object: &Path) -> Result<()> {
        if !self.options.dry_run {
            if let Some(dir) = object.parent() {
                ensure_dir(&self.config.root.join(dir))?;
            }
        }

        let invocation = compile_invocation(self.config, unit.path(), object);
        print_command(&invocation);
        if self.options.dry_run {
            return Ok(());
        }

        let status = self.toolchain.run(&invocation)?;
        if !status.success() {
            return Err(BuildError::CompileFailed {
                unit: unit.path().to_path_buf(),
                status,
            }
            .into());
        }
        Ok(())
    }

    fn link(&mut self, objects: &[std::path::PathBuf]) -> Result<()> {
        let invocation = link_invocation(self.config, objects);
        print_command(&invocation);
        if self.options.dry_run {
            return Ok(());
        }

        let status = self.toolchain.run(&invocation)?;
        if !status.success() {
            return Err(BuildError::LinkFailed {
                binary: self.config.binary.clone(),
                status,
            }
            .into());
        }
        Ok(())
    }
}
