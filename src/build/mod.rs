//! Incremental build orchestration
//!
//! ## Architecture
//!
//! ```text
//! sources (walk src/) → incremental (stale?) → executor (cc -c ..., cc -o ...)
//! ```
//!
//! ## Modules
//!
//! - `sources` - Source tree enumeration
//! - `depfile` - Parser for compiler-emitted `.d` dependency listings
//! - `incremental` - Timestamp-based staleness detection
//! - `executor` - Compile and link planning and execution
//! - `compile_db` - `compile_commands.json` export

pub mod compile_db;
pub mod depfile;
pub mod executor;
pub mod incremental;
pub mod sources;

use std::path::{Path, PathBuf};

use crate::config::BuildConfig;

pub use executor::{BuildOptions, Executor};
pub use incremental::Staleness;

/// Extension given to object files
pub const OBJECT_EXT: &str = "o";

/// Extension given to dependency listings, next to their object
pub const LISTING_EXT: &str = "d";

/// One compilable source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Path relative to the project root, as passed to the compiler
    path: PathBuf,
    /// Path relative to the source root
    relative: PathBuf,
}

impl SourceUnit {
    /// Create a unit from its path relative to the source root
    pub fn new(config: &BuildConfig, relative: impl Into<PathBuf>) -> Self {
        let relative = relative.into();
        Self {
            path: config.source_dir.join(&relative),
            relative,
        }
    }

    /// Path relative to the project root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Object file, mirrored under the output root
    pub fn object(&self, config: &BuildConfig) -> PathBuf {
        config
            .build_dir
            .join(&self.relative)
            .with_extension(OBJECT_EXT)
    }

    /// Dependency listing the compiler writes next to the object
    pub fn listing(&self, config: &BuildConfig) -> PathBuf {
        self.object(config).with_extension(LISTING_EXT)
    }
}

/// Outcome of one build run
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Every unit's object, compiled or reused, in enumeration order
    pub objects: Vec<PathBuf>,
    /// Every unit's source, parallel to `objects`
    pub sources: Vec<PathBuf>,
    /// Units compiled this run and why
    pub compiled: Vec<(PathBuf, Staleness)>,
    /// Whether the link step ran
    pub linked: bool,
}

impl BuildResult {
    /// Whether any unit was compiled this run
    pub fn any_recompiled(&self) -> bool {
        !self.compiled.is_empty()
    }

    /// Number of units that were already up to date
    pub fn up_to_date(&self) -> usize {
        self.objects.len() - self.compiled.len()
    }
}
