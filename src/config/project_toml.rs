//! Build.toml parsing
//!
//! The project file is optional and every key in it is optional. Whatever
//! it sets replaces the built-in default for that key.
//!
//! ```toml
//! [project]
//! name = "glr"
//! cc = "clang"
//! source_dir = "src"
//! build_dir = "build"
//! source_ext = ".c"
//! header_ext = ".h"
//! touch_sources = true
//!
//! [profile.release]
//! cflags = ["-g", "-Wall", "-Ofast", "-march=native"]
//! ldflags = ["-O3"]
//!
//! [target.linux]
//! libs = ["-pthread"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ModeFlags;
use crate::error::{hints, BuildError};

/// Root of Build.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub profile: ProfileSection,

    #[serde(default)]
    pub target: TargetSection,
}

/// `[project]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Binary stem; `.exe` is appended on Windows
    pub name: Option<String>,
    pub cc: Option<String>,
    pub source_dir: Option<String>,
    pub build_dir: Option<String>,
    pub source_ext: Option<String>,
    pub header_ext: Option<String>,
    pub touch_sources: Option<bool>,
}

/// `[profile.*]` sections
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSection {
    pub debug: Option<ProfileFlags>,
    pub release: Option<ProfileFlags>,
}

/// Flags of one profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFlags {
    pub cflags: Option<Vec<String>>,
    pub ldflags: Option<Vec<String>>,
}

impl ProfileFlags {
    /// Replace the flags that this profile sets
    pub fn apply(self, flags: &mut ModeFlags) {
        if let Some(cflags) = self.cflags {
            flags.cflags = cflags;
        }
        if let Some(ldflags) = self.ldflags {
            flags.ldflags = ldflags;
        }
    }
}

/// `[target.*]` sections
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
    pub linux: Option<TargetLibs>,
    pub windows: Option<TargetLibs>,
}

/// Link libraries of one platform
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetLibs {
    #[serde(default)]
    pub libs: Vec<String>,
}

impl ProjectFile {
    pub const FILE_NAME: &'static str = "Build.toml";

    /// Load Build.toml from a project root, if it exists
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(Self::FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).map(Some)
    }

    /// Parse Build.toml content
    pub fn parse(content: &str) -> Result<Self> {
        let project: Self = toml::from_str(content).map_err(|e| {
            BuildError::config_error_with_hint(
                format!("Failed to parse {}", Self::FILE_NAME),
                Some(e.into()),
                hints::project_file(),
            )
        })?;
        Ok(project)
    }
}
