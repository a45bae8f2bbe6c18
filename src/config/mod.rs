//! Build configuration
//!
//! A [`BuildConfig`] is resolved once at startup from the host platform, the
//! debug/release selector and the optional `Build.toml` project file, and is
//! then shared read-only with every stage of the run.
//!
//! ## Defaults
//!
//! | key            | linux      | windows      |
//! |----------------|------------|--------------|
//! | binary         | `app`      | `app.exe`    |
//! | link libraries | `-pthread` | `-lws2_32`   |
//!
//! Debug compiles with `-g -Wall -O0`; release compiles with
//! `-g -Wall -Ofast -march=native` and links with `-O3`.

pub mod project_toml;
pub mod validation;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::BuildError;

pub use project_toml::ProjectFile;

pub const DEFAULT_CC: &str = "clang";
pub const DEFAULT_NAME: &str = "app";
pub const DEFAULT_SOURCE_DIR: &str = "src";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_SOURCE_EXT: &str = ".c";
pub const DEFAULT_HEADER_EXT: &str = ".h";

/// Host platforms with a configuration table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Platform of the running host
    pub fn host() -> Result<Self, BuildError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (`linux`, `windows`, case-insensitive) to a platform
    pub fn from_os(os: &str) -> Result<Self, BuildError> {
        if os.eq_ignore_ascii_case("linux") {
            Ok(Platform::Linux)
        } else if os.eq_ignore_ascii_case("windows") {
            Ok(Platform::Windows)
        } else {
            Err(BuildError::unsupported_platform(os))
        }
    }

    /// Output binary file name for a binary stem
    pub fn binary_name(&self, stem: &str) -> String {
        match self {
            Platform::Linux => stem.to_string(),
            Platform::Windows => format!("{}.exe", stem),
        }
    }

    /// Libraries appended to every link command
    pub fn default_libs(&self) -> Vec<String> {
        match self {
            Platform::Linux => vec!["-pthread".to_string()],
            Platform::Windows => vec!["-lws2_32".to_string()],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => write!(f, "linux"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

/// Build mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Debug,
    Release,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Debug => write!(f, "debug"),
            Mode::Release => write!(f, "release"),
        }
    }
}

/// Compiler and linker flags for one mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub cflags: Vec<String>,
    pub ldflags: Vec<String>,
}

impl ModeFlags {
    fn debug() -> Self {
        Self {
            cflags: words(&["-g", "-Wall", "-O0"]),
            ldflags: Vec::new(),
        }
    }

    fn release() -> Self {
        Self {
            cflags: words(&["-g", "-Wall", "-Ofast", "-march=native"]),
            ldflags: words(&["-O3"]),
        }
    }
}

/// What the staleness check does to a source whose header changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TouchPolicy {
    /// Headers are compared against the source, and a source with a newer
    /// header gets its modification time bumped so the next run sees the
    /// source itself as newer than its object until it is rebuilt.
    #[default]
    Touch,
    /// Sources are never modified; headers are compared against the object.
    Leave,
}

/// Immutable configuration for one run
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory every relative path below is resolved against
    pub root: PathBuf,
    pub platform: Platform,
    pub mode: Mode,
    /// Compiler, also used as the link driver
    pub cc: String,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub source_ext: String,
    pub header_ext: String,
    /// Output binary path, relative to `root`
    pub binary: PathBuf,
    pub libs: Vec<String>,
    pub debug: ModeFlags,
    pub release: ModeFlags,
    pub touch: TouchPolicy,
}

impl BuildConfig {
    /// Built-in configuration table entry for `platform` and `mode`
    pub fn defaults(root: &Path, platform: Platform, mode: Mode) -> Self {
        Self {
            root: root.to_path_buf(),
            platform,
            mode,
            cc: DEFAULT_CC.to_string(),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            source_ext: DEFAULT_SOURCE_EXT.to_string(),
            header_ext: DEFAULT_HEADER_EXT.to_string(),
            binary: PathBuf::from(platform.binary_name(DEFAULT_NAME)),
            libs: platform.default_libs(),
            debug: ModeFlags::debug(),
            release: ModeFlags::release(),
            touch: TouchPolicy::default(),
        }
    }

    /// Resolve the configuration for a project root
    ///
    /// Reads `Build.toml` from `root` when present.
    pub fn resolve(root: &Path, platform: Platform, mode: Mode) -> Result<Self> {
        let project = ProjectFile::load(root)?.unwrap_or_default();
        Self::from_project(root, platform, mode, project)
    }

    /// Apply a parsed project file on top of the defaults and validate
    pub fn from_project(
        root: &Path,
        platform: Platform,
        mode: Mode,
        project: ProjectFile,
    ) -> Result<Self> {
        let mut config = Self::defaults(root, platform, mode);
        let ProjectFile {
            project: section,
            profile,
            target,
        } = project;

        if let Some(name) = section.name {
            config.binary = PathBuf::from(platform.binary_name(&name));
        }
        if let Some(cc) = section.cc {
            config.cc = cc;
        }
        if let Some(dir) = section.source_dir {
            config.source_dir = PathBuf::from(dir);
        }
        if let Some(dir) = section.build_dir {
            config.build_dir = PathBuf::from(dir);
        }
        if let Some(ext) = section.source_ext {
            config.source_ext = ext;
        }
        if let Some(ext) = section.header_ext {
            config.header_ext = ext;
        }
        if section.touch_sources == Some(false) {
            config.touch = TouchPolicy::Leave;
        }

        if let Some(flags) = profile.debug {
            flags.apply(&mut config.debug);
        }
        if let Some(flags) = profile.release {
            flags.apply(&mut config.release);
        }

        let libs = match platform {
            Platform::Linux => target.linux,
            Platform::Windows => target.windows,
        };
        if let Some(libs) = libs {
            config.libs = libs.libs;
        }

        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Override the touch policy before the configuration is shared
    pub fn with_touch_policy(mut self, touch: TouchPolicy) -> Self {
        self.touch = touch;
        self
    }

    /// Flags of the active mode
    pub fn flags(&self) -> &ModeFlags {
        match self.mode {
            Mode::Debug => &self.debug,
            Mode::Release => &self.release,
        }
    }

    /// Absolute source root
    pub fn source_root(&self) -> PathBuf {
        self.root.join(&self.source_dir)
    }

    /// Absolute output root
    pub fn build_root(&self) -> PathBuf {
        self.root.join(&self.build_dir)
    }

    /// Print the resolved configuration (verbose mode)
    pub fn print_summary(&self) {
        println!("   platform: {}, mode: {}", self.platform, self.mode);
        println!("   compiler: {} {}", self.cc, self.flags().cflags.join(" "));
        println!(
            "   layout:   {}/*{} -> {}/",
            self.source_dir.display(),
            self.source_ext,
            self.build_dir.display()
        );
        println!("   binary:   {} {}", self.binary.display(), self.libs.join(" "));
    }
}

fn words(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|f| f.to_string()).collect()
}
