//! Error types and helpers for user-friendly error messages
//!
//! Every fatal condition of a run maps to one [`BuildError`] variant. The
//! binary downcasts to it to pick the process exit code and to print the
//! attached hint.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ToolStatus;

/// Exit code used when a compile step fails.
pub const TOOLCHAIN_FAILURE_EXIT: u8 = 255;

/// Exit code for every other failure.
pub const GENERIC_FAILURE_EXIT: u8 = 1;

/// Fatal build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Host platform has no configuration table entry
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    /// Project file or resolved configuration is invalid
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Compiler executable not found
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// The compiler returned a non-success status for one unit
    #[error("Compilation of {} failed ({status})", .unit.display())]
    CompileFailed { unit: PathBuf, status: ToolStatus },

    /// The link step returned a non-success status
    #[error("Linking {} failed ({status})", .binary.display())]
    LinkFailed { binary: PathBuf, status: ToolStatus },

    /// Clean was asked to remove an output tree that is not there
    #[error("Output directory does not exist: {}", .path.display())]
    MissingOutputDir { path: PathBuf },
}

impl BuildError {
    /// Create an unsupported platform error
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Process exit code this error terminates the run with
    ///
    /// A failed link hands the linker's own status through when it fits in
    /// an exit code; everything else from the toolchain uses
    /// [`TOOLCHAIN_FAILURE_EXIT`].
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::CompileFailed { .. } => TOOLCHAIN_FAILURE_EXIT,
            BuildError::LinkFailed { status, .. } => match status.code() {
                Some(code) if (1..=255).contains(&code) => code as u8,
                _ => TOOLCHAIN_FAILURE_EXIT,
            },
            _ => GENERIC_FAILURE_EXIT,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            BuildError::Config {
                source: Some(source),
                ..
            } => {
                eprintln!("  {} {:#}", style("caused by:").dim(), source);
            }
            BuildError::MissingTool { required_for, .. } => {
                eprintln!("  {} {}", style("required for:").dim(), required_for);
            }
            _ => {}
        }

        let hint = match self {
            BuildError::Config { hint, .. } => hint.clone(),
            BuildError::MissingTool { hint, .. } => Some(hint.clone()),
            BuildError::UnsupportedPlatform { .. } => Some(hints::unsupported_platform().to_string()),
            BuildError::MissingOutputDir { .. } => Some(hints::missing_output_dir().to_string()),
            BuildError::CompileFailed { .. } | BuildError::LinkFailed { .. } => None,
        };

        if let Some(h) = hint {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Hint for a compiler that is not on PATH
    pub fn compiler(tool: &str) -> String {
        format!(
            "'{}' was not found on PATH. Install it or point `cc` in Build.toml at a compiler:\n\
             • Ubuntu: sudo apt install clang\n\
             • Windows: winget install LLVM.LLVM",
            tool
        )
    }

    /// Hint for hosts without a configuration table entry
    pub fn unsupported_platform() -> &'static str {
        "Only Linux and Windows hosts are supported"
    }

    /// Hint for cleaning a tree that was never built
    pub fn missing_output_dir() -> &'static str {
        "Nothing to clean. Run a build first, or create the directory by hand"
    }

    /// Hint for a malformed Build.toml
    pub fn project_file() -> &'static str {
        "Check Build.toml: allowed sections are [project], [profile.debug], \
         [profile.release], [target.linux] and [target.windows]"
    }
}
