//! Configuration validation with helpful error messages

use std::path::{Component, Path};

use anyhow::Result;

use super::BuildConfig;
use crate::error::BuildError;

/// Validate a resolved configuration
pub fn validate_config(config: &BuildConfig) -> Result<()> {
    require_non_empty("cc", &config.cc)?;
    require_non_empty("name", &config.binary.to_string_lossy())?;
    require_non_empty("source_dir", &config.source_dir.to_string_lossy())?;
    require_non_empty("build_dir", &config.build_dir.to_string_lossy())?;

    validate_extension("source_ext", &config.source_ext)?;
    validate_extension("header_ext", &config.header_ext)?;

    if config.source_ext == config.header_ext {
        return Err(BuildError::config_error_with_hint(
            format!(
                "source_ext and header_ext are both '{}'",
                config.source_ext
            ),
            None,
            "Use distinct extensions, e.g. source_ext = \".c\" and header_ext = \".h\"",
        )
        .into());
    }

    validate_build_dir(&config.build_dir, &config.source_dir)?;

    Ok(())
}

/// build_dir must be a relative subdirectory of the project that neither
/// is nor contains source_dir
fn validate_build_dir(build_dir: &Path, source_dir: &Path) -> Result<()> {
    let build = normalized(build_dir);
    let source = normalized(source_dir);

    let escapes = build
        .iter()
        .any(|c| !matches!(c, Component::Normal(_)));
    if build.is_empty() || escapes {
        return Err(BuildError::config_error_with_hint(
            format!(
                "build_dir '{}' must be a subdirectory of the project",
                build_dir.display()
            ),
            None,
            "Use a relative path without '..', e.g. build_dir = \"build\"",
        )
        .into());
    }

    if source.starts_with(&build) {
        return Err(BuildError::config_error_with_hint(
            format!(
                "build_dir '{}' contains source_dir '{}'",
                build_dir.display(),
                source_dir.display()
            ),
            None,
            "Cleaning deletes build_dir, so it must not be or contain the source directory",
        )
        .into());
    }

    Ok(())
}

/// Path components with `.` segments dropped
fn normalized(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn require_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BuildError::config_error_with_hint(
            format!("'{}' cannot be empty", key),
            None,
            format!("Remove '{}' from Build.toml to use the default", key),
        )
        .into());
    }
    Ok(())
}

fn validate_extension(key: &str, ext: &str) -> Result<()> {
    if !ext.starts_with('.') || ext.len() < 2 {
        return Err(BuildError::config_error_with_hint(
            format!("Invalid {} '{}'", key, ext),
            None,
            format!("Extensions include the leading dot, e.g. {} = \".c\"", key),
        )
        .into());
    }
    if ext.contains(['/', '\\', ':']) {
        return Err(BuildError::config_error(format!(
            "Invalid {} '{}': must not contain path separators or ':'",
            key, ext
        ))
        .into());
    }
    Ok(())
}
