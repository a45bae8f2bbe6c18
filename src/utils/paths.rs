//! Path utilities

use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Last modification time of `path`
pub fn modified(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("Failed to read modification time of {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("build/a/b");

        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_modified_missing_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = modified(&temp_dir.path().join("nope.h")).unwrap_err();
        assert!(err.to_string().contains("nope.h"));
    }
}
