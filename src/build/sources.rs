//! Source tree enumeration

use walkdir::WalkDir;

use super::SourceUnit;
use crate::config::BuildConfig;

/// Lazily walk the source root and yield every file ending in the source
/// extension
///
/// Each call starts a fresh walk. Entries come in file-name order within a
/// directory; unreadable entries are skipped and a missing source root
/// yields nothing. Symlinked files are included, symlinked directories are
/// not descended into.
pub fn sources(config: &BuildConfig) -> impl Iterator<Item = SourceUnit> + '_ {
    let source_root = config.source_root();

    WalkDir::new(&source_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.path().is_file())
        .filter(move |entry| {
            entry
                .file_name()
                .to_string_lossy()
                .ends_with(config.source_ext.as_str())
        })
        .filter_map(move |entry| {
            let relative = entry.path().strip_prefix(&source_root).ok()?;
            Some(SourceUnit::new(config, relative))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, Mode, Platform};
    use std::fs;
    use std::path::{Path, PathBuf};

    fn tree(files: &[&str]) -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = temp_dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        temp_dir
    }

    fn paths(config: &BuildConfig) -> Vec<PathBuf> {
        sources(config).map(|u| u.path().to_path_buf()).collect()
    }

    #[test]
    fn test_recursive_walk_filters_by_extension() {
        let temp_dir = tree(&[
            "src/main.c",
            "src/main.h",
            "src/vm/eval.c",
            "src/vm/eval.h",
            "src/os/net/socket.c",
            "src/README.md",
            "src/notes.c.txt",
            "other/skip.c",
        ]);
        let config = BuildConfig::defaults(temp_dir.path(), Platform::Linux, Mode::Debug);

        let mut found = paths(&config);
        found.sort();
        assert_eq!(
            found,
            vec![
                Path::new("src").join("main.c"),
                Path::new("src").join("os").join("net").join("socket.c"),
                Path::new("src").join("vm").join("eval.c"),
            ]
        );
    }

    #[test]
    fn test_order_is_reproducible() {
        let temp_dir = tree(&["src/b.c", "src/a.c", "src/c/d.c"]);
        let config = BuildConfig::defaults(temp_dir.path(), Platform::Linux, Mode::Debug);

        let first = paths(&config);
        let second = paths(&config);
        assert_eq!(first, second);
        assert_eq!(first[0], Path::new("src").join("a.c"));
        assert_eq!(first[1], Path::new("src").join("b.c"));
    }

    #[test]
    fn test_missing_source_root_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::defaults(temp_dir.path(), Platform::Linux, Mode::Debug);
        assert_eq!(sources(&config).count(), 0);
    }

    #[test]
    fn test_directory_named_like_source_is_skipped() {
        let temp_dir = tree(&["src/weird.c/inner.c"]);
        let config = BuildConfig::defaults(temp_dir.path(), Platform::Linux, Mode::Debug);
        assert_eq!(
            paths(&config),
            vec![Path::new("src").join("weird.c").join("inner.c")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_file_is_included() {
        let temp_dir = tree(&["src/main.c", "shared/util.c", "shared/lib/extra.c"]);
        std::os::unix::fs::symlink(
            temp_dir.path().join("shared/util.c"),
            temp_dir.path().join("src/util.c"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("shared/lib"),
            temp_dir.path().join("src/lib"),
        )
        .unwrap();
        let config = BuildConfig::defaults(temp_dir.path(), Platform::Linux, Mode::Debug);

        assert_eq!(
            paths(&config),
            vec![Path::new("src").join("main.c"), Path::new("src").join("util.c")]
        );
    }
}
