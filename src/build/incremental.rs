//! Incremental build support
//!
//! Decides per source unit whether its object must be rebuilt, using only
//! modification times and the compiler's dependency listing.

use std::fmt;
use std::fs::{File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::{depfile, SourceUnit};
use crate::config::{BuildConfig, TouchPolicy};
use crate::utils::paths::modified;

/// Why a unit is, or is not, rebuilt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Object and headers are older than the source's reference time
    Fresh,
    /// No object file yet
    MissingObject,
    /// Source modified after its object
    SourceNewer,
    /// A header from the dependency listing is newer
    HeaderNewer { header: PathBuf },
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::Fresh => write!(f, "up to date"),
            Staleness::MissingObject => write!(f, "no object file"),
            Staleness::SourceNewer => write!(f, "source changed"),
            Staleness::HeaderNewer { header } => write!(f, "{} changed", header.display()),
        }
    }
}

/// Decide staleness for a unit whose object exists
///
/// `headers` is only called when the object is at least as new as the
/// source, and the headers it yields are examined until the first newer one.
/// Under [`TouchPolicy::Touch`] headers are compared against `src_time`;
/// under [`TouchPolicy::Leave`] against `obj_time`. Errors from `headers`
/// are returned as-is.
pub fn evaluate<F, I>(
    src_time: SystemTime,
    obj_time: SystemTime,
    policy: TouchPolicy,
    headers: F,
) -> Result<Staleness>
where
    F: FnOnce() -> Result<I>,
    I: IntoIterator<Item = Result<(PathBuf, SystemTime)>>,
{
    if obj_time < src_time {
        return Ok(Staleness::SourceNewer);
    }

    let reference = match policy {
        TouchPolicy::Touch => src_time,
        TouchPolicy::Leave => obj_time,
    };

    for header in headers()? {
        let (path, hdr_time) = header?;
        if hdr_time > reference {
            return Ok(Staleness::HeaderNewer { header: path });
        }
    }

    Ok(Staleness::Fresh)
}

/// Set a file's modification time to now, leaving its access time alone
///
/// Only attribute access is requested, so read-only sources owned by the
/// caller can still be touched.
pub fn touch_source(path: &Path) -> Result<()> {
    let file = attribute_handle(path)
        .with_context(|| format!("Failed to open {} to update its timestamp", path.display()))?;

    file.set_times(FileTimes::new().set_modified(SystemTime::now()))
        .with_context(|| format!("Failed to update timestamp of {}", path.display()))
}

#[cfg(windows)]
fn attribute_handle(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    File::options().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}

#[cfg(not(windows))]
fn attribute_handle(path: &Path) -> std::io::Result<File> {
    File::options().read(true).open(path)
}

/// Filesystem-backed staleness checks for one configuration
pub struct StalenessDetector<'a> {
    config: &'a BuildConfig,
    dry_run: bool,
}

impl<'a> StalenessDetector<'a> {
    /// Create a detector; with `dry_run` set no source is ever touched
    pub fn new(config: &'a BuildConfig, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    /// Check one unit
    ///
    /// A missing object short-circuits to [`Staleness::MissingObject`]
    /// without reading any timestamps. When a header triggers staleness
    /// under [`TouchPolicy::Touch`], the source is touched before returning.
    pub fn check(&self, unit: &SourceUnit) -> Result<Staleness> {
        let root = &self.config.root;
        let object = root.join(unit.object(self.config));
        if !object.exists() {
            return Ok(Staleness::MissingObject);
        }

        let source = root.join(unit.path());
        let src_time = modified(&source)?;
        let obj_time = modified(&object)?;

        let listing = root.join(unit.listing(self.config));
        let header_ext = &self.config.header_ext;

        let verdict = evaluate(src_time, obj_time, self.config.touch, || {
            let text = std::fs::read_to_string(&listing).with_context(|| {
                format!("Failed to read dependency listing {}", listing.display())
            })?;

            Ok(depfile::parse_headers(&text, header_ext)
                .into_iter()
                .map(move |header| -> Result<(PathBuf, SystemTime)> {
                    let hdr_time = modified(&root.join(&header))?;
                    Ok((header, hdr_time))
                }))
        })?;

        if matches!(verdict, Staleness::HeaderNewer { .. })
            && self.config.touch == TouchPolicy::Touch
            && !self.dry_run
        {
            touch_source(&source)?;
        }

        Ok(verdict)
    }
}
