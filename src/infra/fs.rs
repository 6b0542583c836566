//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the file system bookkeeping around a coverage run:
//! resolving paths, purging and collecting raw profiles, resetting output
//! directories, mirroring directory trees and writing files atomically.
//!
//! 此模块提供覆盖率运行相关的文件系统操作：
//! 解析路径、清理和收集原始 profile、重置输出目录、镜像目录树以及原子写入文件。

use anyhow::{Context, Result};
use fs_extra::dir::{copy, CopyOptions};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::infra::t;

/// Outcome of a best-effort cleanup: what was removed and what could not be.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, io::Error)>,
}

/// Gets the absolute path from a potentially relative path.
///
/// Existing paths are canonicalized; paths that do not exist yet (output
/// locations) are made absolute against the current directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let resolved = if path.exists() {
        fs::canonicalize(path)
    } else {
        std::path::absolute(path)
    };
    resolved.with_context(|| t!("path_resolve_failed", path = path.display()))
}

/// Builds the glob pattern matching raw profiles named `<prefix>-*.profraw`
/// inside `dir`. The directory part is escaped so that brackets or stars in
/// the path are matched literally.
pub fn profile_pattern(dir: &Path, prefix: &str) -> String {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let prefix = glob::Pattern::escape(prefix);
    format!("{dir}{}{prefix}-*.profraw", std::path::MAIN_SEPARATOR)
}

/// Collects the raw profiles currently present in `dir`, sorted by path.
pub fn collect_profiles(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let pattern = profile_pattern(dir, prefix);
    let mut profiles = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("Invalid profile pattern: {pattern}"))? {
        let path = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if path.is_file() {
            profiles.push(path);
        }
    }
    profiles.sort();
    Ok(profiles)
}

/// Deletes every raw profile in `dir` left over from a previous run.
///
/// Deletion is best-effort: an entry that cannot be read or removed is
/// recorded in the returned report instead of aborting the cleanup.
pub fn remove_stale_profiles(dir: &Path, prefix: &str) -> CleanupReport {
    remove_stale_profiles_with(dir, prefix, |path| fs::remove_file(path))
}

/// [`remove_stale_profiles`] with a caller-supplied removal function.
pub fn remove_stale_profiles_with<F>(dir: &Path, prefix: &str, mut remove: F) -> CleanupReport
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut report = CleanupReport::default();
    let entries = match glob::glob(&profile_pattern(dir, prefix)) {
        Ok(entries) => entries,
        Err(e) => {
            report.failed.push((dir.to_path_buf(), io::Error::other(e)));
            return report;
        }
    };

    for entry in entries {
        match entry {
            Ok(path) => match remove(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => report.failed.push((path, e)),
            },
            Err(e) => {
                let path = e.path().to_path_buf();
                report.failed.push((path, e.into_error()));
            }
        }
    }
    report
}

/// Removes a file if it exists. A missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

/// Deletes `path` with everything below it, then recreates it empty.
pub fn reset_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to clean up old directory: {}", path.display()))?;
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Copies every file and directory inside `from` into `to`.
///
/// `to` is created when missing. Files already present in `to` are overwritten.
pub fn copy_dir_contents(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("Failed to create directory: {}", to.display()))?;

    let mut options = CopyOptions::new();
    options.overwrite = true;
    options.content_only = true;
    copy(from, to, &options).with_context(|| {
        format!("Failed to copy {} into {}", from.display(), to.display())
    })?;
    Ok(())
}

/// Writes `contents` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`, so readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
