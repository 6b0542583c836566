//! # File System Unit Tests / 文件系统单元测试
//!
//! Profile discovery and cleanup, directory resets and atomic writes.
//!
//! Profile 的发现与清理、目录重置以及原子写入。

use covgate::infra::fs::{
    absolute_path, collect_profiles, copy_dir_contents, remove_file_if_exists,
    remove_stale_profiles, remove_stale_profiles_with, reset_dir, write_atomic,
};
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "x").unwrap();
}

#[cfg(test)]
mod profile_tests {
    use super::*;

    #[test]
    fn test_collect_profiles_is_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(&dir.join("sparkle-300.profraw"));
        touch(&dir.join("sparkle-12.profraw"));
        touch(&dir.join("sparkle-7.profraw"));
        touch(&dir.join("other-1.profraw"));
        touch(&dir.join("sparkle.profdata"));
        touch(&dir.join("summary.txt"));
        fs::create_dir_all(dir.join("sparkle-dir.profraw")).unwrap();

        let profiles = collect_profiles(dir, "sparkle").unwrap();
        let names: Vec<_> = profiles
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            ["sparkle-12.profraw", "sparkle-300.profraw", "sparkle-7.profraw"]
        );
    }

    #[test]
    fn test_collect_profiles_with_glob_characters_in_path() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("build [debug]*");
        touch(&dir.join("sparkle-1.profraw"));

        let profiles = collect_profiles(&dir, "sparkle").unwrap();
        assert_eq!(profiles, vec![dir.join("sparkle-1.profraw")]);
    }

    #[test]
    fn test_collect_profiles_in_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let profiles = collect_profiles(&temp_dir.path().join("missing"), "sparkle").unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_remove_stale_profiles_keeps_unrelated_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(&dir.join("sparkle-1.profraw"));
        touch(&dir.join("sparkle-2.profraw"));
        touch(&dir.join("other-1.profraw"));
        touch(&dir.join("summary.txt"));

        let report = remove_stale_profiles(dir, "sparkle");

        assert_eq!(report.removed.len(), 2);
        assert!(report.failed.is_empty());
        assert!(!dir.join("sparkle-1.profraw").exists());
        assert!(dir.join("other-1.profraw").exists());
        assert!(dir.join("summary.txt").exists());
    }

    #[test]
    fn test_removal_failure_is_recorded_and_cleanup_continues() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(&dir.join("sparkle-1.profraw"));
        touch(&dir.join("sparkle-2.profraw"));
        touch(&dir.join("sparkle-3.profraw"));

        let report = remove_stale_profiles_with(dir, "sparkle", |path| {
            if path.ends_with("sparkle-2.profraw") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
            } else {
                fs::remove_file(path)
            }
        });

        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        let (path, error) = &report.failed[0];
        assert!(path.ends_with("sparkle-2.profraw"));
        assert_eq!(error.kind(), io::ErrorKind::PermissionDenied);
        assert!(dir.join("sparkle-2.profraw").exists());
        assert!(!dir.join("sparkle-3.profraw").exists());
    }

    #[test]
    fn test_vanished_profile_is_neither_removed_nor_failed() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("sparkle-1.profraw"));

        let report = remove_stale_profiles_with(temp_dir.path(), "sparkle", |_| {
            Err(io::Error::from(io::ErrorKind::NotFound))
        });

        assert!(report.removed.is_empty());
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_directory_with_profile_name_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let entry = temp_dir.path().join("sparkle-odd.profraw");
        touch(&entry.join("inner"));

        let report = remove_stale_profiles(temp_dir.path(), "sparkle");

        assert!(report.removed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, entry);
        assert!(entry.is_dir());
    }

    #[test]
    fn test_cleanup_of_missing_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let report = remove_stale_profiles(&temp_dir.path().join("missing"), "sparkle");
        assert!(report.removed.is_empty());
        assert!(report.failed.is_empty());
    }
}

#[cfg(test)]
mod directory_tests {
    use super::*;

    #[test]
    fn test_reset_dir_empties_existing_tree() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("html");
        touch(&dir.join("nested").join("old.html"));

        reset_dir(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_dir_creates_missing_parents() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");

        reset_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_copy_dir_contents_overwrites_and_nests() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("from");
        let to = temp_dir.path().join("to");
        touch(&from.join("index.html"));
        touch(&from.join("coverage").join("lib.cpp.html"));
        fs::create_dir_all(&to).unwrap();
        fs::write(to.join("index.html"), "stale").unwrap();

        copy_dir_contents(&from, &to).unwrap();

        assert_eq!(fs::read_to_string(to.join("index.html")).unwrap(), "x");
        assert!(to.join("coverage").join("lib.cpp.html").is_file());
        assert!(!to.join("from").exists());
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_write_atomic_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("summary.txt");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        remove_file_if_exists(&temp_dir.path().join("sparkle.profdata")).unwrap();
    }

    #[test]
    fn test_remove_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sparkle.profdata");
        touch(&path);

        remove_file_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_absolute_path_of_empty_path_fails_with_message() {
        let err = absolute_path(Path::new("")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to resolve path:"));
    }

    #[test]
    fn test_absolute_path_of_missing_relative_path() {
        let resolved = absolute_path(Path::new("not-created-yet/summary.txt")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("not-created-yet/summary.txt"));
    }

    #[test]
    fn test_absolute_path_of_existing_path_is_canonical() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a");
        fs::create_dir_all(&nested).unwrap();

        let resolved = absolute_path(&nested.join("..").join("a")).unwrap();
        assert_eq!(resolved, fs::canonicalize(&nested).unwrap());
    }
}
