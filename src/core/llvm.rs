//! Argument lists for `ctest`, `llvm-profdata` and `llvm-cov`.
//!
//! Kept free of I/O so the exact command lines can be checked in tests.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::config::CoverageConfig;

/// `ctest --output-on-failure [-C <config>]`
pub fn ctest_args(build_config: Option<&str>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--output-on-failure".into()];
    if let Some(cfg) = build_config {
        args.push("-C".into());
        args.push(cfg.into());
    }
    args
}

/// `llvm-profdata merge -sparse <profiles...> -o <output>`
pub fn merge_args(profiles: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["merge".into(), "-sparse".into()];
    args.extend(profiles.iter().map(|p| p.as_os_str().to_owned()));
    args.push("-o".into());
    args.push(output.as_os_str().to_owned());
    args
}

/// `llvm-cov export --summary-only <binary> --instr-profile=<profdata> ...`
pub fn export_args(config: &CoverageConfig, profdata: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "export".into(),
        "--summary-only".into(),
        config.binary.as_os_str().to_owned(),
        prefixed("--instr-profile=", profdata),
    ];
    push_objects_and_ignores(&mut args, config);
    args
}

/// `llvm-cov show <binary> --format=html --output-dir=<dir> ...`
pub fn show_args(config: &CoverageConfig, profdata: &Path, output_dir: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "show".into(),
        config.binary.as_os_str().to_owned(),
        prefixed("--instr-profile=", profdata),
        "--format=html".into(),
        prefixed("--output-dir=", output_dir),
        format!("--project-title={} Coverage", config.project_name).into(),
        "--show-regions".into(),
        "--show-region-summary".into(),
        "--show-branch-summary".into(),
        "--show-directory-coverage".into(),
    ];
    push_objects_and_ignores(&mut args, config);
    args
}

fn push_objects_and_ignores(args: &mut Vec<OsString>, config: &CoverageConfig) {
    for library in &config.libraries {
        args.push("--object".into());
        args.push(library.as_os_str().to_owned());
    }
    for pattern in &config.ignore_patterns {
        args.push("--ignore-filename-regex".into());
        args.push(pattern.into());
    }
}

fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}
