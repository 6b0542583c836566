//! # Configuration Module / 配置模块
//!
//! Turns the raw command-line input and the optional TOML settings file into
//! the immutable `CoverageConfig` every pipeline stage reads from.
//!
//! 将原始命令行输入和可选的 TOML 设置文件转换为不可变的 `CoverageConfig`，
//! 流水线的每个阶段都从中读取配置。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::{FailureReason, Stage, StageError};
use crate::infra::{command, fs::absolute_path, t};

/// Project name used when neither the command line nor the settings give one.
pub const DEFAULT_PROJECT_NAME: &str = "Sparkle";

/// Environment variable read by LLVM-instrumented binaries for the raw profile path.
pub const PROFILE_FILE_VAR: &str = "LLVM_PROFILE_FILE";

/// File name prefix of the raw profiles and the merged database.
///
/// Fixed regardless of `--project-name`; the test harness and CI scripts look
/// for `sparkle-*.profraw` and `sparkle.profdata`.
pub const PROFILE_PREFIX: &str = "sparkle";

/// Environment variable the instrumented tests read to locate the sources.
pub const SOURCE_ROOT_VAR: &str = "SPARKLE_SOURCE_ROOT";

/// The coverage backend. LLVM source-based coverage is the only one supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    #[default]
    Llvm,
}

impl CoverageMode {
    /// Accepted values for `--mode`.
    pub const NAMES: [&'static str; 1] = ["llvm"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "llvm" => Some(CoverageMode::Llvm),
            _ => None,
        }
    }
}

/// Command-line input exactly as given, before any path is resolved.
/// 解析任何路径之前的原始命令行输入。
#[derive(Debug, Clone, Default)]
pub struct CoverageArgs {
    pub mode: CoverageMode,
    pub build_dir: PathBuf,
    pub config: String,
    pub threshold: Option<f64>,
    pub output: PathBuf,
    pub html_dir: Option<PathBuf>,
    pub docs_dir: Option<PathBuf>,
    pub project_name: Option<String>,
    pub binary: PathBuf,
    pub libraries: Vec<PathBuf>,
    pub source_root: PathBuf,
    pub llvm_profdata: PathBuf,
    pub llvm_cov: PathBuf,
    pub ignore_regex: Vec<String>,
    pub settings: Option<PathBuf>,
    pub lang: Option<String>,
}

/// Optional defaults loaded from a TOML settings file.
/// Values given on the command line take precedence.
///
/// 从 TOML 设置文件加载的可选默认值。
/// 命令行给出的值优先。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Language for console messages (e.g., "en", "zh-CN").
    /// 控制台消息的语言（例如 "en", "zh-CN"）。
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Relative paths are taken relative to the settings file.
    #[serde(default)]
    pub html_dir: Option<PathBuf>,
    /// Relative paths are taken relative to the settings file.
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,
    /// Prepended to the patterns given with `--ignore-regex`.
    #[serde(default)]
    pub ignore_regex: Vec<String>,
}

impl Settings {
    /// Reads and parses a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| t!("settings_read_failed", path = path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&content, base_dir)
            .with_context(|| t!("settings_parse_failed", path = path.display()))
    }

    /// Parses settings from TOML text, anchoring relative directories at `base_dir`.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.html_dir = settings.html_dir.map(|dir| base_dir.join(dir));
        settings.docs_dir = settings.docs_dir.map(|dir| base_dir.join(dir));
        Ok(settings)
    }
}

/// Absolute locations of the external tools a run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub ctest: PathBuf,
    pub llvm_profdata: PathBuf,
    pub llvm_cov: PathBuf,
}

impl Toolchain {
    /// Locates `ctest` on `PATH` and validates the LLVM tool paths.
    pub fn discover(llvm_profdata: &Path, llvm_cov: &Path) -> Result<Self> {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        Self::discover_in(&path_var, llvm_profdata, llvm_cov)
    }

    /// Same as [`Toolchain::discover`] with an explicit `PATH`-style search list.
    pub fn discover_in(path_var: &OsStr, llvm_profdata: &Path, llvm_cov: &Path) -> Result<Self> {
        let ctest = command::find_program_in("ctest", path_var).ok_or_else(|| {
            StageError::new(
                Stage::Setup,
                FailureReason::ToolMissing,
                t!("tool_not_in_path", tool = "ctest"),
            )
        })?;

        Ok(Self {
            ctest,
            llvm_profdata: resolve_tool("llvm-profdata", llvm_profdata, path_var)?,
            llvm_cov: resolve_tool("llvm-cov", llvm_cov, path_var)?,
        })
    }
}

/// Resolves a tool given on the command line.
///
/// A path that exists is used as is. A bare program name that does not exist
/// in the current directory is looked up on the search path.
fn resolve_tool(tool: &str, given: &Path, path_var: &OsStr) -> Result<PathBuf> {
    if given.exists() {
        return absolute_path(given);
    }

    let is_bare_name = given.components().count() == 1 && given.parent() == Some(Path::new(""));
    if is_bare_name {
        if let Some(found) = given.to_str().and_then(|name| command::find_program_in(name, path_var)) {
            return Ok(found);
        }
    }

    Err(StageError::new(
        Stage::Setup,
        FailureReason::ToolMissing,
        t!("tool_not_found_at", tool = tool, path = given.display()),
    )
    .into())
}

/// The fully resolved, immutable configuration of one coverage run.
/// 一次覆盖率运行的完全解析且不可变的配置。
#[derive(Debug, Clone)]
pub struct CoverageConfig {
    pub mode: CoverageMode,
    /// Working directory of the test runner.
    pub build_dir: PathBuf,
    /// Build configuration passed as `ctest -C`, if any.
    pub build_config: Option<String>,
    pub threshold: f64,
    /// Path of the plain-text summary.
    pub output: PathBuf,
    /// Directory holding the summary, the raw profiles and the merged database.
    pub coverage_dir: PathBuf,
    pub html_dir: Option<PathBuf>,
    pub docs_dir: Option<PathBuf>,
    pub project_name: String,
    pub binary: PathBuf,
    pub libraries: Vec<PathBuf>,
    pub source_root: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub tools: Toolchain,
}

impl CoverageConfig {
    /// Merges command-line input with settings and resolves every path.
    pub fn resolve(args: CoverageArgs, settings: Settings, tools: Toolchain) -> Result<Self> {
        let threshold = args.threshold.or(settings.threshold).unwrap_or(0.0);
        if !threshold.is_finite() {
            bail!("Coverage threshold must be a finite number, got {threshold}");
        }

        let project_name = args
            .project_name
            .or(settings.project_name)
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
        if project_name.trim().is_empty() {
            bail!("Project name must not be empty");
        }

        let output = absolute_path(&args.output)?;
        let coverage_dir = output
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("Output path has no parent directory: {}", output.display()))?;

        let html_dir = args.html_dir.or(settings.html_dir);
        let docs_dir = args.docs_dir.or(settings.docs_dir);

        let mut ignore_patterns = settings.ignore_regex;
        ignore_patterns.extend(args.ignore_regex);

        Ok(Self {
            mode: args.mode,
            build_dir: absolute_path(&args.build_dir)?,
            build_config: sanitize_build_config(&args.config),
            threshold,
            output,
            coverage_dir,
            html_dir: html_dir.as_deref().map(absolute_path).transpose()?,
            docs_dir: docs_dir.as_deref().map(absolute_path).transpose()?,
            project_name,
            binary: absolute_path(&args.binary)?,
            libraries: args
                .libraries
                .iter()
                .map(|lib| absolute_path(lib))
                .collect::<Result<_>>()?,
            source_root: absolute_path(&args.source_root)?,
            ignore_patterns,
            tools,
        })
    }

    /// File name prefix shared by the raw profiles and the merged database.
    pub fn profile_prefix(&self) -> &'static str {
        PROFILE_PREFIX
    }

    /// Template handed to instrumented binaries; `%p` expands to the process id.
    pub fn profile_template(&self) -> PathBuf {
        self.coverage_dir
            .join(format!("{}-%p.profraw", self.profile_prefix()))
    }

    /// Location of the merged, sparse profile database.
    pub fn profdata_path(&self) -> PathBuf {
        self.coverage_dir
            .join(format!("{}.profdata", self.profile_prefix()))
    }

    /// Extra environment for the test runner process.
    pub fn test_environment(&self) -> Vec<(String, OsString)> {
        vec![
            (
                PROFILE_FILE_VAR.to_string(),
                self.profile_template().into_os_string(),
            ),
            (
                SOURCE_ROOT_VAR.to_string(),
                self.source_root.clone().into_os_string(),
            ),
        ]
    }
}

/// Normalizes the `--config` value.
///
/// Generator-expression placeholders such as `$<CONFIG>` that were never
/// expanded are dropped, as are empty values and `.`.
pub fn sanitize_build_config(raw: &str) -> Option<String> {
    let cfg = raw.trim();
    if cfg.is_empty() || cfg == "." || cfg.contains('<') || cfg.contains('>') {
        None
    } else {
        Some(cfg.to_string())
    }
}
