//! # Coverage Pipeline Module / 覆盖率流水线模块
//!
//! This module drives one coverage run from start to finish:
//! purge stale profiles, run the tests, merge the raw profiles, export and
//! write the summary, render the optional HTML report and apply the
//! threshold gate. Every stage runs to completion before the next starts and
//! any external tool failure aborts the run immediately.
//!
//! 此模块从头到尾驱动一次覆盖率运行：
//! 清理过期 profile、运行测试、合并原始 profile、导出并写入摘要、
//! 生成可选的 HTML 报告并应用阈值检查。每个阶段完成后才开始下一个阶段，
//! 任何外部工具失败都会立即中止运行。

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs as std_fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::{
    core::{
        config::{CoverageConfig, CoverageMode},
        llvm,
        models::{CoverageSummary, ExportDocument, FailureReason, RunOutcome, Stage, StageError},
        threshold::{self, Verdict},
    },
    infra::{command, command::CapturedOutput, fs, t},
    reporting::{console, html, text},
};

/// Runs the whole pipeline for an already resolved configuration.
///
/// # Returns
/// - `Ok(RunOutcome::Passed)` when tests passed and coverage met the threshold
/// - `Ok(RunOutcome::NoProfiles)` when the tests produced no raw profiles
/// - `Ok(RunOutcome::BelowThreshold)` when the report was written but coverage is too low
/// - `Err` carrying a [`StageError`] when an external tool failed
pub async fn run_pipeline(config: &CoverageConfig) -> Result<RunOutcome> {
    match config.mode {
        CoverageMode::Llvm => run_llvm_pipeline(config).await,
    }
}

/// LLVM source-based coverage: `ctest`, then `llvm-profdata`, then `llvm-cov`.
async fn run_llvm_pipeline(config: &CoverageConfig) -> Result<RunOutcome> {
    prepare_coverage_dir(config)?;

    run_tests(config).await?;

    let profiles = fs::collect_profiles(&config.coverage_dir, config.profile_prefix())
        .with_context(|| t!("profile_scan_failed", path = config.coverage_dir.display()))?;
    if profiles.is_empty() {
        console::error(t!("no_profiles"));
        return Ok(RunOutcome::NoProfiles);
    }

    let profdata = config.profdata_path();
    merge_profiles(config, &profiles, &profdata).await?;

    let summary = export_summary(config, &profdata).await?;
    console::print_summary(&summary);

    text::write_summary(&config.output, &config.project_name, &summary)?;
    console::info(t!("report_written", path = config.output.display()));

    publish_html(config, &profdata).await?;

    Ok(apply_threshold(config, summary))
}

/// Creates the coverage directory and deletes raw profiles left by earlier runs.
pub fn prepare_coverage_dir(config: &CoverageConfig) -> Result<()> {
    std_fs::create_dir_all(&config.coverage_dir).with_context(|| {
        t!("coverage_dir_create_failed", path = config.coverage_dir.display())
    })?;

    let cleanup = fs::remove_stale_profiles(&config.coverage_dir, config.profile_prefix());
    for (path, error) in &cleanup.failed {
        console::warn(t!(
            "stale_profile_remove_failed",
            path = path.display(),
            error = error
        ));
    }
    if !cleanup.removed.is_empty() {
        console::info(t!(
            "stale_profiles_removed",
            count = cleanup.removed.len(),
            path = config.coverage_dir.display()
        ));
    }
    Ok(())
}

/// Runs `ctest` in the build directory with the profile environment set.
async fn run_tests(config: &CoverageConfig) -> Result<()> {
    let args = llvm::ctest_args(config.build_config.as_deref());
    console::command(&config.tools.ctest, &args);

    let mut cmd = Command::new(&config.tools.ctest);
    cmd.args(&args)
        .current_dir(&config.build_dir)
        .envs(config.test_environment());

    run_tool_inherited(Stage::RunTests, "ctest", cmd, &t!("tests_failed")).await
}

/// Replaces any previous profile database with a sparse merge of `profiles`.
async fn merge_profiles(config: &CoverageConfig, profiles: &[PathBuf], profdata: &Path) -> Result<()> {
    fs::remove_file_if_exists(profdata)
        .with_context(|| t!("profdata_remove_failed", path = profdata.display()))?;

    let args = llvm::merge_args(profiles, profdata);
    console::command(&config.tools.llvm_profdata, &args);

    let mut cmd = Command::new(&config.tools.llvm_profdata);
    cmd.args(&args);

    run_tool_inherited(Stage::Merge, "llvm-profdata", cmd, &t!("merge_failed")).await
}

/// Runs `llvm-cov export --summary-only` and extracts the coverage totals.
async fn export_summary(config: &CoverageConfig, profdata: &Path) -> Result<CoverageSummary> {
    let args = llvm::export_args(config, profdata);
    let output = run_tool_captured(
        Stage::Export,
        "llvm-cov",
        &config.tools.llvm_cov,
        &args,
        &t!("export_failed"),
    )
    .await?;

    let document = ExportDocument::parse(&output.stdout).map_err(|e| {
        e.context(StageError::new(
            Stage::Export,
            FailureReason::InvalidExport,
            t!("export_parse_failed"),
        ))
    })?;

    if document.data.len() > 1 {
        console::info(t!("export_multiple_roots", count = document.data.len()));
    }

    document.summary().ok_or_else(|| {
        StageError::new(Stage::Export, FailureReason::InvalidExport, t!("export_no_data")).into()
    })
}

/// Renders the HTML report and its docs mirror when they are configured.
async fn publish_html(config: &CoverageConfig, profdata: &Path) -> Result<()> {
    match (&config.html_dir, &config.docs_dir) {
        (Some(html_dir), docs_dir) => {
            html::generate_html_report(config, profdata, html_dir).await?;
            console::success(t!("html_generated", path = html_dir.display()));

            if let Some(docs_dir) = docs_dir {
                html::mirror_into_docs(html_dir, docs_dir)?;
                console::success(t!("docs_copied", path = docs_dir.display()));
            }
        }
        (None, Some(_)) => console::warn(t!("docs_without_html")),
        (None, None) => {}
    }
    Ok(())
}

/// Turns the measured line coverage into the final outcome.
fn apply_threshold(config: &CoverageConfig, summary: CoverageSummary) -> RunOutcome {
    let measured = format!("{:.2}", summary.line_percent);
    let required = format!("{:.2}", config.threshold);

    match threshold::check(summary.line_percent, config.threshold) {
        Verdict::Disabled => RunOutcome::Passed(summary),
        Verdict::Met => {
            console::success(t!("threshold_met", measured = measured, required = required));
            RunOutcome::Passed(summary)
        }
        Verdict::Below { .. } => {
            console::error(t!("threshold_violation", measured = measured, required = required));
            RunOutcome::BelowThreshold {
                summary,
                required: config.threshold,
            }
        }
    }
}

/// Waits for a tool whose output streams straight to the console.
async fn run_tool_inherited(stage: Stage, tool: &str, cmd: Command, failure_headline: &str) -> Result<()> {
    let status = command::run_inherited(cmd).await.map_err(|e| {
        anyhow::Error::new(e).context(StageError::new(
            stage,
            FailureReason::ToolFailed,
            t!("tool_spawn_failed", tool = tool),
        ))
    })?;

    if !status.success() {
        console::error(failure_headline);
        return Err(StageError::new(
            stage,
            FailureReason::ToolFailed,
            t!("tool_exit_status", tool = tool, status = status),
        )
        .into());
    }
    Ok(())
}

/// Runs a tool with captured output. On failure the captured streams are
/// echoed to stderr before the error is returned.
pub(crate) async fn run_tool_captured(
    stage: Stage,
    tool: &str,
    program: &Path,
    args: &[OsString],
    failure_headline: &str,
) -> Result<CapturedOutput> {
    console::command(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args);

    let output = command::spawn_and_capture(cmd).await.map_err(|e| {
        anyhow::Error::new(e).context(StageError::new(
            stage,
            FailureReason::ToolFailed,
            t!("tool_spawn_failed", tool = tool),
        ))
    })?;

    if !output.status.success() {
        console::print_captured_failure(failure_headline, &output);
        return Err(StageError::new(
            stage,
            FailureReason::ToolFailed,
            t!("tool_exit_status", tool = tool, status = output.status),
        )
        .into());
    }
    Ok(output)
}
