//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders the browsable HTML report with `llvm-cov show` and optionally
//! mirrors the finished report into a documentation tree.
//!
//! 使用 `llvm-cov show` 生成可浏览的 HTML 报告，并可选地将生成的报告镜像到文档目录中。

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::config::CoverageConfig;
use crate::core::execution::run_tool_captured;
use crate::core::llvm;
use crate::core::models::Stage;
use crate::infra::{fs, t};

/// Generates an HTML coverage report into `output_dir`.
///
/// The directory is wiped and recreated first so stale pages from an older
/// run never mix with the fresh ones.
///
/// # Errors / 错误
/// - The output directory cannot be reset
/// - `llvm-cov show` cannot be started or exits with a non-zero status
///   (its captured output is echoed before returning)
pub async fn generate_html_report(
    config: &CoverageConfig,
    profdata: &Path,
    output_dir: &Path,
) -> Result<()> {
    fs::reset_dir(output_dir)
        .with_context(|| t!("html_dir_reset_failed", path = output_dir.display()))?;

    let args = llvm::show_args(config, profdata, output_dir);
    run_tool_captured(
        Stage::Html,
        "llvm-cov",
        &config.tools.llvm_cov,
        &args,
        &t!("show_failed"),
    )
    .await?;
    Ok(())
}

/// Replaces `docs_dir` with a recursive copy of everything in `html_dir`.
pub fn mirror_into_docs(html_dir: &Path, docs_dir: &Path) -> Result<()> {
    fs::reset_dir(docs_dir)?;
    fs::copy_dir_contents(html_dir, docs_dir)
        .with_context(|| t!("docs_copy_failed", path = docs_dir.display()))
}
