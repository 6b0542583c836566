//! # Console Reporting Module / 控制台报告模块
//!
//! Every message the pipeline prints goes through here so that it carries the
//! `[coverage]` prefix and a consistent color: plain for progress, green for
//! success, yellow for warnings and red for errors.
//!
//! 流水线打印的每条消息都经过这里，以便带有 `[coverage]` 前缀和一致的颜色：
//! 普通表示进度，绿色表示成功，黄色表示警告，红色表示错误。

use colored::*;
use std::ffi::OsString;
use std::fmt::Display;
use std::path::Path;

use crate::core::models::CoverageSummary;
use crate::infra::command::{self, CapturedOutput};
use crate::reporting::text::summary_lines;

/// Prefix of every console line.
pub const PREFIX: &str = "[coverage]";

pub fn info(message: impl Display) {
    println!("{PREFIX} {message}");
}

pub fn success(message: impl Display) {
    println!("{PREFIX} {}", message.to_string().green());
}

pub fn warn(message: impl Display) {
    eprintln!("{PREFIX} {}", message.to_string().yellow());
}

pub fn error(message: impl Display) {
    eprintln!("{PREFIX} {}", message.to_string().red());
}

/// Echoes a command line before it is executed.
pub fn command(program: &Path, args: &[OsString]) {
    println!("{PREFIX} {}", command::describe(program, args).dimmed());
}

/// Prints the three coverage percentages.
///
/// # Output Format / 输出格式
/// ```text
/// [coverage] Line coverage    : 85.00%
/// [coverage] Function coverage: 90.00%
/// [coverage] Region coverage  : 80.00%
/// ```
pub fn print_summary(summary: &CoverageSummary) {
    for line in summary_lines(summary) {
        info(line.bold());
    }
}

/// Reports a failed tool whose output was captured: the headline first,
/// then everything the tool wrote, so the failure can be diagnosed from CI logs.
pub fn print_captured_failure(headline: impl Display, output: &CapturedOutput) {
    error(headline);
    if !output.stdout.trim().is_empty() {
        eprintln!("{}", output.stdout.trim_end());
    }
    if !output.stderr.trim().is_empty() {
        eprintln!("{}", output.stderr.trim_end());
    }
}
