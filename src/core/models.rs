//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures shared by the coverage pipeline:
//! the `llvm-cov export` document, the coverage summary derived from it, the
//! failure taxonomy and the final outcome of a run.
//!
//! 此模块定义覆盖率流水线共享的数据结构：
//! `llvm-cov export` 文档、由其得出的覆盖率摘要、失败分类以及一次运行的最终结果。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerates the reasons a pipeline stage can abort the run.
/// 枚举流水线阶段中止运行的原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum FailureReason {
    /// A required external tool could not be found.
    /// 找不到所需的外部工具。
    ToolMissing,
    /// An external tool could not be started or exited with a non-zero status.
    /// 外部工具无法启动或以非零状态退出。
    ToolFailed,
    /// `llvm-cov export` succeeded but its output is not a usable summary.
    /// `llvm-cov export` 成功但其输出不是可用的摘要。
    InvalidExport,
}

/// The pipeline stages, in execution order.
/// 按执行顺序排列的流水线阶段。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Stage {
    Setup,
    RunTests,
    Merge,
    Export,
    Html,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::RunTests => "run-tests",
            Stage::Merge => "merge",
            Stage::Export => "export",
            Stage::Html => "html",
        };
        f.write_str(name)
    }
}

/// A fatal failure of one pipeline stage.
///
/// Carried inside `anyhow::Error`; callers that need the taxonomy can
/// `downcast_ref::<StageError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub stage: Stage,
    pub reason: FailureReason,
    pub detail: String,
}

impl StageError {
    pub fn new(stage: Stage, reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            stage,
            reason,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.detail)
    }
}

impl std::error::Error for StageError {}

/// Counters for one coverage dimension inside an export `totals` object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct CoverageCounts {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub covered: u64,
    pub percent: f64,
}

impl CoverageCounts {
    /// Sums the raw counters of several entries and recomputes the percentage.
    pub fn aggregate<'a>(entries: impl IntoIterator<Item = &'a CoverageCounts>) -> CoverageCounts {
        let (count, covered) = entries
            .into_iter()
            .fold((0u64, 0u64), |(count, covered), c| (count + c.count, covered + c.covered));
        let percent = if count == 0 {
            0.0
        } else {
            covered as f64 / count as f64 * 100.0
        };
        CoverageCounts {
            count,
            covered,
            percent,
        }
    }
}

/// The `totals` object of one export data root.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportTotals {
    pub lines: CoverageCounts,
    pub functions: CoverageCounts,
    pub regions: CoverageCounts,
}

/// One entry of the export document's `data` array.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportData {
    pub totals: ExportTotals,
}

/// The JSON document produced by `llvm-cov export --summary-only`.
/// Only the fields the summary needs are modelled; everything else is ignored.
///
/// `llvm-cov export --summary-only` 生成的 JSON 文档。
/// 仅建模摘要所需的字段，其余字段被忽略。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportDocument {
    pub data: Vec<ExportData>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ExportDocument {
    /// Parses the raw stdout of `llvm-cov export`.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("llvm-cov export output is not a valid export document")
    }

    /// Derives the coverage summary from the document's data roots.
    ///
    /// A single root is used verbatim. Several roots are merged by summing
    /// their counters. Returns `None` when the document has no data at all.
    pub fn summary(&self) -> Option<CoverageSummary> {
        match self.data.as_slice() {
            [] => None,
            [only] => Some(CoverageSummary::from_totals(&only.totals)),
            many => {
                let lines = CoverageCounts::aggregate(many.iter().map(|d| &d.totals.lines));
                let functions = CoverageCounts::aggregate(many.iter().map(|d| &d.totals.functions));
                let regions = CoverageCounts::aggregate(many.iter().map(|d| &d.totals.regions));
                Some(CoverageSummary {
                    line_percent: lines.percent,
                    function_percent: functions.percent,
                    region_percent: regions.percent,
                })
            }
        }
    }
}

/// Line, function and region coverage of one run, in percent.
/// 一次运行的行、函数和区域覆盖率（百分比）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub line_percent: f64,
    pub function_percent: f64,
    pub region_percent: f64,
}

impl CoverageSummary {
    pub fn from_totals(totals: &ExportTotals) -> Self {
        Self {
            line_percent: totals.lines.percent,
            function_percent: totals.functions.percent,
            region_percent: totals.regions.percent,
        }
    }
}

/// How a pipeline run that did not crash ended.
/// 未崩溃的流水线运行的结束方式。
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Tests passed and coverage met the threshold (or no threshold was set).
    Passed(CoverageSummary),
    /// The test run wrote no raw profiles, so there was nothing to measure.
    NoProfiles,
    /// Coverage was measured and reported but is below the required minimum.
    BelowThreshold {
        summary: CoverageSummary,
        required: f64,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Passed(_))
    }

    /// The measured coverage, when the run got far enough to measure it.
    pub fn summary(&self) -> Option<&CoverageSummary> {
        match self {
            RunOutcome::Passed(summary) | RunOutcome::BelowThreshold { summary, .. } => Some(summary),
            RunOutcome::NoProfiles => None,
        }
    }
}
