//! Plain-text coverage summary.

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::models::CoverageSummary;
use crate::infra::{fs::write_atomic, t};

/// The three percentage lines, rounded to two decimals, in fixed order.
pub fn summary_lines(summary: &CoverageSummary) -> [String; 3] {
    [
        format!("Line coverage    : {:.2}%", summary.line_percent),
        format!("Function coverage: {:.2}%", summary.function_percent),
        format!("Region coverage  : {:.2}%", summary.region_percent),
    ]
}

/// Renders the summary file contents.
///
/// ```text
/// Sparkle coverage summary
/// Line coverage    : 85.00%
/// Function coverage: 90.00%
/// Region coverage  : 80.00%
/// ```
pub fn render_summary(project_name: &str, summary: &CoverageSummary) -> String {
    let mut text = format!("{project_name} coverage summary\n");
    for line in summary_lines(summary) {
        text.push_str(&line);
        text.push('\n');
    }
    text
}

/// Atomically writes the rendered summary to `path`, replacing any previous file.
pub fn write_summary(path: &Path, project_name: &str, summary: &CoverageSummary) -> Result<()> {
    write_atomic(path, &render_summary(project_name, summary))
        .with_context(|| t!("report_write_failed", path = path.display()))
}
