//! # Run Command Module / 运行命令模块
//!
//! This module implements the coverage run behind the CLI: it loads the
//! optional settings file, locates the external tools, resolves the
//! configuration and hands it to the pipeline.
//!
//! 此模块实现 CLI 背后的覆盖率运行：加载可选的设置文件、定位外部工具、
//! 解析配置并将其交给流水线。

use anyhow::Result;

use crate::{
    core::{
        config::{CoverageArgs, CoverageConfig, Settings, Toolchain},
        execution::run_pipeline,
        models::RunOutcome,
    },
    infra::t,
    reporting::console,
};

/// Executes a coverage run with the provided arguments.
///
/// Tool discovery happens before anything touches the file system, so a
/// missing `ctest` leaves previous artifacts untouched.
///
/// # Arguments
/// * `args` - Command-line input as parsed by clap
///
/// # Returns
/// The outcome of the run, or the error of the stage that aborted it
pub async fn execute(args: CoverageArgs) -> Result<RunOutcome> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if args.lang.is_none() {
        if let Some(language) = settings.language.as_deref() {
            crate::init(Some(language));
        }
    }

    let tools = Toolchain::discover(&args.llvm_profdata, &args.llvm_cov)?;
    let config = CoverageConfig::resolve(args, settings, tools)?;

    let outcome = run_pipeline(&config).await?;
    if outcome.is_success() {
        console::success(t!("coverage_run_passed"));
    }
    Ok(outcome)
}
