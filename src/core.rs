//! # Core Module / 核心模块
//!
//! This module contains the core functionality of covgate,
//! including configuration, data models, the LLVM tool invocations
//! and the coverage pipeline itself.
//!
//! 此模块包含 covgate 的核心功能，
//! 包括配置、数据模型、LLVM 工具调用以及覆盖率流水线本身。

pub mod config;
pub mod execution;
pub mod llvm;
pub mod models;
pub mod threshold;

// Re-exports
pub use config::CoverageConfig;
pub use execution::run_pipeline;
pub use models::{CoverageSummary, RunOutcome};
