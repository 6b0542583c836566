//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for covgate,
//! including external command execution and file system operations.
//!
//! 此模块为 covgate 提供基础设施服务，
//! 包括外部命令执行和文件系统操作。

pub mod command;
pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
