//! # covgate Library / covgate 库
//!
//! This library provides the core functionality for the covgate tool, which
//! runs a CTest suite under LLVM source-based coverage, merges the raw profiles,
//! writes a coverage summary and enforces a minimum line coverage.
//!
//! 此库为 covgate 工具提供核心功能：在 LLVM 覆盖率插桩下运行 CTest 测试套件，
//! 合并原始 profile，写出覆盖率摘要，并强制执行最低行覆盖率。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, data models and the coverage pipeline
//! - `infra` - Process spawning and file system bookkeeping
//! - `reporting` - Console output, the text summary and the HTML report
//! - `cli` - Command-line interface
//!
//! - `core` - 配置、数据模型和覆盖率流水线
//! - `infra` - 进程启动和文件系统管理
//! - `reporting` - 控制台输出、文本摘要和 HTML 报告
//! - `cli` - 命令行接口

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

/// Selects the language for console messages.
///
/// An explicit choice (from `--lang` or the settings file) wins; otherwise the
/// system locale is used. The full locale (e.g. "zh-CN") is tried first, then
/// the bare language code (e.g. "en" from "en-US"), and finally "en".
pub fn init(preferred: Option<&str>) -> String {
    let locale = preferred
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale.as_str()) {
        locale.as_str()
    } else {
        locale
            .split(['-', '_', '.'])
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
    lang.to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
