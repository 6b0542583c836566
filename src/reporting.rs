//! # Reporting Module / 报告模块
//!
//! This module handles everything the user gets to read: prefixed and colored
//! console messages, the plain-text coverage summary and the HTML report
//! rendered by `llvm-cov show` together with its documentation mirror.
//!
//! 此模块处理用户可见的所有输出：带前缀和颜色的控制台消息、纯文本覆盖率摘要，
//! 以及由 `llvm-cov show` 生成的 HTML 报告及其文档镜像。

pub mod console;
pub mod html;
pub mod text;

// Re-export common reporting functions
pub use html::{generate_html_report, mirror_into_docs};
pub use text::{render_summary, write_summary};
