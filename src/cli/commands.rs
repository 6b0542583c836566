//! # CLI Commands / CLI 命令
//!
//! - `run` - Resolves the configuration and runs the coverage pipeline
//!
//! - `run` - 解析配置并运行覆盖率流水线

pub mod run;
