// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, ffi::OsString, path::PathBuf};

use crate::core::config::{CoverageArgs, CoverageMode, DEFAULT_PROJECT_NAME};
use crate::core::models::RunOutcome;
use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang="))
        .map(str::to_string)
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("covgate")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .help(t!("arg_mode", locale = locale).to_string())
                .value_name("MODE")
                .required(true)
                .value_parser(CoverageMode::NAMES)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("build-dir")
                .long("build-dir")
                .help(t!("arg_build_dir", locale = locale).to_string())
                .value_name("BUILD_DIR")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help(t!("arg_config", locale = locale).to_string())
                .value_name("CONFIG")
                .default_value("")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .help(t!("arg_threshold", locale = locale).to_string())
                .value_name("PERCENT")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .help(t!("arg_output", locale = locale).to_string())
                .value_name("OUTPUT")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("html-dir")
                .long("html-dir")
                .help(t!("arg_html_dir", locale = locale).to_string())
                .value_name("HTML_DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("docs-dir")
                .long("docs-dir")
                .help(t!("arg_docs_dir", locale = locale).to_string())
                .value_name("DOCS_DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("project-name")
                .long("project-name")
                .help(format!(
                    "{} [default: {DEFAULT_PROJECT_NAME}]",
                    t!("arg_project_name", locale = locale)
                ))
                .value_name("NAME")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("binary")
                .long("binary")
                .help(t!("arg_binary", locale = locale).to_string())
                .value_name("BINARY")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("library")
                .long("library")
                .help(t!("arg_library", locale = locale).to_string())
                .value_name("LIBRARY")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("source-root")
                .long("source-root")
                .help(t!("arg_source_root", locale = locale).to_string())
                .value_name("SOURCE_ROOT")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("llvm-profdata")
                .long("llvm-profdata")
                .help(t!("arg_llvm_profdata", locale = locale).to_string())
                .value_name("LLVM_PROFDATA")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("llvm-cov")
                .long("llvm-cov")
                .help(t!("arg_llvm_cov", locale = locale).to_string())
                .value_name("LLVM_COV")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("ignore-regex")
                .long("ignore-regex")
                .help(t!("arg_ignore_regex", locale = locale).to_string())
                .value_name("REGEX")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .help(t!("arg_settings", locale = locale).to_string())
                .value_name("SETTINGS")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

/// Extracts the typed command-line input from parsed matches.
pub fn args_from_matches(matches: &ArgMatches) -> CoverageArgs {
    let path = |id: &str| matches.get_one::<PathBuf>(id).cloned().unwrap_or_default();
    let optional_path = |id: &str| matches.get_one::<PathBuf>(id).cloned();

    CoverageArgs {
        mode: matches
            .get_one::<String>("mode")
            .and_then(|name| CoverageMode::from_name(name))
            .unwrap_or_default(),
        build_dir: path("build-dir"),
        config: matches.get_one::<String>("config").cloned().unwrap_or_default(),
        threshold: matches.get_one::<f64>("threshold").copied(),
        output: path("output"),
        html_dir: optional_path("html-dir"),
        docs_dir: optional_path("docs-dir"),
        project_name: matches.get_one::<String>("project-name").cloned(),
        binary: path("binary"),
        libraries: matches
            .get_many::<PathBuf>("library")
            .map(|libs| libs.cloned().collect())
            .unwrap_or_default(),
        source_root: path("source-root"),
        llvm_profdata: path("llvm-profdata"),
        llvm_cov: path("llvm-cov"),
        ignore_regex: matches
            .get_many::<String>("ignore-regex")
            .map(|patterns| patterns.cloned().collect())
            .unwrap_or_default(),
        settings: optional_path("settings"),
        lang: matches.get_one::<String>("lang").cloned(),
    }
}

/// Parses an explicit argument list (the first item is the program name).
pub fn try_parse_from<I, T>(itr: I) -> Result<CoverageArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli("en").try_get_matches_from(itr)?;
    Ok(args_from_matches(&matches))
}

pub async fn run() -> Result<RunOutcome> {
    // Pre-parse language and initialize i18n first.
    let language = crate::init(pre_parse_language().as_deref());

    let matches = build_cli(&language).get_matches();
    let args = args_from_matches(&matches);

    commands::run::execute(args).await
}
