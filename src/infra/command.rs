//! # Command Execution Module / 命令执行模块
//!
//! Helpers for locating external tools and running them either with the
//! caller's standard streams (so their output is visible live) or with the
//! streams captured for parsing and for diagnostics on failure.
//!
//! 用于定位外部工具并运行它们的辅助函数：可以继承调用者的标准流（实时显示输出），
//! 也可以捕获输出流以便解析和在失败时诊断。

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// The captured result of a finished child process.
/// 已结束子进程的捕获结果。
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit status of the process / 进程的退出状态
    pub status: ExitStatus,
    /// Everything the process wrote to stdout / 进程写入 stdout 的全部内容
    pub stdout: String,
    /// Everything the process wrote to stderr / 进程写入 stderr 的全部内容
    pub stderr: String,
}

/// Renders a command line for logging, quoting arguments the way a POSIX
/// shell would need them.
pub fn describe(program: &Path, args: &[OsString]) -> String {
    let words: Vec<String> = std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|word| word.to_string_lossy().into_owned())
        .collect();

    shlex::try_join(words.iter().map(String::as_str)).unwrap_or_else(|_| words.join(" "))
}

/// Looks up `name` in the directories of a `PATH`-style list.
///
/// # Arguments
/// * `name` - Bare program name, e.g. `ctest`
/// * `path_var` - Directory list in the platform's `PATH` format
///
/// # Returns
/// The first matching executable file, or `None`
pub fn find_program_in(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidate_names(name).map(move |file| dir.join(file)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidate_names(name: &str) -> impl Iterator<Item = String> + '_ {
    [String::new(), ".exe".to_string()]
        .into_iter()
        .map(move |ext| format!("{name}{ext}"))
}

#[cfg(not(windows))]
fn candidate_names(name: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(name.to_string())
}

/// Checks whether `path` is a regular file the current user may execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Checks whether `path` is a regular file the current user may execute.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Runs a command with inherited standard streams and waits for it to exit.
pub async fn run_inherited(mut cmd: Command) -> io::Result<ExitStatus> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .status()
        .await
}

/// Spawns a command and captures its stdout and stderr separately.
/// Both pipes are drained concurrently with waiting on the child so a chatty
/// process can never block on a full pipe.
///
/// 派生一个命令并分别捕获其 stdout 和 stderr。
/// 两个管道在等待子进程的同时被并发读取，因此输出很多的进程不会因管道写满而阻塞。
pub async fn spawn_and_capture(mut cmd: Command) -> io::Result<CapturedOutput> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

    let read_stdout = async {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    };
    let read_stderr = async {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    };

    let (stdout, stderr, status) = tokio::try_join!(read_stdout, read_stderr, child.wait())?;

    Ok(CapturedOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}
