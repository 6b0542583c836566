// Shared test helpers for integration tests.
//
// `FakeProject` lays out a scratch build tree together with stand-in
// `ctest`, `llvm-profdata` and `llvm-cov` shell scripts. Each script appends
// its command line to `tools.log`, and its behaviour can be steered through
// `FAKE_*` environment variables set on the covgate process.
#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

const FAKE_CTEST: &str = r#"#!/bin/sh
echo "ctest $*" >> '@LOG@'
pwd > '@ROOT@/ctest_cwd.seen'
printf '%s' "$SPARKLE_SOURCE_ROOT" > '@ROOT@/source_root.seen'
if [ -n "$FAKE_CTEST_EXIT" ]; then
  echo "1 tests failed out of 12" >&2
  exit "$FAKE_CTEST_EXIT"
fi
if [ -z "$FAKE_CTEST_NO_PROFILE" ]; then
  profile=$(printf '%s' "$LLVM_PROFILE_FILE" | sed "s/%p/$$/")
  printf 'raw' > "$profile"
fi
exit 0
"#;

const FAKE_PROFDATA: &str = r#"#!/bin/sh
echo "llvm-profdata $*" >> '@LOG@'
if [ -n "$FAKE_PROFDATA_EXIT" ]; then
  echo "merge exploded" >&2
  exit "$FAKE_PROFDATA_EXIT"
fi
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
printf 'merged' > "$out"
"#;

const FAKE_LLVM_COV: &str = r#"#!/bin/sh
echo "llvm-cov $*" >> '@LOG@'
case "$1" in
  export)
    if [ -n "$FAKE_EXPORT_EXIT" ]; then
      echo "export stdout diagnostics"
      echo "malformed instrumentation profile data" >&2
      exit "$FAKE_EXPORT_EXIT"
    fi
    if [ -n "$FAKE_EXPORT_JSON" ]; then
      printf '%s' "$FAKE_EXPORT_JSON"
      exit 0
    fi
    line="${FAKE_LINE_PERCENT:-85.0}"
    printf '{"data":[{"files":[],"totals":{"lines":{"count":200,"covered":170,"percent":%s},"functions":{"count":10,"covered":9,"percent":90.0},"regions":{"count":100,"covered":80,"notcovered":20,"percent":80.0},"branches":{"count":0,"covered":0,"notcovered":0,"percent":0}}}],"type":"llvm.coverage.json.export","version":"2.0.1"}' "$line"
    ;;
  show)
    if [ -n "$FAKE_SHOW_EXIT" ]; then
      echo "show failed loudly" >&2
      exit "$FAKE_SHOW_EXIT"
    fi
    dir=""
    for arg in "$@"; do
      case "$arg" in
        --output-dir=*) dir="${arg#--output-dir=}" ;;
      esac
    done
    mkdir -p "$dir/coverage/src"
    printf '<html>index</html>' > "$dir/index.html"
    printf '<html>lib</html>' > "$dir/coverage/src/lib.cpp.html"
    ;;
esac
"#;

/// A scratch project with fake coverage tools.
pub struct FakeProject {
    pub root: TempDir,
}

impl FakeProject {
    pub fn new() -> Self {
        let root = tempdir().expect("Failed to create temporary directory");
        let project = Self { root };

        for dir in ["bin", "build", "src", "coverage"] {
            fs::create_dir_all(project.path(dir)).expect("Failed to create project directory");
        }
        fs::write(project.path("build/unit_tests"), "binary").unwrap();
        fs::write(project.path("build/libsparkle.a"), "archive").unwrap();

        project.install_script("bin/ctest", FAKE_CTEST);
        project.install_script("tools/llvm-profdata", FAKE_PROFDATA);
        project.install_script("tools/llvm-cov", FAKE_LLVM_COV);
        project
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn output(&self) -> PathBuf {
        self.path("coverage/summary.txt")
    }

    pub fn log_path(&self) -> PathBuf {
        self.path("tools.log")
    }

    fn install_script(&self, relative: &str, template: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let body = template
            .replace("@LOG@", &self.log_path().to_string_lossy())
            .replace("@ROOT@", &self.root.path().to_string_lossy());
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// `PATH` with the fake `ctest` directory in front of the real one.
    pub fn path_env(&self) -> String {
        let system = env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string());
        format!("{}:{}", self.path("bin").display(), system)
    }

    /// A covgate command with every required argument filled in.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("covgate").unwrap();
        cmd.env("PATH", self.path_env())
            .env("NO_COLOR", "1")
            .arg("--lang")
            .arg("en")
            .arg("--mode")
            .arg("llvm")
            .arg("--build-dir")
            .arg(self.path("build"))
            .arg("--output")
            .arg(self.output())
            .arg("--binary")
            .arg(self.path("build/unit_tests"))
            .arg("--library")
            .arg(self.path("build/libsparkle.a"))
            .arg("--source-root")
            .arg(self.path("src"))
            .arg("--llvm-profdata")
            .arg(self.path("tools/llvm-profdata"))
            .arg("--llvm-cov")
            .arg(self.path("tools/llvm-cov"));
        cmd
    }

    /// All command lines the fake tools recorded, in order.
    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// The recorded invocations of one tool.
    pub fn calls(&self, tool: &str) -> Vec<String> {
        let prefix = format!("{tool} ");
        self.log_lines()
            .into_iter()
            .filter(|line| line.starts_with(&prefix) || line == tool)
            .collect()
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }
}

/// Canonical form of a path, for comparing with what covgate resolved.
pub fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}
