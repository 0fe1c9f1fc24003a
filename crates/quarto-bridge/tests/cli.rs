/*
 * tests/cli.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the quarto-bridge binary.
 */

//! End-to-end tests for the `quarto-bridge` binary.
//!
//! A shell script stands in for quarto and is passed with `--quarto`.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const FAKE_QUARTO: &str = r#"#!/bin/sh
cmd="$1"
shift
if [ "$cmd" = "--version" ]; then
  echo "1.6.42"
  exit 0
fi
input="$1"
shift
output=""
while [ "$#" -gt 0 ]; do
  case "$1" in
    --output) output="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if grep -q "FAIL" "$input"; then
  echo "ERROR: kernel died" >&2
  exit 3
fi
case "$cmd" in
  render) sed 's/{python}/ python/' "$input" > "$output" ;;
  convert) printf '# Converted\n\n' > "$output"; cat "$input" >> "$output" ;;
esac
"#;

struct Fixture {
    dir: TempDir,
    quarto: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let quarto = dir.path().join("quarto");
        std::fs::write(&quarto, FAKE_QUARTO).expect("Failed to write fake quarto");
        std::fs::set_permissions(&quarto, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod fake quarto");
        Self { dir, quarto }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write input");
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_quarto-bridge"))
            .arg("--quarto")
            .arg(&self.quarto)
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute quarto-bridge")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

#[test]
fn test_check_reports_binary_and_version() {
    let fixture = Fixture::new();

    let output = fixture.run(&["check"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(&format!("quarto: {}", fixture.quarto.display())));
    assert!(out.contains("version: 1.6.42"));
}

#[test]
fn test_render_to_stdout() {
    let fixture = Fixture::new();
    let input = fixture.write("doc.md", "# Title\n\n```{python}\nprint(1)\n```\n");

    let output = fixture.run(&["render", path_arg(&input)]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "# Title\n\n``` python\nprint(1)\n```\n");
}

#[test]
fn test_render_html_to_file() {
    let fixture = Fixture::new();
    let input = fixture.write("doc.md", "# Title\n\n```{python}\nprint(1)\n```\n");
    let target = fixture.dir.path().join("doc.html");

    let output = fixture.run(&[
        "--quiet",
        "render",
        path_arg(&input),
        "--html",
        "-o",
        path_arg(&target),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let html = std::fs::read_to_string(&target).unwrap();
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains(r#"<code class="language-python">print(1)"#));
}

#[test]
fn test_render_failure_exits_nonzero() {
    let fixture = Fixture::new();
    let input = fixture.write("doc.md", "FAIL\n");

    let output = fixture.run(&["render", path_arg(&input)]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("exit 3"), "stderr: {}", err);
    assert!(err.contains("kernel died"), "stderr: {}", err);
}

#[test]
fn test_render_missing_input() {
    let fixture = Fixture::new();
    let missing = fixture.dir.path().join("missing.md");

    let output = fixture.run(&["render", path_arg(&missing)]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read input file"));
}

#[test]
fn test_convert_notebook() {
    let fixture = Fixture::new();
    let notebook = fixture.write("analysis.ipynb", "{\"cells\": []}");

    let output = fixture.run(&["convert", path_arg(&notebook)]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "# Converted\n\n{\"cells\": []}");
}

#[test]
fn test_check_with_missing_binary() {
    let output = Command::new(env!("CARGO_BIN_EXE_quarto-bridge"))
        .args(["--quarto", "/nonexistent/quarto", "check"])
        .output()
        .expect("Failed to execute quarto-bridge");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("/nonexistent/quarto"));
}
