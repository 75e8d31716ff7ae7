//! Integration tests for the command-line interface
//!
//! Runs the built binary against throwaway projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const PLAN: &str = r#"[meta]
name = "grid-to-table"
description = "Rename acme-grid to acme-table"
package = "@acme/widgets"
version_range = ">=16.0.0, <17.0.0"
source_root = "src"

[[dependencies.update]]
name = "@acme/widgets"
to = "^17.0.0"

[codegen]
command = "uplift-test-codegen-that-does-not-exist"

[[steps]]
id = "rename-grid"
type = "rename-markup-tag"
from = "acme-grid"
to = "acme-table"
"#;

/// Helper to create a project with a plan next to it
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("app/src")).unwrap();

    fs::write(
        dir.path().join("app/package.json"),
        "{\n  \"dependencies\": {\n    \"@acme/widgets\": \"^16.1.0\"\n  }\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("app/src/index.html"),
        "<body>\n  <acme-grid></acme-grid>\n</body>\n",
    )
    .unwrap();
    fs::write(dir.path().join("plan.toml"), PLAN).unwrap();
    dir
}

fn uplift(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_uplift"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn path(dir: &TempDir, relative: &str) -> String {
    dir.path().join(relative).to_str().unwrap().to_string()
}

fn read(dir: &TempDir, relative: &str) -> String {
    fs::read_to_string(dir.path().join(relative)).unwrap()
}

#[test]
fn test_apply_help() {
    let output = uplift(&["apply", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Apply a migration plan to a project"));
    assert!(stdout.contains("--skip-codegen"));
}

#[test]
fn test_list() {
    let dir = setup_project();
    let output = uplift(&["list", "--plan", &path(&dir, "plan.toml")]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("grid-to-table"));
    assert!(stdout.contains("Applies to: @acme/widgets >=16.0.0, <17.0.0"));
    assert!(stdout.contains("update @acme/widgets -> ^17.0.0"));
    assert!(stdout.contains("rename-grid [rename-markup-tag] <acme-grid> -> <acme-table>"));
}

#[test]
fn test_check_leaves_project_untouched() {
    let dir = setup_project();
    let output = uplift(&[
        "check",
        "--project",
        &path(&dir, "app"),
        "--plan",
        &path(&dir, "plan.toml"),
        "--diff",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("[CHECK"));
    assert!(stdout.contains("would run `uplift-test-codegen-that-does-not-exist`"));
    assert!(stdout.contains("+  <acme-table></acme-table>"));
    assert!(stdout.contains("Summary:"));

    assert_eq!(
        read(&dir, "app/src/index.html"),
        "<body>\n  <acme-grid></acme-grid>\n</body>\n"
    );
}

#[test]
fn test_apply_with_skip_codegen() {
    let dir = setup_project();
    let output = uplift(&[
        "apply",
        "--project",
        &path(&dir, "app"),
        "--plan",
        &path(&dir, "plan.toml"),
        "--skip-codegen",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("✓ rename-grid"));
    assert!(stdout.contains("code generation skipped"));

    assert_eq!(
        read(&dir, "app/src/index.html"),
        "<body>\n  <acme-table></acme-table>\n</body>\n"
    );
    assert!(read(&dir, "app/package.json").contains("\"@acme/widgets\": \"^17.0.0\""));
}

#[test]
fn test_apply_fails_when_codegen_cannot_run() {
    let dir = setup_project();
    let output = uplift(&[
        "apply",
        "--project",
        &path(&dir, "app"),
        "--plan",
        &path(&dir, "plan.toml"),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("uplift-test-codegen-that-does-not-exist"), "{stderr}");
}

#[test]
fn test_second_apply_is_skipped_by_version() {
    let dir = setup_project();
    let args = [
        "apply",
        "--project",
        &path(&dir, "app"),
        "--plan",
        &path(&dir, "plan.toml"),
        "--skip-codegen",
    ];

    assert!(uplift(&args).status.success());
    let output = uplift(&args);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Skipped"), "{stdout}");
}

#[test]
fn test_invalid_plan_is_rejected() {
    let dir = setup_project();
    let plan = dir.path().join("bad.toml");
    fs::write(&plan, "[meta]\nname = \"empty\"\n").unwrap();

    let output = uplift(&[
        "apply",
        "--project",
        &path(&dir, "app"),
        "--plan",
        plan.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does nothing"), "{stderr}");
    assert!(Path::new(&path(&dir, "app/src/index.html")).exists());
}
