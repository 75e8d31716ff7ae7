//! Migrations written through to a real directory.

use std::fs;
use tempfile::TempDir;
use uplift::migration::RecordingRunner;
use uplift::{load_from_str, DiskTree, FileTree, Migrator};

const PLAN: &str = r#"
[meta]
name = "rename-grid"

[[steps]]
id = "rename-grid"
type = "rename-markup-tag"
from = "acme-grid"
to = "acme-table"

[[steps]]
id = "ignore-cache"
type = "ignore-entry"
file = ".gitignore"
add = ["/.acme"]
"#;

fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src/app")).unwrap();
    fs::create_dir_all(dir.path().join("node_modules/@acme/widgets")).unwrap();
    fs::create_dir_all(dir.path().join("dist")).unwrap();

    fs::write(dir.path().join(".gitignore"), "/dist\n").unwrap();
    fs::write(
        dir.path().join("src/app/list.component.ts"),
        "@Component({ template: `<acme-grid></acme-grid>` })\nexport class ListComponent {}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("node_modules/@acme/widgets/grid.html"),
        "<acme-grid></acme-grid>\n",
    )
    .unwrap();
    fs::write(dir.path().join("dist/index.html"), "<acme-grid></acme-grid>\n").unwrap();
    dir
}

#[test]
fn writes_changes_to_disk() {
    let dir = setup_project();
    let mut tree = DiskTree::open(dir.path()).unwrap();
    let report = Migrator::new(load_from_str(PLAN).unwrap())
        .unwrap()
        .with_project_root(dir.path())
        .with_runner(RecordingRunner::default())
        .run(&mut tree)
        .unwrap();

    assert!(!report.has_failures());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/app/list.component.ts")).unwrap(),
        "@Component({ template: `<acme-table></acme-table>` })\nexport class ListComponent {}\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
        "/dist\n/.acme\n"
    );
    assert_eq!(tree.changes().len(), 2);
}

#[test]
fn dependencies_and_ignored_output_are_untouched() {
    let dir = setup_project();
    let mut tree = DiskTree::open(dir.path()).unwrap();
    Migrator::new(load_from_str(PLAN).unwrap())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut tree)
        .unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("node_modules/@acme/widgets/grid.html")).unwrap(),
        "<acme-grid></acme-grid>\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("dist/index.html")).unwrap(),
        "<acme-grid></acme-grid>\n"
    );
}

#[test]
fn snapshot_runs_leave_the_checkout_alone() {
    let dir = setup_project();
    let disk = DiskTree::open(dir.path()).unwrap();
    let mut snapshot = disk.snapshot();
    let report = Migrator::new(load_from_str(PLAN).unwrap())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut snapshot)
        .unwrap();

    assert_eq!(report.changed_files().len(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
        "/dist\n"
    );
}
