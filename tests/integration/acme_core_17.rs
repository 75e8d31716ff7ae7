//! The bundled @acme/core 16 -> 17 plan against a small mock application.

use std::path::{Path, PathBuf};
use uplift::migration::{CodegenStatus, RecordingRunner, StepOutcome};
use uplift::{load_from_path, FileTree, MemoryTree, MigrationPlan, Migrator};

fn plan() -> MigrationPlan {
    load_from_path(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/plans/acme-core-16-to-17.toml"
    ))
    .unwrap()
}

fn mock_application() -> MemoryTree {
    MemoryTree::from_files([
        (
            "package.json",
            r#"{
  "name": "inventory",
  "dependencies": {
    "@acme/core": "^16.2.0",
    "@acme/widgets": "^16.1.0",
    "@acme/legacy-theme": "^16.0.0",
    "@acme/legacy-http": "^16.0.0"
  }
}
"#,
        ),
        (
            "angular.json",
            r#"{
  "projects": {
    "inventory": {
      "styles": ["src/styles.scss", "node_modules/@acme/legacy-theme/theme.css"]
    }
  }
}
"#,
        ),
        (".gitignore", "node_modules\n/.acme-cache\n"),
        (
            "src/styles.scss",
            "@use \"@acme/legacy-theme/vars\";\nbody { margin: 0; }\n",
        ),
        ("src/index.html", "<body><acme-grid></acme-grid></body>\n"),
        (
            "src/app/app.module.ts",
            r#"import { NgModule } from "@acme/core";
import { LegacyHttpModule } from "@acme/legacy-http";

@NgModule({
  imports: [LegacyHttpModule],
  providers: [ApiService],
})
export class AppModule {}
"#,
        ),
        (
            "src/app/grid.component.ts",
            r#"import { Component, Store } from "@acme/core";
import { NgZone } from "@angular/core";

@Component({ selector: "app-grid", templateUrl: "./grid.component.html" })
export class GridComponent {
  constructor(private store: Store<State>, zone: NgZone) {
    this.rows = store.select(selectRows);
  }
}
"#,
        ),
        (
            "src/app/grid.component.html",
            "<acme-grid [rows]=\"rows\"></acme-grid>\n",
        ),
        ("src/app/util.ts", "export const pageSize = 50;\n"),
    ])
}

fn read(files: &MemoryTree, path: &str) -> String {
    files.read(Path::new(path)).unwrap()
}

#[test]
fn migrates_the_whole_application() {
    let mut files = mock_application();
    let mut migrator = Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default());
    let report = migrator.run(&mut files).unwrap();

    assert_eq!(report.skipped_version, None);
    assert!(!report.has_failures(), "{:?}", report.outcomes);
    assert_eq!(report.codegen, CodegenStatus::Ran);
    assert_eq!(migrator.runner().commands, vec!["npx acme generate --project ."]);

    let manifest = read(&files, "package.json");
    assert!(manifest.contains("\"@acme/core\": \"^17.0.0\""));
    assert!(manifest.contains("\"@acme/widgets\": \"^17.0.0\""));
    assert!(!manifest.contains("legacy"));

    assert!(!read(&files, "angular.json").contains("legacy-theme"));
    assert_eq!(read(&files, "src/styles.scss"), "body { margin: 0; }\n");
    assert_eq!(read(&files, ".gitignore"), "node_modules\n/.acme\n");

    assert_eq!(
        read(&files, "src/app/grid.component.html"),
        "<acme-table [rows]=\"rows\"></acme-table>\n"
    );
    assert_eq!(
        read(&files, "src/index.html"),
        "<body><acme-table></acme-table></body>\n"
    );

    let grid = read(&files, "src/app/grid.component.ts");
    assert!(grid.contains("import { Component, StateStore, inject } from \"@acme/core\";"));
    assert!(grid.contains("constructor(private store: StateStore<State>) {"));
    assert!(!grid.contains("zone"));

    let module = read(&files, "src/app/app.module.ts");
    assert!(module.starts_with("import {provideHttp} from \"@acme/core/http\";\n"));
    assert!(module.contains("providers: [ApiService, provideHttp()]"));
    assert!(module.contains("import { NgModule, inject } from \"@acme/core\";"));

    assert_eq!(read(&files, "src/app/util.ts"), "export const pageSize = 50;\n");
    assert!(!report
        .changed_files()
        .contains(&PathBuf::from("src/app/util.ts")));
}

#[test]
fn reports_one_warning_per_detector() {
    let mut files = mock_application();
    let report = Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut files)
        .unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        report.warnings[0].to_string(),
        "StateStore.select() now returns a signal; call it to read the value. \
         Found in: src/app/grid.component.ts"
    );
}

#[test]
fn outcomes_follow_plan_order() {
    let mut files = mock_application();
    let report = Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut files)
        .unwrap();

    let ids: Vec<&str> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "dependencies.update",
            "dependencies.remove",
            "rename-store",
            "rename-grid",
            "drop-legacy-theme",
            "provide-http",
            "drop-zone-parameters",
            "import-inject",
            "warn-select",
            "ignore-cache",
        ]
    );
}

#[test]
fn migrated_project_is_gated_on_the_next_run() {
    let mut files = mock_application();
    Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut files)
        .unwrap();

    let report = Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut files)
        .unwrap();

    let reason = report.skipped_version.unwrap();
    assert!(reason.contains("@acme/core ^17.0.0"), "{reason}");
    assert!(report.outcomes.is_empty());
}

#[test]
fn forced_second_run_changes_nothing() {
    let mut files = mock_application();
    Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .run(&mut files)
        .unwrap();
    let migrated = files.clone();

    let report = Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .force(true)
        .run(&mut files)
        .unwrap();

    assert!(report.changed_files().is_empty(), "{:?}", report.changed_files());
    for path in migrated.paths() {
        assert_eq!(files.read(path), migrated.read(path), "{}", path.display());
    }
}

#[test]
fn skip_codegen_still_runs_steps() {
    let mut files = mock_application();
    let mut migrator = Migrator::new(plan())
        .unwrap()
        .with_runner(RecordingRunner::default())
        .skip_codegen(true);
    let report = migrator.run(&mut files).unwrap();

    assert_eq!(report.codegen, CodegenStatus::Skipped);
    assert!(migrator.runner().commands.is_empty());
    assert!(matches!(
        report.outcome("rename-store"),
        Some(StepOutcome::Completed { changed, .. }) if !changed.is_empty()
    ));
}
