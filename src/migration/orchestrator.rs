use crate::manifest::{dependency_version, ManifestError};
use crate::migration::codegen::{CodegenError, CommandRunner, SystemRunner};
use crate::migration::context::{MigrationContext, Warning};
use crate::migration::outcome::{StepOutcome, StepReport};
use crate::migration::schema::{MigrationPlan, ValidationError};
use crate::migration::steps::{self, StepError, MANIFEST_PATH};
use crate::version::matches_requirement;
use crate::vfs::FileTree;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Report id of the dependency version update.
pub const UPDATE_DEPENDENCIES: &str = "dependencies.update";
/// Report id of the dependency removal.
pub const REMOVE_DEPENDENCIES: &str = "dependencies.remove";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("invalid migration plan: {0}")]
    InvalidPlan(#[from] ValidationError),

    #[error("migration cannot run again (state: {0:?})")]
    AlreadyRun(RunState),

    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),

    #[error("cannot read the version of {package} from package.json: {source}")]
    Manifest {
        package: String,
        source: ManifestError,
    },
}

/// Whether the external command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenStatus {
    NotConfigured,
    Ran,
    Skipped,
}

/// Everything a run did.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub plan: String,
    /// Set when the version gate stopped the run before any change
    pub skipped_version: Option<String>,
    pub codegen: CodegenStatus,
    pub outcomes: Vec<StepReport>,
    pub warnings: Vec<Warning>,
}

impl MigrationReport {
    fn new(plan: &str) -> Self {
        Self {
            plan: plan.to_string(),
            skipped_version: None,
            codegen: CodegenStatus::NotConfigured,
            outcomes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Every file changed by any step.
    pub fn changed_files(&self) -> BTreeSet<PathBuf> {
        self.outcomes
            .iter()
            .flat_map(|report| report.outcome.changed().iter().cloned())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.outcomes.iter().filter(|report| report.outcome.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn outcome(&self, id: &str) -> Option<&StepOutcome> {
        self.outcomes
            .iter()
            .find(|report| report.id == id)
            .map(|report| &report.outcome)
    }
}

/// Runs one migration plan over a project.
///
/// The fixed order is: version gate, dependency updates, dependency
/// removals, code generation, then plan steps in order. Every phase except
/// code generation is isolated: an error or panic becomes a
/// [`StepOutcome::Failed`] and the run continues. A failed code generation
/// aborts the run.
///
/// ```no_run
/// use uplift::migration::{load_from_path, Migrator};
/// use uplift::vfs::DiskTree;
///
/// let plan = load_from_path("plans/acme-core-16-to-17.toml").unwrap();
/// let mut project = DiskTree::open("/path/to/app").unwrap();
/// let mut migrator = Migrator::new(plan).unwrap().with_project_root("/path/to/app");
/// let report = migrator.run(&mut project).unwrap();
/// for step in &report.outcomes {
///     println!("{}: {}", step.id, step.outcome);
/// }
/// ```
pub struct Migrator<R = SystemRunner> {
    plan: MigrationPlan,
    project_root: PathBuf,
    runner: R,
    skip_codegen: bool,
    force: bool,
    state: RunState,
}

impl Migrator<SystemRunner> {
    pub fn new(plan: MigrationPlan) -> Result<Self, MigrationError> {
        plan.validate()?;
        Ok(Self {
            plan,
            project_root: PathBuf::from("."),
            runner: SystemRunner,
            skip_codegen: false,
            force: false,
            state: RunState::NotStarted,
        })
    }
}

impl<R: CommandRunner> Migrator<R> {
    /// Working directory of the external command.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_runner<S: CommandRunner>(self, runner: S) -> Migrator<S> {
        Migrator {
            plan: self.plan,
            project_root: self.project_root,
            runner,
            skip_codegen: self.skip_codegen,
            force: self.force,
            state: self.state,
        }
    }

    pub fn skip_codegen(mut self, skip: bool) -> Self {
        self.skip_codegen = skip;
        self
    }

    /// Run even when the installed version is outside the plan's range.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn plan(&self) -> &MigrationPlan {
        &self.plan
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run(&mut self, files: &mut dyn FileTree) -> Result<MigrationReport, MigrationError> {
        if self.state != RunState::NotStarted {
            return Err(MigrationError::AlreadyRun(self.state));
        }
        self.state = RunState::Running;
        let result = self.execute(files);
        self.state = RunState::Finished;
        result
    }

    fn execute(&mut self, files: &mut dyn FileTree) -> Result<MigrationReport, MigrationError> {
        let mut report = MigrationReport::new(&self.plan.meta.name);
        info!(plan = %self.plan.meta.name, "starting migration");

        if let Some(reason) = self.version_gate(&*files)? {
            warn!(%reason, "skipping migration");
            report.skipped_version = Some(reason);
            return Ok(report);
        }

        let dependencies = &self.plan.dependencies;
        if !dependencies.update.is_empty() {
            let outcome = isolated(UPDATE_DEPENDENCIES, || {
                steps::update_dependencies(files, &dependencies.update)
            });
            report.outcomes.push(StepReport {
                id: UPDATE_DEPENDENCIES.to_string(),
                outcome,
            });
        }
        if !dependencies.remove.is_empty() {
            let outcome = isolated(REMOVE_DEPENDENCIES, || {
                steps::remove_dependencies(files, &dependencies.remove)
            });
            report.outcomes.push(StepReport {
                id: REMOVE_DEPENDENCIES.to_string(),
                outcome,
            });
        }

        if let Some(command) = &self.plan.codegen {
            if self.skip_codegen {
                info!(command = %command, "code generation skipped");
                report.codegen = CodegenStatus::Skipped;
            } else {
                self.runner.run(command, &self.project_root)?;
                report.codegen = CodegenStatus::Ran;
            }
        }

        let source_root = Path::new(&self.plan.meta.source_root);
        let mut ctx = MigrationContext::new();
        for step in &self.plan.steps {
            info!(step = %step.id, kind = step.action.kind(), "running step");
            let outcome = isolated(&step.id, || {
                steps::run_step(&step.action, files, source_root, &mut ctx)
            });
            info!(step = %step.id, %outcome, "step finished");
            report.outcomes.push(StepReport {
                id: step.id.clone(),
                outcome,
            });
        }

        report.warnings = ctx.flush();
        Ok(report)
    }

    /// Reason to skip the run, if the gated package's version is out of
    /// range.
    fn version_gate(&self, files: &dyn FileTree) -> Result<Option<String>, MigrationError> {
        let Some(package) = self.plan.meta.package.as_deref() else {
            return Ok(None);
        };
        if self.force {
            info!(%package, "version gate overridden");
            return Ok(None);
        }

        let Some(text) = files.read(Path::new(MANIFEST_PATH)) else {
            error!(path = MANIFEST_PATH, "project manifest not found");
            return Ok(Some(format!("{MANIFEST_PATH} not found")));
        };
        let declared = dependency_version(&text, package).map_err(|source| MigrationError::Manifest {
            package: package.to_string(),
            source,
        })?;
        let Some(declared) = declared else {
            return Ok(Some(format!("{package} is not a dependency of this project")));
        };

        let requirement = self.plan.meta.version_range.as_deref();
        match matches_requirement(&declared, requirement) {
            Ok(true) => Ok(None),
            Ok(false) => Ok(Some(format!(
                "{package} {declared} does not satisfy version_range {}",
                requirement.unwrap_or("").trim()
            ))),
            Err(err) => Ok(Some(format!("{package}: {err}"))),
        }
    }
}

/// Run one phase, turning errors and panics into a failed outcome.
fn isolated<F>(id: &str, phase: F) -> StepOutcome
where
    F: FnOnce() -> Result<StepOutcome, StepError>,
{
    match panic::catch_unwind(AssertUnwindSafe(phase)) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            error!(step = id, %err, "step failed");
            StepOutcome::Failed {
                reason: err.to_string(),
            }
        }
        Err(payload) => {
            let reason = format!("panicked: {}", panic_message(payload.as_ref()));
            error!(step = id, %reason, "step failed");
            StepOutcome::Failed { reason }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::codegen::RecordingRunner;
    use crate::migration::loader::load_from_str;
    use crate::vfs::MemoryTree;

    const PLAN: &str = r#"
[meta]
name = "core 16 to 17"
package = "@acme/core"
version_range = ">=16.0.0, <17.0.0"
source_root = "src"

[[dependencies.update]]
name = "@acme/core"
to = "^17.0.0"

[codegen]
command = "npx"
args = ["acme", "generate"]

[[steps]]
id = "rename-store"
type = "rename-symbol"
module = "@acme/core"
from = "Store"
to = "StateStore"
"#;

    fn project(core_version: &str) -> MemoryTree {
        MemoryTree::from_files([
            (
                "package.json".to_string(),
                format!("{{\n  \"dependencies\": {{\n    \"@acme/core\": \"{core_version}\"\n  }}\n}}\n"),
            ),
            (
                "src/app.ts".to_string(),
                "import { Store } from \"@acme/core\";\n".to_string(),
            ),
        ])
    }

    fn migrator() -> Migrator<RecordingRunner> {
        Migrator::new(load_from_str(PLAN).unwrap())
            .unwrap()
            .with_runner(RecordingRunner::default())
    }

    #[test]
    fn runs_phases_in_order() {
        let mut files = project("^16.2.0");
        let mut migrator = migrator();
        let report = migrator.run(&mut files).unwrap();

        assert_eq!(report.skipped_version, None);
        assert_eq!(report.codegen, CodegenStatus::Ran);
        assert_eq!(migrator.runner().commands, vec!["npx acme generate"]);
        let ids: Vec<&str> = report.outcomes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![UPDATE_DEPENDENCIES, "rename-store"]);
        assert_eq!(
            report.changed_files(),
            BTreeSet::from([PathBuf::from("package.json"), PathBuf::from("src/app.ts")])
        );
        assert!(files
            .read(Path::new("package.json"))
            .unwrap()
            .contains("\"^17.0.0\""));
        assert_eq!(migrator.state(), RunState::Finished);
    }

    #[test]
    fn second_run_is_rejected() {
        let mut files = project("^16.2.0");
        let mut migrator = migrator();
        migrator.run(&mut files).unwrap();
        assert!(matches!(
            migrator.run(&mut files),
            Err(MigrationError::AlreadyRun(RunState::Finished))
        ));
    }

    #[test]
    fn version_gate_skips_out_of_range_projects() {
        let mut files = project("^15.0.0");
        let mut migrator = migrator();
        let report = migrator.run(&mut files).unwrap();

        assert!(report.skipped_version.unwrap().contains("does not satisfy"));
        assert!(report.outcomes.is_empty());
        assert!(migrator.runner().commands.is_empty());
        assert!(files.journal().is_empty());
    }

    #[test]
    fn force_overrides_the_gate() {
        let mut files = project("^15.0.0");
        let mut migrator = migrator().force(true);
        let report = migrator.run(&mut files).unwrap();
        assert_eq!(report.skipped_version, None);
        assert_eq!(report.outcome("rename-store").unwrap().changed().len(), 1);
    }

    #[test]
    fn skipped_codegen_is_reported() {
        let mut files = project("^16.2.0");
        let mut migrator = migrator().skip_codegen(true);
        let report = migrator.run(&mut files).unwrap();
        assert_eq!(report.codegen, CodegenStatus::Skipped);
        assert!(migrator.runner().commands.is_empty());
    }

    struct FailingRunner;

    impl CommandRunner for FailingRunner {
        fn run(&mut self, command: &crate::migration::CodegenCommand, _cwd: &Path) -> Result<(), CodegenError> {
            Err(CodegenError::Failed {
                command: command.to_string(),
                code: Some(1),
            })
        }
    }

    #[test]
    fn failed_codegen_aborts_before_steps() {
        let mut files = project("^16.2.0");
        let mut migrator = Migrator::new(load_from_str(PLAN).unwrap())
            .unwrap()
            .with_runner(FailingRunner);
        let result = migrator.run(&mut files);

        assert!(matches!(result, Err(MigrationError::Codegen(_))));
        assert_eq!(migrator.state(), RunState::Finished);
        assert_eq!(
            files.read(Path::new("src/app.ts")).unwrap(),
            "import { Store } from \"@acme/core\";\n"
        );
    }

    #[test]
    fn failing_phase_does_not_stop_the_run() {
        let mut files = project("^16.2.0");
        files.insert("package.json", "{ not json");
        let plan = load_from_str(&PLAN.replace("package = \"@acme/core\"\nversion_range = \">=16.0.0, <17.0.0\"\n", ""))
            .unwrap();
        let mut migrator = Migrator::new(plan)
            .unwrap()
            .with_runner(RecordingRunner::default());
        let report = migrator.run(&mut files).unwrap();

        assert!(report.outcome(UPDATE_DEPENDENCIES).unwrap().is_failed());
        assert!(report.has_failures());
        assert_eq!(report.outcome("rename-store").unwrap().changed().len(), 1);
    }

    #[test]
    fn panics_are_contained() {
        let outcome = isolated("boom", || panic!("bad input"));
        assert_eq!(
            outcome,
            StepOutcome::Failed {
                reason: "panicked: bad input".to_string()
            }
        );
    }
}
