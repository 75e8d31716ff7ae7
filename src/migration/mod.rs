//! Migration plans and the orchestrator that runs them.
//!
//! A plan is a TOML file describing one version-to-version upgrade:
//! manifest edits, an optional code-generation command and an ordered list
//! of steps. [`Migrator`] runs it against a [`FileTree`](crate::vfs::FileTree).

pub mod codegen;
pub mod context;
pub mod loader;
pub mod orchestrator;
pub mod outcome;
pub mod schema;
pub mod steps;

pub use codegen::{CodegenError, CommandRunner, RecordingRunner, SystemRunner};
pub use context::{MigrationContext, Warning};
pub use loader::{load_from_path, load_from_str, PlanError};
pub use orchestrator::{
    CodegenStatus, MigrationError, MigrationReport, Migrator, RunState, REMOVE_DEPENDENCIES,
    UPDATE_DEPENDENCIES,
};
pub use outcome::{StepOutcome, StepReport};
pub use schema::{
    CodegenCommand, DependencyPlan, Metadata, MigrationPlan, StepAction, StepDefinition,
    UsageQueryDef, ValidationError, ValidationIssue,
};
pub use steps::{run_step, StepError, MANIFEST_PATH};
