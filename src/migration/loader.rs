use crate::migration::schema::{MigrationPlan, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum PlanError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl PlanError {
    fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            PlanError::Io { .. } => self,
            PlanError::Toml { path: None, source } => PlanError::Toml {
                path: Some(path),
                source,
            },
            PlanError::Validation { path: None, source } => PlanError::Validation {
                path: Some(path),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Io { path, source } => {
                write!(
                    f,
                    "failed to read migration plan from {}: {}",
                    path.display(),
                    source
                )
            }
            PlanError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse migration plan TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse migration plan TOML: {}", source),
            },
            PlanError::Validation { path, source } => match path {
                Some(path) => write!(f, "invalid migration plan ({}): {}", path.display(), source),
                None => write!(f, "invalid migration plan: {}", source),
            },
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::Io { source, .. } => Some(source),
            PlanError::Toml { source, .. } => Some(source),
            PlanError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<MigrationPlan, PlanError> {
    let plan: MigrationPlan =
        toml_edit::de::from_str(input).map_err(|source| PlanError::Toml { path: None, source })?;
    plan.validate()
        .map_err(|source| PlanError::Validation { path: None, source })?;
    Ok(plan)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<MigrationPlan, PlanError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::schema::{StepAction, UsageQueryDef, ValidationIssue};

    #[test]
    fn loads_tagged_steps() {
        let plan = load_from_str(
            r#"
[meta]
name = "core 16 to 17"
package = "@acme/core"
version_range = ">=16.0.0, <17.0.0"

[[steps]]
id = "rename-store"
type = "rename-symbol"
module = "@acme/core"
from = "Store"
to = "StateStore"

[[steps]]
id = "warn-select"
type = "warn-usages"
message = "select() now returns a signal."
query = { type = "pattern", pattern = "$S.select($$$A)" }
"#,
        )
        .unwrap();

        assert_eq!(plan.meta.source_root, ".");
        assert_eq!(plan.steps.len(), 2);
        assert!(matches!(
            &plan.steps[0].action,
            StepAction::RenameSymbol { from, to, .. } if from == "Store" && to == "StateStore"
        ));
        assert!(matches!(
            &plan.steps[1].action,
            StepAction::WarnUsages { query: UsageQueryDef::Pattern { .. }, module: None, .. }
        ));
    }

    #[test]
    fn validation_collects_every_issue() {
        let err = load_from_str(
            r#"
[[steps]]
id = "a"
type = "rename-markup-tag"
from = ""
to = "acme-table"

[[steps]]
id = "a"
type = "warn-usages"
message = "x"
query = { type = "selector", selector = "identifier[name=" }
"#,
        )
        .unwrap_err();

        let PlanError::Validation { source, .. } = err else {
            panic!("expected validation error, got {err}");
        };
        assert!(source.issues.contains(&ValidationIssue::MissingField {
            step_id: Some("a".to_string()),
            field: "from",
        }));
        assert!(source
            .issues
            .contains(&ValidationIssue::DuplicateStepId { id: "a".to_string() }));
        assert!(source
            .issues
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::InvalidSelector { .. })));
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = load_from_str("[meta]\nname = \"nothing\"\n").unwrap_err();
        assert!(err.to_string().contains("does nothing"));
    }

    #[test]
    fn unknown_step_type_is_a_parse_error() {
        let err = load_from_str("[[steps]]\nid = \"x\"\ntype = \"teleport\"\n").unwrap_err();
        assert!(matches!(err, PlanError::Toml { .. }));
    }

    #[test]
    fn path_is_attached_to_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.toml");
        fs::write(&path, "[meta]\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(&err, PlanError::Validation { path: Some(p), .. } if p == &path));
        assert!(matches!(
            load_from_path(dir.path().join("missing.toml")),
            Err(PlanError::Io { .. })
        ));
    }
}
