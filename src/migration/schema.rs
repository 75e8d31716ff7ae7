use crate::cache;
use crate::detect::{ProviderDescriptor, UsageQuery};
use crate::manifest::DependencyUpdate;
use crate::query::{Selector, SelectorError};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// One version-to-version upgrade, as loaded from TOML.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct MigrationPlan {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub dependencies: DependencyPlan,
    #[serde(default)]
    pub codegen: Option<CodegenCommand>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl MigrationPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.steps.is_empty()
            && self.dependencies.update.is_empty()
            && self.dependencies.remove.is_empty()
            && self.codegen.is_none()
        {
            issues.push(ValidationIssue::EmptyPlan);
        }

        if self.meta.version_range.is_some() && self.meta.package.is_none() {
            issues.push(ValidationIssue::InvalidCombo {
                step_id: None,
                message: "meta.version_range requires meta.package".to_string(),
            });
        }

        for update in &self.dependencies.update {
            if update.name.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "dependencies.update.name",
                });
            }
            if update.to.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "dependencies.update.to",
                });
            }
        }

        if let Some(codegen) = &self.codegen {
            if codegen.command.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "codegen.command",
                });
            }
        }

        let mut seen = BTreeSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "id",
                });
            } else if !seen.insert(step.id.as_str()) {
                issues.push(ValidationIssue::DuplicateStepId {
                    id: step.id.clone(),
                });
            }
            step.action.validate(&step.id, &mut issues);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Package whose installed version gates the plan
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub version_range: Option<String>,
    /// Directory (relative to the project root) holding application sources
    #[serde(default = "default_source_root")]
    pub source_root: String,
}

fn default_source_root() -> String {
    ".".to_string()
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DependencyPlan {
    #[serde(default)]
    pub update: Vec<DependencyUpdate>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// External code-generation command, run from the project root.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CodegenCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl fmt::Display for CodegenCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StepDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StepAction {
    /// Rename a symbol exported by `module`.
    RenameSymbol {
        module: String,
        from: String,
        to: String,
    },
    /// Rename a markup tag in templates, inline or referenced.
    RenameMarkupTag {
        from: String,
        to: String,
    },
    /// Drop references to a removed package from JSON config files and
    /// stylesheets.
    StripPackageReferences {
        package: String,
        #[serde(default)]
        files: Vec<String>,
    },
    /// Report call sites whose contract changed.
    WarnUsages {
        message: String,
        /// Only inspect files importing this module
        #[serde(default)]
        module: Option<String>,
        query: UsageQueryDef,
    },
    /// Register `entry` in every definition whose registration list
    /// references `when_references`.
    InjectRegistration {
        decorator: String,
        property: String,
        when_references: String,
        /// Property receiving the entry; defaults to `property`
        #[serde(default)]
        into: Option<String>,
        entry: String,
        #[serde(default)]
        import: Option<ProviderDescriptor>,
    },
    RemoveConstructorParameters {
        types: Vec<String>,
    },
    /// Import `specifier` from `module` in every file importing
    /// `when_imports`.
    AddImport {
        module: String,
        specifier: String,
        when_imports: String,
    },
    /// Edit a line-oriented ignore file.
    IgnoreEntry {
        file: String,
        #[serde(default)]
        add: Vec<String>,
        #[serde(default)]
        remove: Vec<String>,
    },
}

impl StepAction {
    pub fn kind(&self) -> &'static str {
        match self {
            StepAction::RenameSymbol { .. } => "rename-symbol",
            StepAction::RenameMarkupTag { .. } => "rename-markup-tag",
            StepAction::StripPackageReferences { .. } => "strip-package-references",
            StepAction::WarnUsages { .. } => "warn-usages",
            StepAction::InjectRegistration { .. } => "inject-registration",
            StepAction::RemoveConstructorParameters { .. } => "remove-constructor-parameters",
            StepAction::AddImport { .. } => "add-import",
            StepAction::IgnoreEntry { .. } => "ignore-entry",
        }
    }

    /// `(value, field)` pairs that must not be blank.
    fn required_fields(&self) -> Vec<(&str, &'static str)> {
        match self {
            StepAction::RenameSymbol { module, from, to } => {
                vec![
                    (module.as_str(), "module"),
                    (from.as_str(), "from"),
                    (to.as_str(), "to"),
                ]
            }
            StepAction::RenameMarkupTag { from, to } => vec![(from.as_str(), "from"), (to.as_str(), "to")],
            StepAction::StripPackageReferences { package, .. } => vec![(package.as_str(), "package")],
            StepAction::WarnUsages { message, query, .. } => match query {
                UsageQueryDef::Selector { selector } => {
                    vec![(message.as_str(), "message"), (selector.as_str(), "query.selector")]
                }
                UsageQueryDef::Pattern { pattern } => {
                    vec![(message.as_str(), "message"), (pattern.as_str(), "query.pattern")]
                }
            },
            StepAction::InjectRegistration {
                decorator,
                property,
                when_references,
                into,
                entry,
                import,
            } => {
                let mut fields = vec![
                    (decorator.as_str(), "decorator"),
                    (property.as_str(), "property"),
                    (when_references.as_str(), "when_references"),
                    (entry.as_str(), "entry"),
                ];
                if let Some(into) = into {
                    fields.push((into.as_str(), "into"));
                }
                if let Some(import) = import {
                    fields.push((import.name.as_str(), "import.name"));
                    fields.push((import.module.as_str(), "import.module"));
                }
                fields
            }
            StepAction::RemoveConstructorParameters { .. } => Vec::new(),
            StepAction::AddImport {
                module,
                specifier,
                when_imports,
            } => vec![
                (module.as_str(), "module"),
                (specifier.as_str(), "specifier"),
                (when_imports.as_str(), "when_imports"),
            ],
            StepAction::IgnoreEntry { file, .. } => vec![(file.as_str(), "file")],
        }
    }

    fn validate(&self, step_id: &str, issues: &mut Vec<ValidationIssue>) {
        for (value, field) in self.required_fields() {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: Some(step_id.to_string()),
                    field,
                });
            }
        }

        match self {
            StepAction::WarnUsages {
                query: UsageQueryDef::Selector { selector },
                ..
            } if !selector.trim().is_empty() => {
                if let Err(err) = selector.parse::<Selector>() {
                    issues.push(ValidationIssue::InvalidSelector {
                        step_id: step_id.to_string(),
                        message: err.to_string(),
                    });
                }
            }
            StepAction::RemoveConstructorParameters { types } => {
                if types.iter().all(|t| t.trim().is_empty()) {
                    issues.push(ValidationIssue::MissingField {
                        step_id: Some(step_id.to_string()),
                        field: "types",
                    });
                }
            }
            StepAction::IgnoreEntry { add, remove, .. } => {
                if add.is_empty() && remove.is_empty() {
                    issues.push(ValidationIssue::InvalidCombo {
                        step_id: Some(step_id.to_string()),
                        message: "ignore-entry needs at least one of add or remove".to_string(),
                    });
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UsageQueryDef {
    Selector { selector: String },
    /// ast-grep pattern such as `$STORE.select($$$ARGS)`
    Pattern { pattern: String },
}

impl UsageQueryDef {
    /// Resolve into a runnable query. Selectors were checked by
    /// [`MigrationPlan::validate`], so this only fails for hand-built plans.
    pub fn to_query(&self) -> Result<UsageQuery, SelectorError> {
        match self {
            UsageQueryDef::Selector { selector } => {
                Ok(UsageQuery::Selector(cache::get_or_parse_selector(selector)?))
            }
            UsageQueryDef::Pattern { pattern } => Ok(UsageQuery::Pattern(pattern.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyPlan,
    DuplicateStepId {
        id: String,
    },
    MissingField {
        step_id: Option<String>,
        field: &'static str,
    },
    InvalidSelector {
        step_id: String,
        message: String,
    },
    InvalidCombo {
        step_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPlan => write!(f, "migration plan does nothing"),
            ValidationIssue::DuplicateStepId { id } => write!(f, "duplicate step id '{id}'"),
            ValidationIssue::MissingField { step_id, field } => match step_id {
                Some(id) => write!(f, "step '{id}' missing required field '{field}'"),
                None => write!(f, "plan missing required field '{field}'"),
            },
            ValidationIssue::InvalidSelector { step_id, message } => {
                write!(f, "step '{step_id}' has an invalid selector: {message}")
            }
            ValidationIssue::InvalidCombo { step_id, message } => match step_id {
                Some(id) => write!(f, "step '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid plan configuration: {message}"),
            },
        }
    }
}
