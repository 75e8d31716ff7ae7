//! Plan step implementations.
//!
//! Each step walks the project through a [`FileTree`], runs one detector and
//! modifier pair per file and writes back only what changed. Rewrites are
//! fail-open, so a step only errors for problems outside a single file's
//! text: unreadable plans, invalid patterns, broken manifests.

use crate::detect::{
    aliases_of_any, definitions_referencing, find_usages, has_import, leading_identifier,
    template_references, RegistrationList, UsageQuery,
};
use crate::manifest::{self, DependencyUpdate, ManifestError};
use crate::migration::context::MigrationContext;
use crate::migration::outcome::StepOutcome;
use crate::migration::schema::{StepAction, UsageQueryDef};
use crate::modify::{
    rename_markup_tag_in_referenced_file, AddImport, AddRegistrationEntry, Modifier,
    ReferencedRename, RemoveParametersOfType, RenameImportedSymbol, RenameMarkupTag,
};
use crate::query::{QueryError, SelectorError};
use crate::syntax::{SourceLang, SyntaxTree};
use crate::vfs::{FileTree, TreeError};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// The project manifest, relative to the project root.
pub const MANIFEST_PATH: &str = "package.json";

const STYLESHEET_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

#[derive(Error, Debug)]
pub enum StepError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("{path}: {source}")]
    Manifest {
        path: PathBuf,
        source: ManifestError,
    },
}

/// Run one plan step against the files under `source_root`.
pub fn run_step(
    action: &StepAction,
    files: &mut dyn FileTree,
    source_root: &Path,
    ctx: &mut MigrationContext,
) -> Result<StepOutcome, StepError> {
    match action {
        StepAction::RenameSymbol { module, from, to } => {
            rewrite_sources(files, source_root, SourceLang::is_script, |_path, text, lang| {
                RenameImportedSymbol::new(module, from, to, lang)
                    .apply(text)
                    .into_text(text)
            })
        }
        StepAction::RenameMarkupTag { from, to } => rename_markup_tag(files, source_root, from, to),
        StepAction::StripPackageReferences { package, files: configs } => {
            strip_package_references(files, source_root, package, configs)
        }
        StepAction::WarnUsages {
            message,
            module,
            query,
        } => warn_usages(files, source_root, ctx, message, module.as_deref(), query),
        StepAction::InjectRegistration {
            decorator,
            property,
            when_references,
            into,
            entry,
            import,
        } => {
            let found_in = RegistrationList::new(decorator, property);
            let target = RegistrationList::new(decorator, into.as_deref().unwrap_or(property));
            let aliases = project_aliases(&*files, source_root, when_references);
            if !aliases.is_empty() {
                debug!(reference = %when_references, ?aliases, "project aliases");
            }
            let entry_aliases = project_aliases(&*files, source_root, leading_identifier(entry));

            rewrite_sources(files, source_root, SourceLang::is_script, |path, text, lang| {
                let references = match SyntaxTree::parse(text, lang) {
                    Ok(tree) => definitions_referencing(
                        &tree,
                        path,
                        &found_in,
                        when_references,
                        &aliases,
                    ),
                    Err(_) => Vec::new(),
                };

                let mut output = text.to_string();
                for reference in references {
                    let mut modifier = AddRegistrationEntry::new(reference, target.clone(), entry)
                        .with_aliases(entry_aliases.clone());
                    modifier.lang = lang;
                    output = modifier.apply(&output).into_text(&output);
                }
                if let Some(import) = import.as_ref().filter(|_| output != text) {
                    output = AddImport::new(&import.module, &import.name, lang)
                        .apply(&output)
                        .into_text(&output);
                }
                output
            })
        }
        StepAction::RemoveConstructorParameters { types } => {
            rewrite_sources(files, source_root, SourceLang::is_script, |_path, text, lang| {
                let mut modifier = RemoveParametersOfType::new(types.iter().map(|t| t.trim()));
                modifier.lang = lang;
                modifier.apply(text).into_text(text)
            })
        }
        StepAction::AddImport {
            module,
            specifier,
            when_imports,
        } => rewrite_sources(files, source_root, SourceLang::is_script, |_path, text, lang| {
            let triggered = SyntaxTree::parse(text, lang).is_ok_and(|tree| has_import(&tree, when_imports));
            if !triggered {
                return text.to_string();
            }
            AddImport::new(module, specifier, lang)
                .apply(text)
                .into_text(text)
        }),
        StepAction::IgnoreEntry { file, add, remove } => ignore_entry(files, file, add, remove),
    }
}

/// Apply `updates` to the project manifest.
pub fn update_dependencies(
    files: &mut dyn FileTree,
    updates: &[DependencyUpdate],
) -> Result<StepOutcome, StepError> {
    edit_manifest(files, |text| manifest::update_dependency_versions(text, updates))
}

/// Remove `names` from the project manifest.
pub fn remove_dependencies(
    files: &mut dyn FileTree,
    names: &[String],
) -> Result<StepOutcome, StepError> {
    edit_manifest(files, |text| manifest::remove_dependencies(text, names))
}

fn edit_manifest<F>(files: &mut dyn FileTree, edit: F) -> Result<StepOutcome, StepError>
where
    F: FnOnce(&str) -> Result<String, ManifestError>,
{
    let path = Path::new(MANIFEST_PATH);
    let Some(text) = files.read(path) else {
        error!(path = MANIFEST_PATH, "project manifest not found");
        return Ok(StepOutcome::Skipped {
            reason: format!("{MANIFEST_PATH} not found"),
        });
    };
    let output = edit(&text).map_err(|source| StepError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    if output == text {
        return Ok(StepOutcome::completed(Vec::new()));
    }
    files.write(path, &output)?;
    Ok(StepOutcome::completed(vec![path.to_path_buf()]))
}

/// Parseable files under `root` whose language passes `keep`.
fn source_files(
    files: &dyn FileTree,
    root: &Path,
    keep: impl Fn(SourceLang) -> bool,
) -> Vec<(PathBuf, SourceLang)> {
    files
        .files_under(root)
        .into_iter()
        .filter_map(|path| {
            let lang = SourceLang::from_path(&path)?;
            keep(lang).then_some((path, lang))
        })
        .collect()
}

/// Rewrite every selected source file with `rewrite`, writing back changes.
fn rewrite_sources<F>(
    files: &mut dyn FileTree,
    root: &Path,
    keep: impl Fn(SourceLang) -> bool,
    mut rewrite: F,
) -> Result<StepOutcome, StepError>
where
    F: FnMut(&Path, &str, SourceLang) -> String,
{
    let mut changed = Vec::new();
    let mut failed_files = Vec::new();

    for (path, lang) in source_files(&*files, root, keep) {
        let Some(text) = files.read(&path) else {
            continue;
        };
        let output = rewrite(&path, &text, lang);
        if output == text {
            continue;
        }
        match files.write(&path, &output) {
            Ok(()) => {
                debug!(path = %path.display(), "rewrote file");
                changed.push(path);
            }
            Err(err) => {
                error!(path = %path.display(), %err, "failed to write file");
                failed_files.push(path);
            }
        }
    }

    Ok(StepOutcome::Completed {
        changed,
        failed_files,
    })
}

fn rename_markup_tag(
    files: &mut dyn FileTree,
    root: &Path,
    from: &str,
    to: &str,
) -> Result<StepOutcome, StepError> {
    let mut changed = BTreeSet::new();
    let mut failed = BTreeSet::new();

    let inline = rewrite_sources(files, root, SourceLang::is_script, |_path, text, lang| {
        RenameMarkupTag::new(from, to, lang)
            .apply(text)
            .into_text(text)
    })?;
    merge(inline, &mut changed, &mut failed);

    for (path, lang) in source_files(&*files, root, SourceLang::is_script) {
        let Some(text) = files.read(&path) else {
            continue;
        };
        let references: Vec<String> = match SyntaxTree::parse(&text, lang) {
            Ok(tree) => template_references(&tree)
                .iter()
                .map(|node| node.text().to_string())
                .collect(),
            Err(_) => continue,
        };
        for reference in references {
            match rename_markup_tag_in_referenced_file(files, &path, &reference, from, to) {
                ReferencedRename::Renamed(template) => {
                    changed.insert(template);
                }
                ReferencedRename::Unchanged(_) => {}
                ReferencedRename::Missing(template) | ReferencedRename::Failed(template) => {
                    failed.insert(template);
                }
            }
        }
    }

    // Markup not owned by any component, such as index.html
    let markup = rewrite_sources(files, root, |lang| lang == SourceLang::Html, |_path, text, lang| {
        RenameMarkupTag::new(from, to, lang)
            .apply(text)
            .into_text(text)
    })?;
    merge(markup, &mut changed, &mut failed);

    Ok(StepOutcome::Completed {
        changed: changed.into_iter().collect(),
        failed_files: failed.into_iter().collect(),
    })
}

fn merge(outcome: StepOutcome, changed: &mut BTreeSet<PathBuf>, failed: &mut BTreeSet<PathBuf>) {
    if let StepOutcome::Completed {
        changed: more_changed,
        failed_files,
    } = outcome
    {
        changed.extend(more_changed);
        failed.extend(failed_files);
    }
}

fn strip_package_references(
    files: &mut dyn FileTree,
    root: &Path,
    package: &str,
    configs: &[String],
) -> Result<StepOutcome, StepError> {
    let mut changed = Vec::new();
    let mut failed_files = Vec::new();
    let mut missing = 0;

    for config in configs {
        let path = Path::new(config);
        let Some(text) = files.read(path) else {
            error!(path = %config, "config file not found");
            missing += 1;
            continue;
        };
        match manifest::strip_manifest_text(&text, package) {
            Ok(output) if output != text => match files.write(path, &output) {
                Ok(()) => changed.push(path.to_path_buf()),
                Err(err) => {
                    error!(path = %config, %err, "failed to write config file");
                    failed_files.push(path.to_path_buf());
                }
            },
            Ok(_) => {}
            Err(err) => {
                warn!(path = %config, %err, "cannot strip references from config file");
                failed_files.push(path.to_path_buf());
            }
        }
    }

    if !configs.is_empty() && missing == configs.len() {
        return Ok(StepOutcome::Skipped {
            reason: format!("none of {} exist", configs.join(", ")),
        });
    }

    for path in files.files_under(root) {
        let is_stylesheet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| STYLESHEET_EXTENSIONS.contains(&ext));
        if !is_stylesheet {
            continue;
        }
        let Some(text) = files.read(&path) else {
            continue;
        };
        let output = manifest::strip_stylesheet_references(&text, package);
        if output == text {
            continue;
        }
        match files.write(&path, &output) {
            Ok(()) => changed.push(path),
            Err(err) => {
                error!(path = %path.display(), %err, "failed to write stylesheet");
                failed_files.push(path);
            }
        }
    }

    Ok(StepOutcome::Completed {
        changed,
        failed_files,
    })
}

fn warn_usages(
    files: &dyn FileTree,
    root: &Path,
    ctx: &mut MigrationContext,
    message: &str,
    module: Option<&str>,
    query: &UsageQueryDef,
) -> Result<StepOutcome, StepError> {
    let query = query.to_query()?;
    let scripts_only = module.is_some() || matches!(query, UsageQuery::Pattern(_));
    let mut failed_files = Vec::new();

    for (path, lang) in source_files(files, root, |lang| !scripts_only || lang.is_script()) {
        let Some(text) = files.read(&path) else {
            continue;
        };
        let tree = match SyntaxTree::parse(&text, lang) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot parse file");
                failed_files.push(path);
                continue;
            }
        };
        if module.is_some_and(|module| !has_import(&tree, module)) {
            continue;
        }
        let usages = find_usages(&tree, &query)?;
        if usages.is_empty() {
            continue;
        }
        for usage in &usages {
            debug!(path = %path.display(), line = usage.line, text = %usage.text, "usage");
        }
        ctx.warn(message, &path);
    }

    Ok(StepOutcome::Completed {
        changed: Vec::new(),
        failed_files,
    })
}

/// `target` plus every name aliasing it anywhere in the project, computed to
/// a fixed point so aliases of aliases count. `target` itself is excluded.
fn project_aliases(files: &dyn FileTree, root: &Path, target: &str) -> BTreeSet<String> {
    let texts: Vec<(String, SourceLang)> = source_files(files, root, SourceLang::is_script)
        .into_iter()
        .filter_map(|(path, lang)| Some((files.read(&path)?, lang)))
        .collect();
    let trees: Vec<SyntaxTree<'_>> = texts
        .iter()
        .filter_map(|(text, lang)| SyntaxTree::parse(text, *lang).ok())
        .collect();

    let mut names = BTreeSet::from([target.to_string()]);
    loop {
        let found: BTreeSet<String> = trees
            .iter()
            .flat_map(|tree| aliases_of_any(tree, &names))
            .collect();
        let before = names.len();
        names.extend(found);
        if names.len() == before {
            break;
        }
    }
    names.remove(target);
    names
}

fn ignore_entry(
    files: &mut dyn FileTree,
    file: &str,
    add: &[String],
    remove: &[String],
) -> Result<StepOutcome, StepError> {
    let path = Path::new(file);
    let text = match files.read(path) {
        Some(text) => text,
        None if add.is_empty() => {
            error!(path = %file, "ignore file not found");
            return Ok(StepOutcome::Skipped {
                reason: format!("{file} not found"),
            });
        }
        None => {
            info!(path = %file, "creating ignore file");
            String::new()
        }
    };

    let mut output = text.clone();
    for entry in remove {
        output = manifest::remove_ignore_entry(&output, entry);
    }
    for entry in add {
        output = manifest::add_ignore_entry(&output, entry);
    }

    if output == text && files.exists(path) {
        return Ok(StepOutcome::completed(Vec::new()));
    }
    files.write(path, &output)?;
    Ok(StepOutcome::completed(vec![path.to_path_buf()]))
}
