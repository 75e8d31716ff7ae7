//! `package.json` dependency edits.
//!
//! Key order is preserved (`serde_json` with `preserve_order`) and a
//! manifest that needs no change is returned byte-for-byte.

use crate::manifest::errors::ManifestError;
use crate::version::range_selected;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Sections holding dependency maps.
pub const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies"];

/// Replace the version of `name` with `to`.
///
/// With `from`, only versions equal to it (or whose lower bound satisfies it
/// as a requirement) are replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyUpdate {
    pub name: String,
    #[serde(default)]
    pub from: Option<String>,
    pub to: String,
}

impl DependencyUpdate {
    pub fn new(name: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: None,
            to: to.into(),
        }
    }

    pub fn from_range(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    fn applies_to(&self, current: &str) -> bool {
        current != self.to
            && self
                .from
                .as_deref()
                .map_or(true, |from| range_selected(current, from))
    }
}

fn parse_object(text: &str) -> Result<Map<String, Value>, ManifestError> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(ManifestError::NotAnObject),
    }
}

/// Pretty-print with two-space indent, keeping the original trailing newline.
pub(crate) fn render(value: &Value, original: &str) -> Result<String, ManifestError> {
    let mut text = serde_json::to_string_pretty(value)?;
    if original.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Apply `updates` to the dependency sections where the package is present.
pub fn update_dependency_versions(
    text: &str,
    updates: &[DependencyUpdate],
) -> Result<String, ManifestError> {
    let mut root = parse_object(text)?;
    let mut changed = false;

    for section in DEPENDENCY_SECTIONS {
        let Some(Value::Object(deps)) = root.get_mut(*section) else {
            continue;
        };
        for update in updates {
            let Some(Value::String(current)) = deps.get_mut(&update.name) else {
                continue;
            };
            if update.applies_to(current) {
                debug!(package = %update.name, from = %current, to = %update.to, section, "updating dependency");
                *current = update.to.clone();
                changed = true;
            }
        }
    }

    if !changed {
        return Ok(text.to_string());
    }
    render(&Value::Object(root), text)
}

/// Remove `names` from every dependency section.
pub fn remove_dependencies(text: &str, names: &[String]) -> Result<String, ManifestError> {
    let mut root = parse_object(text)?;
    let mut changed = false;

    for section in DEPENDENCY_SECTIONS {
        let Some(Value::Object(deps)) = root.get_mut(*section) else {
            continue;
        };
        for name in names {
            if deps.shift_remove(name).is_some() {
                debug!(package = %name, section, "removed dependency");
                changed = true;
            }
        }
    }

    if !changed {
        return Ok(text.to_string());
    }
    render(&Value::Object(root), text)
}

/// Declared version range of `name`, looked up in section order.
pub fn dependency_version(text: &str, name: &str) -> Result<Option<String>, ManifestError> {
    let root = parse_object(text)?;
    Ok(DEPENDENCY_SECTIONS
        .iter()
        .filter_map(|section| root.get(*section)?.get(name)?.as_str())
        .map(str::to_string)
        .next())
}
