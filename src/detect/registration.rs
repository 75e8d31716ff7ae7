//! Decorator-declared registration lists.
//!
//! A definition is a decorated class whose decorator call takes a config
//! object, for example
//!
//! ```text
//! @NgModule({ imports: [HttpModule], providers: [ApiService] })
//! export class AppModule {}
//! ```
//!
//! and a registration list is one array-valued property of that object.

use crate::detect::aliases::references_any;
use crate::query::{find_all, Selector};
use crate::syntax::{NodeRef, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Which decorator and which property of its config hold a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationList {
    pub decorator: String,
    pub property: String,
}

impl RegistrationList {
    pub fn new(decorator: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            decorator: decorator.into(),
            property: property.into(),
        }
    }
}

/// A definition found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleReference {
    pub definition_name: String,
    pub file_path: PathBuf,
}

/// A provider to register, and the module exporting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub module: String,
}

/// A decorated class and its decorator call.
#[derive(Debug, Clone, Copy)]
pub struct DefinitionSite<'a> {
    pub class_name: &'a str,
    pub class: NodeRef<'a>,
    /// The decorator's `arguments` node, parentheses included
    pub arguments: NodeRef<'a>,
}

impl<'a> DefinitionSite<'a> {
    /// The config object passed to the decorator.
    pub fn config(&self) -> Option<NodeRef<'a>> {
        self.arguments
            .named_children()
            .next()
            .filter(|arg| arg.kind() == "object")
    }

    /// The `property: value` pair of the config object.
    pub fn property(&self, name: &str) -> Option<NodeRef<'a>> {
        self.config()?.named_children().find(|pair| {
            pair.kind() == "pair"
                && pair
                    .child_by_field("key")
                    .is_some_and(|key| key.literal_value() == name)
        })
    }

    /// Value of a config property.
    pub fn property_value(&self, name: &str) -> Option<NodeRef<'a>> {
        self.property(name)?.child_by_field("value")
    }
}

/// Every class decorated with `@decorator(...)`, including decorators placed
/// before `export`.
pub fn find_definitions<'a>(tree: &'a SyntaxTree<'a>, decorator: &str) -> Vec<DefinitionSite<'a>> {
    find_all(tree, &Selector::kind("class_declaration"))
        .into_iter()
        .filter_map(|m| {
            let class = m.node;
            let name = class.child_by_field("name")?;
            let exported = class
                .parent()
                .filter(|parent| parent.kind() == "export_statement");
            let arguments = class
                .children_by_field("decorator")
                .chain(exported.into_iter().flat_map(|e| e.children_by_field("decorator")))
                .find_map(|d| decorator_arguments(d, decorator))?;
            Some(DefinitionSite {
                class_name: name.text(),
                class,
                arguments,
            })
        })
        .collect()
}

fn decorator_arguments<'a>(decorator: NodeRef<'a>, name: &str) -> Option<NodeRef<'a>> {
    let call = decorator
        .named_children()
        .find(|child| child.kind() == "call_expression")?;
    let function = call.child_by_field("function")?;
    if function.text() != name {
        return None;
    }
    call.child_by_field("arguments")
}

/// Leading identifier of an entry expression: `provideHttp()` -> `provideHttp`.
pub fn leading_identifier(entry: &str) -> &str {
    let entry = entry.trim_start().trim_start_matches("...");
    let end = entry
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(entry.len());
    &entry[..end]
}

/// Definitions whose `list` references `target` or one of its aliases.
pub fn definitions_referencing(
    tree: &SyntaxTree<'_>,
    path: &Path,
    list: &RegistrationList,
    target: &str,
    aliases: &BTreeSet<String>,
) -> Vec<ModuleReference> {
    let mut names = aliases.clone();
    names.insert(target.to_string());

    find_definitions(tree, &list.decorator)
        .into_iter()
        .filter(|site| {
            site.property_value(&list.property)
                .is_some_and(|value| references_any(value, &names))
        })
        .map(|site| ModuleReference {
            definition_name: site.class_name.to_string(),
            file_path: path.to_path_buf(),
        })
        .collect()
}

/// Whether the referenced definition's `list` already contains `artifact`
/// (matched by its leading identifier) or one of its aliases.
pub fn is_registered(
    tree: &SyntaxTree<'_>,
    reference: &ModuleReference,
    list: &RegistrationList,
    artifact: &str,
    aliases: &BTreeSet<String>,
) -> bool {
    let mut names = aliases.clone();
    names.insert(leading_identifier(artifact).to_string());

    find_definitions(tree, &list.decorator)
        .into_iter()
        .filter(|site| site.class_name == reference.definition_name)
        .any(|site| {
            site.property_value(&list.property)
                .is_some_and(|value| references_any(value, &names))
        })
}
