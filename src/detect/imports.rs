use crate::query::{find_all, find_within, Selector};
use crate::syntax::{NodeRef, SyntaxTree};
use std::fmt;

/// A named export of a module, as used in `import { specifier } from "module"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportDescriptor {
    pub specifier: String,
    pub module: String,
}

impl ImportDescriptor {
    pub fn new(specifier: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            module: module.into(),
        }
    }

    /// Whether a file already imports this by name.
    pub fn is_imported_by(&self, tree: &SyntaxTree<'_>) -> bool {
        has_import_of_specifier(tree, &self.module, &self.specifier)
    }
}

/// Renders the import statement that brings the specifier in.
impl fmt::Display for ImportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import {{{}}} from \"{}\";", self.specifier, self.module)
    }
}

/// One `name [as alias]` entry of a named-import list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedName<'a> {
    pub specifier: NodeRef<'a>,
    pub name: &'a str,
    pub alias: Option<&'a str>,
}

impl<'a> ImportedName<'a> {
    /// Name the binding is known by in the importing file.
    pub fn local_name(&self) -> &'a str {
        self.alias.unwrap_or(self.name)
    }
}

/// Import statements whose source is `module`, in document order.
pub fn imports_of<'a>(tree: &'a SyntaxTree<'a>, module: &str) -> Vec<NodeRef<'a>> {
    let selector = Selector::kind("import_statement").with_attr("source", module);
    find_all(tree, &selector).into_iter().map(|m| m.node).collect()
}

/// Whether `import type ...` is used for this statement.
pub fn is_type_only(import: NodeRef<'_>) -> bool {
    import.has_token("type")
}

/// Named-import entries of one import statement.
pub fn imported_names<'a>(import: NodeRef<'a>) -> Vec<ImportedName<'a>> {
    find_within(import, &Selector::kind("import_specifier"))
        .into_iter()
        .filter_map(|m| {
            let name = m.node.child_by_field("name")?;
            Some(ImportedName {
                specifier: m.node,
                name: name.text(),
                alias: m.node.child_by_field("alias").map(|alias| alias.text()),
            })
        })
        .collect()
}

pub fn has_import(tree: &SyntaxTree<'_>, module: &str) -> bool {
    !imports_of(tree, module).is_empty()
}

pub fn has_import_of_specifier(tree: &SyntaxTree<'_>, module: &str, specifier: &str) -> bool {
    imports_of(tree, module)
        .into_iter()
        .flat_map(imported_names)
        .any(|imported| imported.name == specifier)
}

/// `import * as ns from "module"`, which exposes every export.
pub fn has_namespace_import(tree: &SyntaxTree<'_>, module: &str) -> bool {
    imports_of(tree, module)
        .into_iter()
        .any(|import| !find_within(import, &Selector::kind("namespace_import")).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceLang;

    const SOURCE: &str = r#"
import { Injectable, Inject as In } from "@acme/core";
import type { Config } from "@acme/config";
import * as http from '@acme/http';
"#;

    fn parse(source: &str) -> SyntaxTree<'_> {
        SyntaxTree::parse(source, SourceLang::TypeScript).unwrap()
    }

    #[test]
    fn detects_named_imports() {
        let tree = parse(SOURCE);
        assert!(has_import(&tree, "@acme/core"));
        assert!(!has_import(&tree, "@acme/missing"));
        assert!(has_import_of_specifier(&tree, "@acme/core", "Injectable"));
        assert!(has_import_of_specifier(&tree, "@acme/core", "Inject"));
        assert!(!has_import_of_specifier(&tree, "@acme/core", "In"));
    }

    #[test]
    fn descriptor_checks_and_renders_named_imports() {
        let tree = parse(SOURCE);
        assert!(ImportDescriptor::new("Injectable", "@acme/core").is_imported_by(&tree));
        assert!(!ImportDescriptor::new("Component", "@acme/core").is_imported_by(&tree));
        assert_eq!(
            ImportDescriptor::new("provideHttp", "@acme/http").to_string(),
            "import {provideHttp} from \"@acme/http\";"
        );
    }

    #[test]
    fn detects_namespace_imports() {
        let tree = parse(SOURCE);
        assert!(has_namespace_import(&tree, "@acme/http"));
        assert!(!has_namespace_import(&tree, "@acme/core"));
    }

    #[test]
    fn type_only_imports() {
        let tree = parse(SOURCE);
        let config = imports_of(&tree, "@acme/config");
        assert!(is_type_only(config[0]));
        let core = imports_of(&tree, "@acme/core");
        assert!(!is_type_only(core[0]));
    }

    #[test]
    fn aliases_are_reported() {
        let tree = parse(SOURCE);
        let core = imports_of(&tree, "@acme/core");
        let names = imported_names(core[0]);
        assert_eq!(names.len(), 2);
        assert_eq!(names[1].name, "Inject");
        assert_eq!(names[1].local_name(), "In");
        assert_eq!(names[0].local_name(), "Injectable");
    }
}
