use crate::detect::{imported_names, imports_of};
use crate::modify::Modifier;
use crate::query::{find_all, replace_matches, Selector};
use crate::syntax::{NodeRef, SourceLang, SyntaxTree};

/// Rename a symbol imported from `module`, following it through the file.
///
/// When the import is unaliased every identifier and type reference to the
/// old name is renamed too. If the new name is imported already, the old
/// specifier is dropped instead of renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameImportedSymbol {
    pub module: String,
    pub old: String,
    pub new: String,
    pub lang: SourceLang,
}

impl RenameImportedSymbol {
    pub fn new(
        module: impl Into<String>,
        old: impl Into<String>,
        new: impl Into<String>,
        lang: SourceLang,
    ) -> Self {
        Self {
            module: module.into(),
            old: old.into(),
            new: new.into(),
            lang,
        }
    }

    fn imports_name(&self, tree: &SyntaxTree<'_>, name: &str) -> bool {
        imports_of(tree, &self.module)
            .into_iter()
            .flat_map(imported_names)
            .any(|imported| imported.name == name)
    }

    fn rename_references(&self, source: &str) -> String {
        let selector = Selector::kind("identifier")
            .with_attr("text", &self.old)
            .or(Selector::kind("type_identifier").with_attr("text", &self.old))
            .or(Selector::kind(SHORTHAND_KINDS[0]).with_attr("text", &self.old))
            .or(Selector::kind(SHORTHAND_KINDS[1]).with_attr("text", &self.old));
        replace_matches(source, self.lang, &selector, |m| {
            if in_import(m.node) {
                None
            } else if SHORTHAND_KINDS.contains(&m.kind()) {
                // `{ Old }` keeps its key: `{ Old: New }`
                Some(format!("{}: {}", self.old, self.new))
            } else {
                Some(self.new.clone())
            }
        })
    }

    fn drop_old_specifier(&self, source: &str) -> String {
        let selector = Selector::kind("import_statement").with_attr("source", &self.module);
        let Ok(tree) = SyntaxTree::parse(source, self.lang) else {
            return source.to_string();
        };
        // An import left with nothing else is removed whole
        let sole_import = find_all(&tree, &selector)
            .into_iter()
            .find(|m| {
                let names = imported_names(m.node);
                names.len() == 1 && names[0].name == self.old && !has_default_binding(m.node)
            })
            .map(|m| m.byte_start);

        let selector = match sole_import {
            Some(_) => selector,
            None => Selector::kind("import_specifier").with_attr("name", &self.old),
        };
        replace_matches(source, self.lang, &selector, |m| match sole_import {
            Some(start) => (m.byte_start == start).then(String::new),
            None => m
                .node
                .ancestors()
                .find(|a| a.kind() == "import_statement")
                .and_then(|import| import.child_by_field("source"))
                .is_some_and(|module| module.literal_value() == self.module)
                .then(String::new),
        })
    }
}

/// Shorthand object members, where the name is both key and reference.
const SHORTHAND_KINDS: [&str; 2] = [
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
];

fn in_import(node: NodeRef<'_>) -> bool {
    node.ancestors().any(|a| a.kind() == "import_statement")
}

fn has_default_binding(import: NodeRef<'_>) -> bool {
    import
        .named_children()
        .filter(|child| child.kind() == "import_clause")
        .flat_map(|clause| clause.named_children())
        .any(|child| matches!(child.kind(), "identifier" | "namespace_import"))
}

impl Modifier for RenameImportedSymbol {
    fn describe(&self) -> String {
        format!("rename {} to {} (from \"{}\")", self.old, self.new, self.module)
    }

    fn is_applied(&self, source: &str) -> bool {
        SyntaxTree::parse(source, self.lang).is_ok_and(|tree| !self.imports_name(&tree, &self.old))
    }

    fn rewrite(&self, source: &str) -> String {
        let Ok(tree) = SyntaxTree::parse(source, self.lang) else {
            return source.to_string();
        };
        let Some(target) = imports_of(&tree, &self.module)
            .into_iter()
            .flat_map(imported_names)
            .find(|imported| imported.name == self.old)
        else {
            return source.to_string();
        };
        let aliased = target.alias.is_some();
        let already_imported = self.imports_name(&tree, &self.new);

        let source = if aliased {
            source.to_string()
        } else {
            self.rename_references(source)
        };

        if already_imported {
            return self.drop_old_specifier(&source);
        }

        let selector = Selector::kind("import_specifier").with_attr("name", &self.old);
        replace_matches(&source, self.lang, &selector, |m| {
            let in_module = m
                .node
                .ancestors()
                .find(|a| a.kind() == "import_statement")
                .and_then(|import| import.child_by_field("source"))
                .is_some_and(|module| module.literal_value() == self.module);
            if !in_module {
                return None;
            }
            let name = m.node.child_by_field("name")?;
            let offset = name.byte_start() - m.byte_start;
            let text = m.text();
            Some(format!(
                "{}{}{}",
                &text[..offset],
                self.new,
                &text[offset + name.text().len()..]
            ))
        })
    }
}

/// Rename `old` imported from `module` to `new` throughout a file.
pub fn rename_imported_symbol(source: &str, module: &str, old: &str, new: &str) -> String {
    RenameImportedSymbol::new(module, old, new, SourceLang::TypeScript)
        .apply(source)
        .into_text(source)
}
