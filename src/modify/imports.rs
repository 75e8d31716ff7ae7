use crate::detect::{has_namespace_import, imported_names, imports_of, is_type_only, ImportDescriptor};
use crate::edit::Edit;
use crate::modify::{splice, Modifier};
use crate::syntax::{SourceLang, SyntaxTree};

/// Make `specifier` importable from `module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddImport {
    pub import: ImportDescriptor,
    pub lang: SourceLang,
}

impl AddImport {
    pub fn new(module: impl Into<String>, specifier: impl Into<String>, lang: SourceLang) -> Self {
        Self {
            import: ImportDescriptor::new(specifier, module),
            lang,
        }
    }
}

impl Modifier for AddImport {
    fn describe(&self) -> String {
        self.import.to_string()
    }

    /// A namespace import is assumed to expose every export.
    fn is_applied(&self, source: &str) -> bool {
        SyntaxTree::parse(source, self.lang).is_ok_and(|tree| {
            has_namespace_import(&tree, &self.import.module) || self.import.is_imported_by(&tree)
        })
    }

    fn rewrite(&self, source: &str) -> String {
        let Ok(tree) = SyntaxTree::parse(source, self.lang) else {
            return source.to_string();
        };

        let ImportDescriptor { specifier, module } = &self.import;
        for import in imports_of(&tree, module) {
            if is_type_only(import) {
                continue;
            }
            // Append after the last named specifier
            if let Some(last) = imported_names(import).last() {
                let edit = Edit::insert(last.specifier.byte_end(), format!(", {specifier}"));
                return splice(source, self.lang, vec![edit]);
            }
            let Some(clause) = import
                .named_children()
                .find(|child| child.kind() == "import_clause")
            else {
                continue;
            };
            // `import {} from "module"`
            if let Some(named) = clause
                .named_children()
                .find(|child| child.kind() == "named_imports")
            {
                let edit = Edit::new(
                    named.byte_start(),
                    named.byte_end(),
                    format!("{{{specifier}}}"),
                    named.text(),
                );
                return splice(source, self.lang, vec![edit]);
            }
            // `import Default from "module"`
            if clause.named_children().all(|child| child.kind() == "identifier") {
                let edit = Edit::insert(clause.byte_end(), format!(", {{{specifier}}}"));
                return splice(source, self.lang, vec![edit]);
            }
        }

        let import = format!("{}\n", self.import);
        // A `#!` line must stay first
        if source.starts_with("#!") {
            return match source.split_once('\n') {
                Some((shebang, rest)) => format!("{shebang}\n{import}{rest}"),
                None => format!("{source}\n{import}"),
            };
        }
        format!("{import}{source}")
    }
}

/// Import `specifier` from `module` unless it is already available.
///
/// ```
/// use uplift::modify::add_import_if_absent;
///
/// let output = add_import_if_absent("export const x = 1", "lib", "Thing");
/// assert_eq!(output, "import {Thing} from \"lib\";\nexport const x = 1");
/// ```
pub fn add_import_if_absent(source: &str, module: &str, specifier: &str) -> String {
    AddImport::new(module, specifier, SourceLang::TypeScript)
        .apply(source)
        .into_text(source)
}
