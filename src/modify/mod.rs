//! Idempotent rewrites.
//!
//! Every modifier is built from an `is_applied` predicate checked before any
//! mutation, so applying a modifier to its own output is a no-op. Modifiers
//! never fail: text that cannot be rewritten safely is returned unchanged.

pub mod imports;
pub mod markup;
pub mod parameters;
pub mod registration;
pub mod symbols;

pub use imports::{add_import_if_absent, AddImport};
pub use markup::{
    rename_markup_tag, rename_markup_tag_in_referenced_file, ReferencedRename, RenameMarkupTag,
};
pub use parameters::{remove_parameters_of_type, RemoveParametersOfType};
pub use registration::{add_registration_entry_if_absent, AddRegistrationEntry};
pub use symbols::{rename_imported_symbol, RenameImportedSymbol};

use crate::edit::{self, Edit};
use crate::syntax::{validate_texts, SourceLang};
use tracing::warn;

/// Result of applying a [`Modifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modification {
    Changed(String),
    /// The predicate reported the change as already present
    AlreadyApplied,
    /// Nothing to rewrite
    Unchanged,
}

impl Modification {
    pub fn is_changed(&self) -> bool {
        matches!(self, Modification::Changed(_))
    }

    /// The resulting text, given the text the modifier was applied to.
    pub fn into_text(self, original: &str) -> String {
        match self {
            Modification::Changed(text) => text,
            Modification::AlreadyApplied | Modification::Unchanged => original.to_string(),
        }
    }
}

/// A read+rewrite operation on one file's text.
pub trait Modifier {
    /// Short description for logs.
    fn describe(&self) -> String;

    /// Whether `source` already has this modification.
    fn is_applied(&self, source: &str) -> bool;

    /// Rewrite `source`; may return it unchanged.
    fn rewrite(&self, source: &str) -> String;

    fn apply(&self, source: &str) -> Modification {
        if self.is_applied(source) {
            return Modification::AlreadyApplied;
        }
        let output = self.rewrite(source);
        if output == source {
            Modification::Unchanged
        } else {
            Modification::Changed(output)
        }
    }
}

/// Apply verified edits and re-parse; on any failure return `source`.
pub(crate) fn splice(source: &str, lang: SourceLang, edits: Vec<Edit>) -> String {
    let output = match edit::apply_batch(source, edits) {
        Ok(output) => output,
        Err(err) => {
            warn!(%err, "inconsistent edits, leaving input unchanged");
            return source.to_string();
        }
    };
    if let Err(err) = validate_texts(source, &output, lang) {
        warn!(%err, "edit breaks the file, leaving input unchanged");
        return source.to_string();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Append(&'static str);

    impl Modifier for Append {
        fn describe(&self) -> String {
            format!("append {}", self.0)
        }

        fn is_applied(&self, source: &str) -> bool {
            source.ends_with(self.0)
        }

        fn rewrite(&self, source: &str) -> String {
            format!("{source}{}", self.0)
        }
    }

    #[test]
    fn predicate_runs_before_rewrite() {
        let modifier = Append(";");
        assert_eq!(modifier.apply("a"), Modification::Changed("a;".to_string()));
        assert_eq!(modifier.apply("a;"), Modification::AlreadyApplied);
        assert_eq!(modifier.apply("a").into_text("a"), "a;");
    }

    #[test]
    fn splice_rejects_broken_output() {
        let source = "f(a);";
        let broken = splice(source, SourceLang::TypeScript, vec![Edit::new(1, 2, "", "(")]);
        assert_eq!(broken, source);
        let fixed = splice(source, SourceLang::TypeScript, vec![Edit::insert(3, ", b")]);
        assert_eq!(fixed, "f(a, b);");
    }
}
