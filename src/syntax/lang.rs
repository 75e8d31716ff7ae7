//! Source languages understood by the engine.
//!
//! Grammars come from ast-grep-language so the raw tree-sitter parser and
//! ast-grep patterns always agree on node kinds.

use ast_grep_language::{LanguageExt, SupportLang};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceLang {
    TypeScript,
    Tsx,
    Html,
}

impl SourceLang {
    /// Pick a language from a file extension, if the engine parses it.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str())? {
            "ts" | "mts" | "cts" => Some(SourceLang::TypeScript),
            "tsx" => Some(SourceLang::Tsx),
            "html" | "htm" => Some(SourceLang::Html),
            _ => None,
        }
    }

    /// Whether this is a script language (as opposed to markup).
    pub fn is_script(self) -> bool {
        matches!(self, SourceLang::TypeScript | SourceLang::Tsx)
    }

    /// The ast-grep language backing this grammar.
    pub fn support_lang(self) -> SupportLang {
        match self {
            SourceLang::TypeScript => SupportLang::TypeScript,
            SourceLang::Tsx => SupportLang::Tsx,
            SourceLang::Html => SupportLang::Html,
        }
    }

    pub fn ts_language(self) -> tree_sitter::Language {
        self.support_lang().get_ts_language()
    }
}

impl fmt::Display for SourceLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLang::TypeScript => write!(f, "typescript"),
            SourceLang::Tsx => write!(f, "tsx"),
            SourceLang::Html => write!(f, "html"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_from_extension() {
        assert_eq!(
            SourceLang::from_path(Path::new("src/app/app.module.ts")),
            Some(SourceLang::TypeScript)
        );
        assert_eq!(
            SourceLang::from_path(Path::new("src/view.tsx")),
            Some(SourceLang::Tsx)
        );
        assert_eq!(
            SourceLang::from_path(Path::new("src/app/app.component.html")),
            Some(SourceLang::Html)
        );
        assert_eq!(SourceLang::from_path(Path::new("package.json")), None);
        assert_eq!(SourceLang::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn script_languages() {
        assert!(SourceLang::TypeScript.is_script());
        assert!(SourceLang::Tsx.is_script());
        assert!(!SourceLang::Html.is_script());
    }
}
