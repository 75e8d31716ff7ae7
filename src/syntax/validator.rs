//! Post-edit parse validation.
//!
//! After a rewrite the output is parsed again; if it carries more ERROR or
//! MISSING nodes than the input, the rewrite is rejected. Positions shift
//! after an edit, so the comparison is by count rather than by span.

use crate::syntax::errors::SyntaxError;
use crate::syntax::lang::SourceLang;
use crate::syntax::parser::SyntaxTree;

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, byte: usize) -> (usize, usize) {
    let prefix = &source[..byte.min(source.len())];
    let line = prefix.matches('\n').count() + 1;
    let column = prefix
        .rfind('\n')
        .map_or(prefix.len(), |nl| prefix.len() - nl - 1)
        + 1;
    (line, column)
}

/// Check that `edited` does not introduce syntax errors absent from the
/// original tree.
pub fn validate_edit(original: &SyntaxTree<'_>, edited: &str) -> Result<(), SyntaxError> {
    let edited_tree = SyntaxTree::parse(edited, original.lang())?;
    compare(original.error_count(), &edited_tree)
}

/// Same as [`validate_edit`], parsing both texts.
pub fn validate_texts(original: &str, edited: &str, lang: SourceLang) -> Result<(), SyntaxError> {
    let original_tree = SyntaxTree::parse(original, lang)?;
    validate_edit(&original_tree, edited)
}

fn compare(before: usize, edited: &SyntaxTree<'_>) -> Result<(), SyntaxError> {
    if edited.error_count() <= before {
        return Ok(());
    }
    let (line, column) = edited
        .first_error()
        .map_or((0, 0), |byte| line_col(edited.source(), byte));
    Err(SyntaxError::Regression {
        introduced: edited.error_count() - before,
        line,
        column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column() {
        let source = "ab\ncd\nef";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 4), (2, 2));
        assert_eq!(line_col(source, 6), (3, 1));
    }

    #[test]
    fn clean_edit_passes() {
        let result = validate_texts(
            "const a = [b];",
            "const a = [b, c];",
            SourceLang::TypeScript,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn broken_edit_is_rejected() {
        let result = validate_texts("f(a, b);", "f(a, b;", SourceLang::TypeScript);
        assert!(matches!(result, Err(SyntaxError::Regression { .. })));
    }

    #[test]
    fn preexisting_errors_are_tolerated() {
        let result = validate_texts("const = ;", "const = ; // edited", SourceLang::TypeScript);
        assert!(result.is_ok());
    }
}
