//! Thread-local parser pooling.
//!
//! Keeps one tree-sitter parser per source language per thread. A migration
//! parses every file several times (detect, rewrite, validate), so parser
//! construction is paid once per language instead of once per parse.

use crate::syntax::{SourceLang, SourceParser, SyntaxError};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static PARSERS: RefCell<HashMap<SourceLang, SourceParser>> = RefCell::new(HashMap::new());
}

/// Execute function with the pooled parser for `lang`.
///
/// # Example
///
/// ```
/// use uplift::pool::with_parser;
/// use uplift::syntax::SourceLang;
///
/// let tree = with_parser(SourceLang::TypeScript, |parser| parser.parse("const a = 1;"))
///     .unwrap()
///     .unwrap();
/// assert_eq!(tree.root_node().kind(), "program");
/// ```
pub fn with_parser<F, R>(lang: SourceLang, f: F) -> Result<R, SyntaxError>
where
    F: FnOnce(&mut SourceParser) -> R,
{
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(lang) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(SourceParser::new(lang)?)
            }
        };
        Ok(f(parser))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsers_are_reused_per_language() {
        for _ in 0..3 {
            let kind = with_parser(SourceLang::Html, |parser| {
                parser.parse("<p>hi</p>").map(|tree| tree.root_node().kind())
            })
            .unwrap()
            .unwrap();
            assert_eq!(kind, "document");
        }
        let lang = with_parser(SourceLang::Tsx, |parser| parser.lang()).unwrap();
        assert_eq!(lang, SourceLang::Tsx);
    }
}
