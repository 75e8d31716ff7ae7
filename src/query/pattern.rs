//! ast-grep metavariable patterns.
//!
//! Selectors describe node shapes; patterns describe code shapes, which is
//! the better fit for call sites such as `$STORE.select($$$ARGS)`.
//!
//! # Metavariable Syntax
//!
//! - `$NAME` - Matches a single node and captures it
//! - `$$$NAME` - Matches zero or more nodes (variadic)
//! - `$_` - Matches any single node (anonymous)

use crate::cache;
use crate::query::errors::QueryError;
use crate::syntax::{line_col, SourceLang};
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, NodeMatch};
use ast_grep_language::SupportLang;
use std::collections::HashMap;

/// A match from an ast-grep pattern with captured metavariables.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub byte_start: usize,
    pub byte_end: usize,
    /// 1-based line of the match start
    pub line: usize,
    pub text: String,
    /// Captured metavariables: name -> text
    pub captures: HashMap<String, String>,
}

/// Find all matches of `pattern` in `source`.
pub fn find_pattern(
    source: &str,
    lang: SourceLang,
    pattern: &str,
) -> Result<Vec<PatternMatch>, QueryError> {
    if !lang.is_script() {
        return Err(QueryError::PatternUnsupported { lang });
    }
    let compiled = cache::get_or_compile_pattern(pattern, lang)?;
    let sg = AstGrep::new(source, lang.support_lang());
    let matches = sg
        .root()
        .find_all(&compiled)
        .map(|m| to_pattern_match(source, m))
        .collect();
    Ok(matches)
}

fn to_pattern_match(source: &str, m: NodeMatch<StrDoc<SupportLang>>) -> PatternMatch {
    let range = m.get_node().range();
    let captures: HashMap<String, String> = m.get_env().clone().into();
    PatternMatch {
        byte_start: range.start,
        byte_end: range.end,
        line: line_col(source, range.start).0,
        text: source[range.clone()].to_string(),
        captures,
    }
}
