use crate::query::{find_all, find_pattern, QueryError, Selector};
use crate::syntax::{line_col, SyntaxTree};

/// What to look for when reporting usages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageQuery {
    Selector(Selector),
    /// ast-grep metavariable pattern
    Pattern(String),
}

/// One usage site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    /// 1-based line
    pub line: usize,
    pub text: String,
}

/// Usages of `query` in document order.
pub fn find_usages(tree: &SyntaxTree<'_>, query: &UsageQuery) -> Result<Vec<Usage>, QueryError> {
    match query {
        UsageQuery::Selector(selector) => Ok(find_all(tree, selector)
            .into_iter()
            .map(|m| Usage {
                line: line_col(tree.source(), m.byte_start).0,
                text: m.text().to_string(),
            })
            .collect()),
        UsageQuery::Pattern(pattern) => Ok(find_pattern(tree.source(), tree.lang(), pattern)?
            .into_iter()
            .map(|m| Usage {
                line: m.line,
                text: m.text,
            })
            .collect()),
    }
}
