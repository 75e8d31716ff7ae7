use crate::cache;
use crate::query::errors::SelectorError;
use crate::query::selector::Selector;
use crate::syntax::{NodeRef, SyntaxTree};

/// A selector match: the node and its byte span in the text it was parsed
/// from.
///
/// The lifetime ties the match to its tree, and the tree to its text, so a
/// match can never be applied to text produced by a later rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub node: NodeRef<'a>,
    pub byte_start: usize,
    pub byte_end: usize,
}

impl<'a> Match<'a> {
    fn new(node: NodeRef<'a>) -> Self {
        Self {
            node,
            byte_start: node.byte_start(),
            byte_end: node.byte_end(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.node.text()
    }

    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }
}

/// All nodes matching `selector`, in document order.
///
/// Union alternatives are evaluated per node, so results are de-duplicated
/// and ordered without a merge step.
pub fn find_all<'a>(tree: &'a SyntaxTree<'a>, selector: &Selector) -> Vec<Match<'a>> {
    tree.nodes()
        .filter(|node| selector.matches(*node))
        .map(Match::new)
        .collect()
}

/// Strict descendants of `scope` matching `selector`, in document order.
pub fn find_within<'a>(scope: NodeRef<'a>, selector: &Selector) -> Vec<Match<'a>> {
    scope
        .descendants()
        .filter(|node| selector.matches(*node))
        .map(Match::new)
        .collect()
}

pub fn find_first<'a>(tree: &'a SyntaxTree<'a>, selector: &Selector) -> Option<Match<'a>> {
    tree.nodes()
        .find(|node| selector.matches(*node))
        .map(Match::new)
}

pub fn has_match(tree: &SyntaxTree<'_>, selector: &Selector) -> bool {
    tree.nodes().any(|node| selector.matches(node))
}

/// Parse `selector` (cached) and run [`find_all`].
pub fn select<'a>(tree: &'a SyntaxTree<'a>, selector: &str) -> Result<Vec<Match<'a>>, SelectorError> {
    let selector = cache::get_or_parse_selector(selector)?;
    Ok(find_all(tree, &selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceLang;

    #[test]
    fn union_is_sorted_and_deduplicated() {
        let source = "const a = b;\nlet c = [a, d];";
        let tree = SyntaxTree::parse(source, SourceLang::TypeScript).unwrap();
        let matches = select(&tree, "identifier[name=d], identifier[name=a], identifier").unwrap();

        let texts: Vec<&str> = matches.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "a", "d"]);
        assert!(matches.windows(2).all(|w| w[0].byte_start < w[1].byte_start));
    }

    #[test]
    fn spans_match_node_text() {
        let source = "export class Foo {}";
        let tree = SyntaxTree::parse(source, SourceLang::TypeScript).unwrap();
        let found = find_first(&tree, &Selector::kind("type_identifier")).unwrap();
        assert_eq!(&source[found.byte_start..found.byte_end], "Foo");
        assert_eq!(found.kind(), "type_identifier");
    }

    #[test]
    fn scoped_search_excludes_scope() {
        let source = "f(g(x), y);";
        let tree = SyntaxTree::parse(source, SourceLang::TypeScript).unwrap();
        let outer = find_first(&tree, &Selector::kind("call_expression")).unwrap();
        let inner = find_within(outer.node, &Selector::kind("call_expression"));
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].text(), "g(x)");
    }

    #[test]
    fn markup_tags() {
        let source = "<acme-grid [rows]=\"rows\"></acme-grid><br/>";
        let tree = SyntaxTree::parse(source, SourceLang::Html).unwrap();
        assert!(has_match(&tree, &Selector::kind("tag_name").with_attr("text", "acme-grid")));
        assert!(!has_match(&tree, &Selector::kind("tag_name").with_attr("text", "acme-table")));
    }
}
