use crate::query::{find_all, Selector};
use crate::syntax::{NodeRef, SyntaxTree};

/// Config pairs `templateUrl: "..."` with a string value.
pub fn template_references<'a>(tree: &'a SyntaxTree<'a>) -> Vec<NodeRef<'a>> {
    string_pairs(tree, "templateUrl")
}

/// Inline `template: "..."` / `` template: `...` `` literals.
pub fn inline_templates<'a>(tree: &'a SyntaxTree<'a>) -> Vec<NodeRef<'a>> {
    string_pairs(tree, "template")
}

fn string_pairs<'a>(tree: &'a SyntaxTree<'a>, key: &str) -> Vec<NodeRef<'a>> {
    find_all(tree, &Selector::kind("pair").with_attr("key", key))
        .into_iter()
        .filter_map(|m| m.node.child_by_field("value"))
        .filter(|value| matches!(value.kind(), "string" | "template_string"))
        .collect()
}

/// Tag-name nodes equal to `tag`, ASCII case-insensitive.
pub fn markup_tags<'a>(tree: &'a SyntaxTree<'a>, tag: &str) -> Vec<NodeRef<'a>> {
    find_all(tree, &Selector::kind("tag_name").or(Selector::kind("erroneous_end_tag_name")))
        .into_iter()
        .map(|m| m.node)
        .filter(|node| node.text().eq_ignore_ascii_case(tag))
        .collect()
}

pub fn has_markup_tag(tree: &SyntaxTree<'_>, tag: &str) -> bool {
    !markup_tags(tree, tag).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SourceLang;

    #[test]
    fn finds_template_urls_and_inline_templates() {
        let source = r#"
@Component({ selector: "a", templateUrl: "./a.component.html" })
export class A {}

@Component({ selector: "b", template: `<acme-grid></acme-grid>` })
export class B {}
"#;
        let tree = SyntaxTree::parse(source, SourceLang::TypeScript).unwrap();
        let urls: Vec<&str> = template_references(&tree)
            .iter()
            .map(|node| node.literal_value())
            .collect();
        assert_eq!(urls, vec!["./a.component.html"]);
        assert_eq!(inline_templates(&tree).len(), 1);
    }

    #[test]
    fn markup_tag_lookup_ignores_case() {
        let source = "<div><ACME-GRID></acme-grid></div>";
        let tree = SyntaxTree::parse(source, SourceLang::Html).unwrap();
        assert!(has_markup_tag(&tree, "acme-grid"));
        assert!(!has_markup_tag(&tree, "acme-table"));
        assert_eq!(markup_tags(&tree, "acme-grid").len(), 2);
    }
}
