use crate::query::{find_all, Selector};
use crate::syntax::{NodeRef, SyntaxTree};
use std::collections::BTreeSet;

/// Variables whose initializer references `name`.
///
/// `const SHARED = [HttpModule, FormsModule]` makes `SHARED` an alias of
/// `HttpModule`. Only direct aliases within this file are returned; callers
/// compute transitive aliases by feeding results back in until nothing new
/// turns up.
pub fn aliases_of(tree: &SyntaxTree<'_>, name: &str) -> BTreeSet<String> {
    aliases_of_any(tree, &BTreeSet::from([name.to_string()]))
}

/// Variables whose initializer references any of `names`.
pub fn aliases_of_any(tree: &SyntaxTree<'_>, names: &BTreeSet<String>) -> BTreeSet<String> {
    find_all(tree, &Selector::kind("variable_declarator"))
        .into_iter()
        .filter_map(|m| {
            let binding = m.node.child_by_field("name")?;
            let value = m.node.child_by_field("value")?;
            (binding.kind() == "identifier"
                && !names.contains(binding.text())
                && references_any(value, names))
            .then(|| binding.text().to_string())
        })
        .collect()
}

/// Whether `node` is, or contains, an identifier from `names`.
pub fn references_any(node: NodeRef<'_>, names: &BTreeSet<String>) -> bool {
    std::iter::once(node)
        .chain(node.descendants())
        .any(|n| is_identifier(n) && names.contains(n.text()))
}

fn is_identifier(node: NodeRef<'_>) -> bool {
    matches!(node.kind(), "identifier" | "type_identifier")
}
