use crate::modify::Modifier;
use crate::query::{find_all, replace_matches, Selector};
use crate::syntax::{NodeRef, SourceLang, SyntaxTree};
use std::collections::BTreeSet;

/// Drop constructor parameters by declared type, along with the arguments
/// that forwarded them to `super(...)` or `new X(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveParametersOfType {
    pub type_names: BTreeSet<String>,
    pub lang: SourceLang,
}

impl RemoveParametersOfType {
    pub fn new<I, S>(type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_names: type_names.into_iter().map(Into::into).collect(),
            lang: SourceLang::TypeScript,
        }
    }

    /// Constructor parameters whose type is listed.
    fn doomed<'a>(&self, tree: &'a SyntaxTree<'a>) -> Vec<NodeRef<'a>> {
        let constructors = Selector::kind("method_definition").with_attr("name", "constructor");
        find_all(tree, &constructors)
            .into_iter()
            .filter_map(|m| m.node.child_by_field("parameters"))
            .flat_map(|params| params.named_children())
            .filter(|param| matches!(param.kind(), "required_parameter" | "optional_parameter"))
            .filter(|param| {
                declared_type_name(*param).is_some_and(|name| self.type_names.contains(name))
            })
            .collect()
    }
}

/// `http: HttpClient` -> `HttpClient`; `store: Store<State>` -> `Store`;
/// `ns.Type` -> `Type`.
fn declared_type_name<'a>(param: NodeRef<'a>) -> Option<&'a str> {
    let annotation = param.child_by_field("type")?;
    let ty = annotation.named_children().next()?;
    let name = match ty.kind() {
        "generic_type" => ty.child_by_field("name")?.text(),
        _ => ty.text(),
    };
    Some(name.rsplit('.').next().unwrap_or(name))
}

/// Whether `node` is a bare argument of `super(...)` or `new X(...)`.
fn is_forwarded_argument(node: NodeRef<'_>) -> bool {
    let Some(arguments) = node.parent().filter(|p| p.kind() == "arguments") else {
        return false;
    };
    arguments.parent().is_some_and(|call| match call.kind() {
        "new_expression" => true,
        "call_expression" => call
            .child_by_field("function")
            .is_some_and(|function| function.kind() == "super"),
        _ => false,
    })
}

impl Modifier for RemoveParametersOfType {
    fn describe(&self) -> String {
        let names: Vec<&str> = self.type_names.iter().map(String::as_str).collect();
        format!("remove constructor parameters of type {}", names.join(", "))
    }

    fn is_applied(&self, source: &str) -> bool {
        SyntaxTree::parse(source, self.lang).is_ok_and(|tree| self.doomed(&tree).is_empty())
    }

    fn rewrite(&self, source: &str) -> String {
        let Ok(tree) = SyntaxTree::parse(source, self.lang) else {
            return source.to_string();
        };
        let doomed = self.doomed(&tree);
        let params: BTreeSet<usize> = doomed.iter().map(|param| param.byte_start()).collect();
        let names: BTreeSet<&str> = doomed
            .iter()
            .filter_map(|param| param.child_by_field("pattern"))
            .filter(|pattern| pattern.kind() == "identifier")
            .map(|pattern| pattern.text())
            .collect();

        let selector = Selector::kind("required_parameter")
            .or(Selector::kind("optional_parameter"))
            .or(Selector::kind("identifier"));
        replace_matches(source, self.lang, &selector, |m| {
            let remove = match m.kind() {
                "identifier" => names.contains(m.text()) && is_forwarded_argument(m.node),
                _ => params.contains(&m.byte_start),
            };
            remove.then(String::new)
        })
    }
}

/// Remove constructor parameters whose declared type is in `type_names`.
pub fn remove_parameters_of_type(source: &str, type_names: &[&str]) -> String {
    RemoveParametersOfType::new(type_names.iter().copied())
        .apply(source)
        .into_text(source)
}
