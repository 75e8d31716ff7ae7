use crate::detect::{find_definitions, is_registered, DefinitionSite, ModuleReference, RegistrationList};
use crate::edit::Edit;
use crate::modify::{splice, Modifier};
use crate::syntax::{NodeRef, SourceLang, SyntaxTree};
use std::collections::BTreeSet;
use tracing::debug;

/// Append an entry to a definition's registration list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRegistrationEntry {
    pub reference: ModuleReference,
    pub list: RegistrationList,
    pub entry: String,
    /// Names that count as the entry being present already
    pub aliases: BTreeSet<String>,
    pub lang: SourceLang,
}

impl AddRegistrationEntry {
    pub fn new(reference: ModuleReference, list: RegistrationList, entry: impl Into<String>) -> Self {
        Self {
            reference,
            list,
            entry: entry.into(),
            aliases: BTreeSet::new(),
            lang: SourceLang::TypeScript,
        }
    }

    pub fn with_aliases(mut self, aliases: BTreeSet<String>) -> Self {
        self.aliases = aliases;
        self
    }

    fn site<'a>(&self, tree: &'a SyntaxTree<'a>) -> Option<DefinitionSite<'a>> {
        find_definitions(tree, &self.list.decorator)
            .into_iter()
            .find(|site| site.class_name == self.reference.definition_name)
    }

    fn edit_for(&self, site: &DefinitionSite<'_>) -> Edit {
        let property = &self.list.property;
        let entry = &self.entry;

        if let Some(value) = site.property_value(property) {
            if value.kind() != "array" {
                return Edit::new(
                    value.byte_start(),
                    value.byte_end(),
                    format!("[...{}, {entry}]", value.text()),
                    value.text(),
                );
            }
            return match elements(value).last() {
                Some(last) => Edit::insert(last.byte_end(), format!(", {entry}")),
                None => Edit::new(value.byte_start(), value.byte_end(), format!("[{entry}]"), value.text()),
            };
        }

        match site.config() {
            Some(config) => match elements(config).last() {
                Some(last) => Edit::insert(last.byte_end(), format!(", {property}: [{entry}]")),
                None => Edit::new(
                    config.byte_start(),
                    config.byte_end(),
                    format!("{{ {property}: [{entry}] }}"),
                    config.text(),
                ),
            },
            None => Edit::new(
                site.arguments.byte_start(),
                site.arguments.byte_end(),
                format!("({{ {property}: [{entry}] }})"),
                site.arguments.text(),
            ),
        }
    }
}

/// Named children other than comments.
fn elements(node: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    node.named_children()
        .filter(|child| child.kind() != "comment")
        .collect()
}

impl Modifier for AddRegistrationEntry {
    fn describe(&self) -> String {
        format!(
            "register {} in {}.{} of {}",
            self.entry, self.list.decorator, self.list.property, self.reference.definition_name
        )
    }

    fn is_applied(&self, source: &str) -> bool {
        SyntaxTree::parse(source, self.lang).is_ok_and(|tree| {
            is_registered(&tree, &self.reference, &self.list, &self.entry, &self.aliases)
        })
    }

    fn rewrite(&self, source: &str) -> String {
        let Ok(tree) = SyntaxTree::parse(source, self.lang) else {
            return source.to_string();
        };
        let Some(site) = self.site(&tree) else {
            debug!(definition = %self.reference.definition_name, "definition not found");
            return source.to_string();
        };
        let edit = self.edit_for(&site);
        splice(source, self.lang, vec![edit])
    }
}

/// Append `entry` to `list` of the referenced definition unless present.
pub fn add_registration_entry_if_absent(
    source: &str,
    reference: &ModuleReference,
    list: &RegistrationList,
    entry: &str,
) -> String {
    AddRegistrationEntry::new(reference.clone(), list.clone(), entry)
        .apply(source)
        .into_text(source)
}
