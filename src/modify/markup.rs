use crate::detect::{has_markup_tag, inline_templates};
use crate::modify::Modifier;
use crate::query::{replace_matches, Selector};
use crate::safety::normalize;
use crate::syntax::{SourceLang, SyntaxTree};
use crate::vfs::FileTree;
use std::path::{Path, PathBuf};
use tracing::error;

/// Rename a markup tag, keeping attributes and children.
///
/// For HTML every start, end and self-closing tag is renamed; for scripts
/// the same applies inside inline `template:` literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameMarkupTag {
    pub old: String,
    pub new: String,
    pub lang: SourceLang,
}

impl RenameMarkupTag {
    pub fn new(old: impl Into<String>, new: impl Into<String>, lang: SourceLang) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            lang,
        }
    }

    fn tag_selector() -> Selector {
        Selector::kind("tag_name").or(Selector::kind("erroneous_end_tag_name"))
    }

    fn rename_html(&self, markup: &str) -> String {
        replace_matches(markup, SourceLang::Html, &Self::tag_selector(), |m| {
            m.text()
                .eq_ignore_ascii_case(&self.old)
                .then(|| self.new.clone())
        })
    }

    fn markup_has_old_tag(&self, markup: &str) -> bool {
        SyntaxTree::parse(markup, SourceLang::Html).is_ok_and(|tree| has_markup_tag(&tree, &self.old))
    }
}

impl Modifier for RenameMarkupTag {
    fn describe(&self) -> String {
        format!("rename <{}> to <{}>", self.old, self.new)
    }

    fn is_applied(&self, source: &str) -> bool {
        if self.old.eq_ignore_ascii_case(&self.new) {
            return true;
        }
        match self.lang {
            SourceLang::Html => !self.markup_has_old_tag(source),
            _ => SyntaxTree::parse(source, self.lang).is_ok_and(|tree| {
                inline_templates(&tree)
                    .iter()
                    .all(|template| !self.markup_has_old_tag(template.literal_value()))
            }),
        }
    }

    fn rewrite(&self, source: &str) -> String {
        if self.lang == SourceLang::Html {
            return self.rename_html(source);
        }
        let selector = Selector::kind("string").or(Selector::kind("template_string"));
        replace_matches(source, self.lang, &selector, |m| {
            let pair = m.node.parent().filter(|parent| parent.kind() == "pair")?;
            let is_template = m.node.field_name() == Some("value")
                && pair
                    .child_by_field("key")
                    .is_some_and(|key| key.literal_value() == "template");
            if !is_template {
                return None;
            }
            let text = m.text();
            let inner = m.node.literal_value();
            let renamed = self.rename_html(inner);
            (renamed != inner).then(|| format!("{}{renamed}{}", &text[..1], &text[text.len() - 1..]))
        })
    }
}

/// Rename `old` tags to `new` in markup or inline templates.
pub fn rename_markup_tag(source: &str, lang: SourceLang, old: &str, new: &str) -> String {
    RenameMarkupTag::new(old, new, lang)
        .apply(source)
        .into_text(source)
}

/// What happened to an externally referenced template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferencedRename {
    Renamed(PathBuf),
    Unchanged(PathBuf),
    Missing(PathBuf),
    /// The renamed template could not be written back.
    Failed(PathBuf),
}

/// Rename a tag inside the template file `reference` points to.
///
/// `reference` is resolved against the directory of `owning_path`; quotes
/// around it are ignored. A missing or unwritable file is logged and
/// reported, not an error.
pub fn rename_markup_tag_in_referenced_file(
    tree: &mut dyn FileTree,
    owning_path: &Path,
    reference: &str,
    old: &str,
    new: &str,
) -> ReferencedRename {
    let reference = reference.trim().trim_matches(|c| matches!(c, '"' | '\'' | '`'));
    let dir = owning_path.parent().unwrap_or_else(|| Path::new(""));
    let path = normalize(&dir.join(reference));

    let Some(markup) = tree.read(&path) else {
        error!(
            owner = %owning_path.display(),
            template = %path.display(),
            "referenced template does not exist"
        );
        return ReferencedRename::Missing(path);
    };

    let renamed = rename_markup_tag(&markup, SourceLang::Html, old, new);
    if renamed == markup {
        return ReferencedRename::Unchanged(path);
    }
    match tree.write(&path, &renamed) {
        Ok(()) => ReferencedRename::Renamed(path),
        Err(err) => {
            error!(template = %path.display(), %err, "failed to write template");
            ReferencedRename::Failed(path)
        }
    }
}
