//! Read-only analyses over a parsed file.
//!
//! Every detector is a pure function of a [`SyntaxTree`](crate::syntax::SyntaxTree)
//! and static parameters; none of them touch the file tree.

pub mod aliases;
pub mod imports;
pub mod registration;
pub mod templates;
pub mod usages;

pub use aliases::{aliases_of, aliases_of_any, references_any};
pub use imports::{
    has_import, has_import_of_specifier, has_namespace_import, imported_names, imports_of,
    is_type_only, ImportDescriptor, ImportedName,
};
pub use registration::{
    definitions_referencing, find_definitions, is_registered, leading_identifier,
    DefinitionSite, ModuleReference, ProviderDescriptor, RegistrationList,
};
pub use templates::{has_markup_tag, inline_templates, markup_tags, template_references};
pub use usages::{find_usages, Usage, UsageQuery};
