//! Non-code project files: JSON manifests, ignore lists and stylesheets.

pub mod errors;
pub mod ignore_list;
pub mod package;
pub mod strip;
pub mod stylesheet;

pub use errors::ManifestError;
pub use ignore_list::{add_ignore_entry, remove_ignore_entry};
pub use package::{
    dependency_version, remove_dependencies, update_dependency_versions, DependencyUpdate,
    DEPENDENCY_SECTIONS,
};
pub use strip::{strip_manifest_references, strip_manifest_text};
pub use stylesheet::strip_stylesheet_references;
