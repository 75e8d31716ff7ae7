//! Uplift: structural source migrations for TypeScript/HTML applications
//!
//! Library maintainers describe one breaking upgrade as a migration plan;
//! consumers run it once and their project is rewritten in place.
//!
//! # Architecture
//!
//! All rewrites compile down to a single primitive: [`Edit`], a verified
//! byte-span replacement. Untouched text is never reprinted. On top of it:
//!
//! - [`syntax`] parses files into arena trees borrowed from their text
//! - [`query`] evaluates selectors and replaces matches, fail-open
//! - [`detect`] holds read-only analyses, [`modify`] and [`manifest`] the
//!   idempotent rewrites built on them
//! - [`migration`] loads plans and runs them over a [`vfs::FileTree`]
//!
//! # Safety
//!
//! - All edits verify expected before-text before applying
//! - Every rewrite is re-parsed; output with new syntax errors is discarded
//! - Atomic file writes (tempfile + fsync + rename)
//! - Project boundary enforcement
//! - Idempotent operations
//!
//! # Example
//!
//! ```
//! use uplift::modify::add_import_if_absent;
//!
//! let source = "export const x = 1";
//! let once = add_import_if_absent(source, "lib", "Thing");
//! assert_eq!(once, "import {Thing} from \"lib\";\nexport const x = 1");
//! assert_eq!(add_import_if_absent(&once, "lib", "Thing"), once);
//! ```

pub mod cache;
pub mod detect;
pub mod edit;
pub mod manifest;
pub mod migration;
pub mod modify;
pub mod pool;
pub mod query;
pub mod safety;
pub mod syntax;
pub mod version;
pub mod vfs;

// Re-exports
pub use edit::{Edit, EditError, EditVerification};
pub use migration::{
    load_from_path, load_from_str, MigrationError, MigrationPlan, MigrationReport, Migrator,
    PlanError, StepOutcome,
};
pub use modify::{Modification, Modifier};
pub use query::{find_all, replace_matches, Match, Selector, SelectorError};
pub use safety::{ProjectGuard, SafetyError};
pub use syntax::{NodeRef, SourceLang, SyntaxError, SyntaxTree};
pub use vfs::{DiskTree, FileTree, MemoryTree, TreeError};
