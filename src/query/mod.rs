//! Structural queries and rewrites.
//!
//! Selectors (see [`selector`]) find nodes by kind, attribute and
//! containment; [`replacer::replace_matches`] turns matches into new text.

pub mod errors;
pub mod matcher;
pub mod pattern;
pub mod replacer;
pub mod selector;

pub use errors::{QueryError, SelectorError};
pub use matcher::{find_all, find_first, find_within, has_match, select, Match};
pub use pattern::{find_pattern, PatternMatch};
pub use replacer::replace_matches;
pub use selector::{attribute, Selector};
