//! Tree-sitter integration for structural TypeScript and HTML parsing.
//!
//! Files are parsed into an immutable arena ([`SyntaxTree`]) that borrows its
//! text. Rewrites never mutate a tree: they splice byte spans into new text
//! which is then parsed again.

pub mod errors;
pub mod lang;
pub mod parser;
pub mod validator;

pub use errors::SyntaxError;
pub use lang::SourceLang;
pub use parser::{NodeId, NodeRef, SourceParser, SyntaxTree};
pub use validator::{line_col, validate_edit, validate_texts};
