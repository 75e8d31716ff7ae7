use crate::syntax::lang::SourceLang;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("failed to set {lang} language for parser")]
    LanguageSet { lang: SourceLang },

    #[error("failed to parse {lang} source")]
    ParseFailed { lang: SourceLang },

    #[error("edit introduced {introduced} new syntax error(s); first at line {line}, column {column}")]
    Regression {
        introduced: usize,
        line: usize,
        column: usize,
    },
}
