use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("selector ended unexpectedly")]
    UnexpectedEnd,

    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("unknown pseudo-class ':{name}'")]
    UnknownPseudo { name: String },
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("pattern queries are not supported for {lang}")]
    PatternUnsupported { lang: crate::syntax::SourceLang },
}
