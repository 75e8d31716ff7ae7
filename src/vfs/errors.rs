use crate::safety::SafetyError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("project root is not a directory: {0}")]
    NotADirectory(PathBuf),
}
