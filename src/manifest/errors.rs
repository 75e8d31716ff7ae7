use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest root is not a JSON object")]
    NotAnObject,
}
