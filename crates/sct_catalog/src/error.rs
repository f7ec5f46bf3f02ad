//! Error types for catalog building.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building a product set.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Template not found: no product.template.yaml or product.template.json in {0}")]
    MissingTemplate(PathBuf),

    #[error("Malformed template {path}: {message}")]
    MalformedTemplate { path: PathBuf, message: String },

    #[error("Could not rewrite Description field in {0}")]
    RewriteFailed(PathBuf),

    #[error("Output {output} exported by {incoming} is already exported by {existing}")]
    DuplicateOutput {
        output: String,
        existing: String,
        incoming: String,
    },

    #[error("Invalid tags: {0}")]
    InvalidTags(String),

    #[error("Product set path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Whether this error must abort the build.
    ///
    /// Only a failed in-place rewrite is tolerated; everything else would
    /// leave the manifests internally inconsistent.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CatalogError::RewriteFailed(_))
    }
}
