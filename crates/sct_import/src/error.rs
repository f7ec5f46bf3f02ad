//! Error types for product-set import.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that can occur while importing a product set.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Portfolio file not found: {0}")]
    PortfolioNotFound(PathBuf),

    #[error("Invalid portfolio document: {0}")]
    InvalidPortfolio(String),

    #[error("Product {product} is missing field {field}")]
    MissingField { product: String, field: String },

    #[error("Command `{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Copy failed: {0}")]
    Copy(#[from] fs_extra::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
