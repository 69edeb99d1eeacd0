//! Error types for pagination

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("Editing surface is detached")]
    Detached,

    #[error("DOM operation failed: {0}")]
    Dom(String),

    #[error("Off-screen render failed: {0}")]
    Render(String),

    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PaginationError>;
