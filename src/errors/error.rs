use serde::Serialize;
use thiserror::Error;

/// Domain-level errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum DomainError {
    #[error("Image reduction error: {0}")]
    Image(String),

    #[error("PDF optimization error: {0}")]
    Pdf(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("File error: {0}")]
    File(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
