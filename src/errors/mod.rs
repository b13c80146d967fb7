mod error;

pub use error::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
