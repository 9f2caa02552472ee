use thiserror::Error;

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("subdomain too short: {0} (minimum 3 characters)")]
    TooShort(String),

    #[error("subdomain too long: {0} (maximum 30 characters)")]
    TooLong(String),

    #[error("subdomain contains invalid characters: {0}")]
    InvalidCharacters(String),

    #[error("derived schema name too long: {0}")]
    SchemaNameTooLong(String),

    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    #[error("unknown tenant status: {0}")]
    UnknownStatus(String),
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
