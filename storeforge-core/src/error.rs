use storeforge_model::ValidationError;
use thiserror::Error;

/// Error taxonomy for the provisioning core.
///
/// Components below the orchestrator let these propagate unchanged; the
/// orchestrator is the only place that re-classifies a failure before it
/// reaches the caller.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not empty: {0}")]
    NotEmpty(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("no tenant context installed for the current operation")]
    ContextRequired,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("provisioning failed: {0}")]
    Failed(String),
}

impl ProvisionError {
    /// Whether the failure is a resource-name collision, which maps to a
    /// conflict at the API boundary and must not trigger compensation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProvisionError::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
