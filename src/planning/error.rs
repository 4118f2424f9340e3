use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("event not found: {id}")]
    NotFound { id: String },

    #[error("invalid transition from {from} to {attempted}")]
    InvalidTransition {
        from: &'static str,
        attempted: &'static str,
    },

    #[error("storage failed: {0}")]
    Storage(String),
}

impl PlanningError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PlanningError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        PlanningError::NotFound { id: id.into() }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        PlanningError::Storage(err.to_string())
    }
}

pub type PlanningResult<T> = Result<T, PlanningError>;
