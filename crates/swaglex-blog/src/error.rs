use serde::Serialize;

/// A single failed precondition on a caller-supplied field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors produced by the collection operations.
///
/// Absence and bad input are the only failure kinds; anything else is a bug
/// in how the caller classified the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlogError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },
}

impl BlogError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// Field-level details, empty for errors that are not about input.
    pub fn details(&self) -> &[FieldError] {
        match self {
            Self::Validation { details, .. } => details,
            Self::NotFound { .. } => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
