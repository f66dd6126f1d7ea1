//! Error types for the service desk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    /// Bad input, caught before any state change
    #[error("Validation error: {0}")]
    Validation(String),

    /// Actor lacks the role or ownership the action needs
    #[error("Not allowed: {0}")]
    Forbidden(String),

    /// Action is illegal from the entity's current status
    #[error("Cannot {action} while {entity} is {status}")]
    InvalidTransition {
        entity: String,
        status: String,
        action: String,
    },

    /// Overlapping approved booking on the same account
    #[error("Booking conflict: {0}")]
    Conflict(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Stored record changed since it was read
    #[error("{kind} {id} was modified concurrently (expected version {expected}, found {found})")]
    VersionMismatch {
        kind: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DeskError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        DeskError::Forbidden(msg.into())
    }

    pub fn invalid_transition(
        entity: impl Into<String>,
        status: impl std::fmt::Display,
        action: impl Into<String>,
    ) -> Self {
        DeskError::InvalidTransition {
            entity: entity.into(),
            status: status.to_string(),
            action: action.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DeskError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// HTTP status the daemon answers with
    pub fn status_code(&self) -> u16 {
        match self {
            DeskError::Validation(_) => 400,
            DeskError::Forbidden(_) => 403,
            DeskError::NotFound { .. } => 404,
            DeskError::InvalidTransition { .. } => 409,
            DeskError::Conflict(_) => 409,
            DeskError::VersionMismatch { .. } => 409,
            DeskError::Io(_) | DeskError::Json(_) | DeskError::Internal(_) => 500,
        }
    }

    /// Short machine-readable tag for API bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DeskError::Validation(_) => "validation",
            DeskError::Forbidden(_) => "forbidden",
            DeskError::InvalidTransition { .. } => "invalid_transition",
            DeskError::Conflict(_) => "conflict",
            DeskError::NotFound { .. } => "not_found",
            DeskError::VersionMismatch { .. } => "version_mismatch",
            DeskError::Io(_) | DeskError::Json(_) | DeskError::Internal(_) => "internal",
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
