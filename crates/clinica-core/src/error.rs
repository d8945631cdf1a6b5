//! Error types for the Clinica system.
//!
//! Messages are user-facing: the HTTP layer returns them verbatim in the
//! `detail` field, so they follow the API's language.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClinicaError {
    #[error("{entity} não encontrado")]
    NotFound { entity: String, id: String },

    /// Unique-key collision (duplicate email, duplicate slot, ...).
    #[error("{reason}")]
    Conflict { entity: String, reason: String },

    #[error("Horário indisponível")]
    SlotUnavailable,

    #[error("Leito já está ocupado")]
    BedOccupied,

    #[error("Consulta já cancelada")]
    AlreadyCancelled,

    #[error("{reason}")]
    InvalidState { reason: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{reason}")]
    Unauthenticated { reason: String },

    #[error("{reason}")]
    Forbidden { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClinicaError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &str, reason: &str) -> Self {
        Self::Conflict {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

pub type ClinicaResult<T> = Result<T, ClinicaError>;
