//! Authentication error types.

use clinica_core::error::ClinicaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Não autenticado")]
    MissingToken,

    #[error("Token expirado")]
    TokenExpired,

    #[error("Token inválido: {0}")]
    TokenInvalid(String),

    #[error("Acesso negado")]
    Forbidden,

    #[error("senha deve ter ao menos {min} caracteres")]
    WeakPassword { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for ClinicaError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => ClinicaError::Unauthenticated {
                reason: err.to_string(),
            },
            AuthError::Forbidden => ClinicaError::Forbidden {
                reason: err.to_string(),
            },
            AuthError::WeakPassword { .. } => ClinicaError::validation(err.to_string()),
            AuthError::Crypto(msg) => ClinicaError::Crypto(msg),
        }
    }
}
