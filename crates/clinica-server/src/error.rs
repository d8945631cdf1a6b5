//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clinica_auth::AuthError;
use clinica_core::ClinicaError;
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// `/usuarios` and `/profissionais` report unique collisions and
    /// rejected input as 400 instead of 409/422.
    pub fn registration(err: ClinicaError) -> Self {
        match err {
            ClinicaError::Conflict { .. } | ClinicaError::Validation { .. } => {
                Self::bad_request(err.to_string())
            }
            other => other.into(),
        }
    }

    /// Period checks on query parameters answer 400.
    pub fn query(err: ClinicaError) -> Self {
        match err {
            ClinicaError::Validation { .. } => Self::bad_request(err.to_string()),
            other => other.into(),
        }
    }
}

impl From<ClinicaError> for ApiError {
    fn from(err: ClinicaError) -> Self {
        let status = match &err {
            ClinicaError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClinicaError::Conflict { .. }
            | ClinicaError::SlotUnavailable
            | ClinicaError::BedOccupied => StatusCode::CONFLICT,
            ClinicaError::AlreadyCancelled | ClinicaError::InvalidState { .. } => {
                StatusCode::BAD_REQUEST
            }
            ClinicaError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ClinicaError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ClinicaError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ClinicaError::Database(_) | ClinicaError::Crypto(_) | ClinicaError::Internal(_) => {
                error!(error = %err, "Request failed");
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno do servidor");
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ClinicaError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            detail: self.detail,
        });
        (self.status, body).into_response()
    }
}
