use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::ranking::RankingError;
use crate::store::StoreError;
use crate::utils::{error_codes, error_to_api_response};

pub const ACCESS_DENIED: &str = "Access denied";
pub const INCORRECT_CREDENTIALS: &str = "Incorrect email or password";
pub const USER_EXISTS: &str = "This user already exists";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request parameters: {0}")]
    Validation(String),
    #[error("{}", INCORRECT_CREDENTIALS)]
    InvalidCredentials,
    #[error("{}", ACCESS_DENIED)]
    AccessDenied,
    /// Carries the resource name, e.g. `entry`.
    #[error("This {0} was not found.")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Ranking(#[from] RankingError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal(e.to_string())
    }

    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::AccessDenied => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::Conflict(_) => (StatusCode::CONFLICT, error_codes::CONFLICT),
            AppError::Ranking(RankingError::NoTopAlpha) => {
                (StatusCode::NOT_FOUND, error_codes::NOT_FOUND)
            }
            AppError::Ranking(RankingError::AlphaConflict(_)) => {
                (StatusCode::CONFLICT, error_codes::CONFLICT)
            }
            AppError::Ranking(RankingError::Store(store)) | AppError::Store(store) => match store {
                StoreError::Conflict(_) => (StatusCode::CONFLICT, error_codes::CONFLICT),
                StoreError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, error_codes::TIMEOUT),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR),
            },
            AppError::Ranking(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, error_to_api_response::<()>(code, self.to_string())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn maps_errors_to_statuses() {
        assert_eq!(status(AppError::Validation("lat".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::AccessDenied), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::NotFound("entry")), StatusCode::NOT_FOUND);
        assert_eq!(status(RankingError::NoTopAlpha.into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status(RankingError::AlphaConflict("u1".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(StoreError::Conflict("dup".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(RankingError::Store(StoreError::Timeout("top_reporter")).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status(RankingError::AggregationShape.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_name_the_resource() {
        assert_eq!(AppError::NotFound("alert type").to_string(), "This alert type was not found.");
        assert_eq!(AppError::AccessDenied.to_string(), "Access denied");
    }
}
