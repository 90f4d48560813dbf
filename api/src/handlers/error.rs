//! Mapping of data-access errors to HTTP responses.
//!
//! Business absence becomes 404, caller mistakes 400, an unreachable
//! database 503; every other fault is a 500 whose body does not leak the
//! underlying driver message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use mc_core::errors::{DataError, ExecError};
use mc_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;
use validator::ValidationErrors;

/// Errors returned by the route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ApiError {
    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Data(error) => error.to_error_response(),
            ApiError::Validation(errors) => {
                let mut response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request body");
                for (field, _) in errors.field_errors() {
                    response = response.add_detail(field.to_string(), "invalid");
                }
                response
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Data(error) => match error {
                DataError::NotFound { .. } => StatusCode::NOT_FOUND,
                DataError::Validation { .. } => StatusCode::BAD_REQUEST,
                DataError::Exec(ExecError::UnknownColumn { .. } | ExecError::NoColumns { .. }) => {
                    StatusCode::BAD_REQUEST
                }
                DataError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "API Error: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }
        HttpResponse::build(status).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::errors::{ConnectionError, MappingError, Operation};

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(DataError::not_found("users", 3));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(DataError::validation("users", "field 'username' is required"));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let unavailable = ApiError::from(DataError::from(ConnectionError::PoolClosed));
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let failed = ApiError::from(DataError::from(ExecError::database(
            "users",
            Operation::Insert,
            std::io::Error::new(std::io::ErrorKind::Other, "duplicate entry"),
        )));
        assert_eq!(failed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let mapping = ApiError::from(DataError::from(MappingError::ColumnCount {
            entity: "users".to_string(),
            expected: 5,
            actual: 4,
        }));
        assert_eq!(mapping.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_errors_hide_driver_messages() {
        let error = ApiError::from(DataError::from(ExecError::database(
            "users",
            Operation::Select,
            std::io::Error::new(std::io::ErrorKind::Other, "secret driver detail"),
        )));
        let body = error.body();

        assert_eq!(body.error, error_codes::DATABASE_ERROR);
        assert!(!body.message.contains("secret"));
    }
}
