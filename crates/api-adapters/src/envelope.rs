//! Response envelope and error mapping.
//!
//! Every endpoint answers `{success, message, data?}`. Domain errors map
//! to statuses here and nowhere else; stack detail stays in the server
//! logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use domains::DomainError;

/// Handler result alias: success payloads out, `ApiError` mapped in one place.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `200 {success: true, message, data}`.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    with_status(StatusCode::OK, message, Some(data))
}

/// `200` with no data payload.
pub fn ok_message(message: impl Into<String>) -> Response {
    with_status::<()>(StatusCode::OK, message, None)
}

/// `201 {success: true, message, data}`.
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    with_status(StatusCode::CREATED, message, Some(data))
}

fn with_status<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
) -> Response {
    (
        status,
        Json(Envelope {
            success: true,
            message: message.into(),
            data,
        }),
    )
        .into_response()
}

/// Wrapper making `DomainError` usable as an axum rejection.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Auth(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::UploadFailed(_)
            | DomainError::PersistenceFailed(_)
            | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        // 5xx responses get a generic message; the details stay server-side.
        let message = if status.is_server_error() {
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                DomainError::not_found("comment", "abc"),
                StatusCode::NOT_FOUND,
            ),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                DomainError::UploadFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::PersistenceFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).into_response().status(), expected);
        }
    }

    #[test]
    fn server_errors_hide_details() {
        let response = ApiError(DomainError::Internal("db password leaked".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
