use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use papaya_auth::AuthError;
use papaya_notes::NoteError;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::EmailTaken => Self::conflict("email already registered"),
            AuthError::UserNotFound => Self::not_found("user not found"),
            AuthError::InvalidCredentials => Self::unauthorized("invalid credentials"),
            AuthError::InvalidToken | AuthError::TokenExpired => {
                debug!(error = %error, "rejected token");
                Self::unauthorized("invalid or expired token")
            }
            AuthError::Validation(message) => Self::bad_request(message),
            AuthError::TokenCreation | AuthError::PasswordHash(_) | AuthError::Store(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error()
            }
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(error: NoteError) -> Self {
        match error {
            // Foreign notes are reported exactly like missing ones.
            NoteError::NotFound | NoteError::Forbidden => {
                debug!(error = %error, "note not accessible");
                Self::not_found("note not found")
            }
            NoteError::RecipientNotFound => Self::not_found("recipient not found"),
            NoteError::Validation(message) => Self::bad_request(message),
            NoteError::Store(_) => {
                error!(error = ?error, "note store error");
                Self::internal_server_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
