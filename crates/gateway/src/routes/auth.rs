use axum::{extract::State, Json};
use papaya_auth::{AuthError, AuthSession};
use papaya_database::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ErrorResponse,
    middleware::{ApiJson, AuthUser},
    ApiError, AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
        }
    }
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .authenticator()
        .register(&payload.email, &payload.password)
        .await?;

    Ok(Json(session.into()))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "No account with that email", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .authenticator()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(session.into()))
}

#[utoipa::path(
    post,
    path = "/update-password",
    tag = "Auth",
    security(("bearerAuth" = [])),
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is wrong or new password invalid", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    )
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .authenticator()
        .update_password(user.user_id, &payload.current_password, &payload.new_password)
        .await
        .map_err(|err| match err {
            AuthError::InvalidCredentials => ApiError::bad_request("current password is incorrect"),
            other => ApiError::from(other),
        })?;

    Ok(Json(MessageResponse::new("password updated")))
}
