use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::ErrorResponse,
    middleware::{ApiJson, AuthUser},
    routes::auth::UserResponse,
    ApiError, AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: String,
}

#[utoipa::path(
    get,
    path = "/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let profile = state.authenticator().profile(user.user_id).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user profile", body = UserResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .authenticator()
        .update_profile(user.user_id, &payload.email)
        .await?;

    Ok(Json(updated.into()))
}
