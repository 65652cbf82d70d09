use axum::{
    body::Bytes,
    extract::State,
    Json,
};
use papaya_database::{Note, SharedNote};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::ErrorResponse,
    middleware::{ApiJson, ApiPath, ApiQuery, AuthUser},
    routes::auth::MessageResponse,
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub starred: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShareRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedNoteResponse {
    pub id: i64,
    pub note_id: i64,
    pub user_id: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub message: String,
    pub shared_note: SharedNoteResponse,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            owner_id: note.owner_id,
            title: note.title,
            content: note.content,
            starred: note.starred,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl From<SharedNote> for SharedNoteResponse {
    fn from(share: SharedNote) -> Self {
        Self {
            id: share.id,
            note_id: share.note_id,
            user_id: share.user_id,
            created_at: share.created_at,
        }
    }
}

fn into_responses(notes: Vec<Note>) -> Vec<NoteResponse> {
    notes.into_iter().map(NoteResponse::from).collect()
}

#[utoipa::path(
    post,
    path = "/notes",
    tag = "Notes",
    security(("bearerAuth" = [])),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note created", body = NoteResponse),
        (status = 400, description = "Invalid note payload", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn create_note(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state
        .notes()
        .create(user.user_id, &payload.title, &payload.content)
        .await?;

    Ok(Json(note.into()))
}

#[utoipa::path(
    get,
    path = "/notes",
    tag = "Notes",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Owned and shared notes", body = [NoteResponse]),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn list_notes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = state.notes().list_all(user.user_id).await?;
    Ok(Json(into_responses(notes)))
}

/// The query may come from `?query=` or, for older clients, a JSON body.
#[utoipa::path(
    get,
    path = "/notes/search",
    tag = "Notes",
    security(("bearerAuth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Owned notes matching the query", body = [NoteResponse]),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
pub async fn search_notes(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<SearchQuery>,
    body: Bytes,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let query = match params.query {
        Some(query) => query,
        None if body.is_empty() => return Err(ApiError::bad_request("query is required")),
        None => serde_json::from_slice::<SearchQuery>(&body)
            .map_err(|_| ApiError::bad_request("invalid search payload"))?
            .query
            .ok_or_else(|| ApiError::bad_request("query is required"))?,
    };

    let notes = state.notes().search(user.user_id, &query).await?;
    Ok(Json(into_responses(notes)))
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note visible to the caller", body = NoteResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Note missing or not visible", body = ErrorResponse)
    )
)]
pub async fn get_note(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(note_id): ApiPath<i64>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state.notes().get(note_id, user.user_id).await?;
    Ok(Json(note.into()))
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Invalid note payload", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Note missing or not owned", body = ErrorResponse)
    )
)]
pub async fn update_note(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(note_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state
        .notes()
        .update(note_id, user.user_id, &payload.title, &payload.content)
        .await?;

    Ok(Json(note.into()))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Note missing or not owned", body = ErrorResponse)
    )
)]
pub async fn delete_note(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(note_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.notes().delete(note_id, user.user_id).await?;
    Ok(Json(MessageResponse::new("note deleted")))
}

#[utoipa::path(
    put,
    path = "/notes/{id}/star",
    tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Starred flag flipped", body = NoteResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Note missing or not owned", body = ErrorResponse)
    )
)]
pub async fn toggle_star(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(note_id): ApiPath<i64>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state.notes().toggle_star(note_id, user.user_id).await?;
    Ok(Json(note.into()))
}

#[utoipa::path(
    post,
    path = "/notes/{id}/share",
    tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "Note id")),
    request_body = ShareRequest,
    responses(
        (status = 200, description = "Note shared", body = ShareResponse),
        (status = 400, description = "Cannot share with yourself", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Note or recipient missing", body = ErrorResponse)
    )
)]
pub async fn share_note(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(note_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ShareRequest>,
) -> Result<Json<ShareResponse>, ApiError> {
    let share = state
        .notes()
        .share(note_id, user.user_id, &payload.email)
        .await?;

    Ok(Json(ShareResponse {
        message: "note shared".to_string(),
        shared_note: share.into(),
    }))
}
