//! Site view session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{RecordField, SiteId},
    reconcile::{SaveOutcome, WorkspaceSnapshot},
};

/// Open site view request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OpenSessionRequest {
    /// Site key, e.g. `W100`, `w100` or `100`
    #[validate(length(min = 1, max = 32, message = "Site key must be 1-32 characters"))]
    pub site: String,
    /// Category filter; pre-fills the category of new records
    #[validate(length(max = 128, message = "Category must be at most 128 characters"))]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub snapshot: WorkspaceSnapshot,
}

/// Set one draft field; downstream catalog fields are cleared
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFieldRequest {
    pub field: RecordField,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryFilterRequest {
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResponse {
    pub outcome: SaveOutcome,
    pub snapshot: WorkspaceSnapshot,
}

/// Open a site view
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    request_body = OpenSessionRequest,
    responses(
        (status = 201, description = "Session opened", body = SessionResponse),
        (status = 400, description = "Invalid site key"),
        (status = 409, description = "Too many open sessions")
    )
)]
pub async fn open_session(
    State(state): State<crate::AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    request.validate()?;
    let site = SiteId::parse(&request.site)?;
    let (session_id, snapshot) = state.services.sessions.open(site, request.category).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            snapshot,
        }),
    ))
}

/// Get the current snapshot of a site view
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Site view snapshot", body = WorkspaceSnapshot),
        (status = 404, description = "Session not found")
    )
)]
pub async fn get_session(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state.services.sessions.snapshot(id).await?;
    Ok(Json(snapshot))
}

/// Close a site view
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found")
    )
)]
pub async fn close_session(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.sessions.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reload records and requirement rules
#[utoipa::path(
    post,
    path = "/sessions/{id}/refresh",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Refreshed snapshot", body = WorkspaceSnapshot),
        (status = 404, description = "Session not found")
    )
)]
pub async fn refresh_session(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state.services.sessions.refresh(id).await?;
    Ok(Json(snapshot))
}

/// Change the category filter of a site view
#[utoipa::path(
    put,
    path = "/sessions/{id}/filter",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = CategoryFilterRequest,
    responses(
        (status = 200, description = "Updated snapshot", body = WorkspaceSnapshot)
    )
)]
pub async fn set_filter(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CategoryFilterRequest>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state
        .services
        .sessions
        .set_category_filter(id, request.category)
        .await?;
    Ok(Json(snapshot))
}

/// Start a new record draft
#[utoipa::path(
    post,
    path = "/sessions/{id}/draft/new",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Draft opened", body = WorkspaceSnapshot),
        (status = 409, description = "Another draft is open")
    )
)]
pub async fn begin_add_new(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state.services.sessions.begin_add_new(id).await?;
    Ok(Json(snapshot))
}

/// Start editing an existing record
#[utoipa::path(
    post,
    path = "/sessions/{id}/draft/edit/{record_id}",
    tag = "drafts",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("record_id" = Uuid, Path, description = "Inventory record ID")
    ),
    responses(
        (status = 200, description = "Draft opened", body = WorkspaceSnapshot),
        (status = 404, description = "Record not in this site view")
    )
)]
pub async fn begin_edit(
    State(state): State<crate::AppState>,
    Path((id, record_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state.services.sessions.begin_edit(id, record_id).await?;
    Ok(Json(snapshot))
}

/// Set one field of the open draft
#[utoipa::path(
    patch,
    path = "/sessions/{id}/draft",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = UpdateFieldRequest,
    responses(
        (status = 200, description = "Draft updated", body = WorkspaceSnapshot),
        (status = 409, description = "No open draft")
    )
)]
pub async fn update_field(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateFieldRequest>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state
        .services
        .sessions
        .update_field(id, request.field, request.value)
        .await?;
    Ok(Json(snapshot))
}

/// Discard the open draft
#[utoipa::path(
    delete,
    path = "/sessions/{id}/draft",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Draft discarded", body = WorkspaceSnapshot),
        (status = 409, description = "No open draft")
    )
)]
pub async fn cancel_draft(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceSnapshot>> {
    let snapshot = state.services.sessions.cancel(id).await?;
    Ok(Json(snapshot))
}

/// Validate and commit the open draft.
///
/// Blocked and warned saves are reported in the body with status 200.
#[utoipa::path(
    post,
    path = "/sessions/{id}/draft/save",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Save outcome", body = SaveResponse),
        (status = 409, description = "No open draft"),
        (status = 500, description = "Commit failed; draft kept open")
    )
)]
pub async fn save_draft(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SaveResponse>> {
    let (outcome, snapshot) = state.services.sessions.save(id).await?;
    Ok(Json(SaveResponse { outcome, snapshot }))
}
