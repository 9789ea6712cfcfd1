use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use gather_types::api::{Claims, DecisionResponse, JoinResponse};
use gather_types::models::Decision;

use crate::auth::AppState;
use crate::error::ApiError;

/// POST /events/{id}/join — the caller asks to join someone else's event.
pub async fn join(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let request_status = state.workflow.submit(event_id, claims.sub).await?;
    Ok((StatusCode::CREATED, Json(JoinResponse { request_status })))
}

/// PUT /events/{id}/requests/{request_id}/accept — manager-only by predicate:
/// a non-owner's attempt simply finds no pending request.
pub async fn accept(
    State(state): State<AppState>,
    Path((event_id, request_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .workflow
        .decide(event_id, claims.sub, request_id, Decision::Accept)
        .await?;
    Ok(Json(DecisionResponse { message }))
}

/// PUT /events/{id}/requests/{request_id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Path((event_id, request_id)): Path<(Uuid, Uuid)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state
        .workflow
        .decide(event_id, claims.sub, request_id, Decision::Reject)
        .await?;
    Ok(Json(DecisionResponse { message }))
}
