use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use gather_types::api::{Claims, UpdateUserRequest, UpdatedResponse};

use crate::auth::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    /// `include=events` expands the user's owned events.
    pub include: Option<String>,
}

pub async fn get_me(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let include_events = query.include.as_deref() == Some("events");
    let profile = state.directory.get(claims.sub, include_events).await?;
    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(ApiError::validation("email must be a valid address"));
        }
    }
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name must not be empty"));
        }
    }

    let updated = state
        .directory
        .update(claims.sub, req.name, req.email)
        .await?;
    Ok(Json(UpdatedResponse { updated }))
}
