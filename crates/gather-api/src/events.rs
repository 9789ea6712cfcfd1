use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use gather_core::{EventPatch, ListParams};
use gather_types::api::{Claims, CreateEventRequest, UpdateEventRequest, UpdatedResponse};

use crate::auth::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub date: Option<DateTime<Utc>>,
    pub category_name: Option<String>,
    pub category_type: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    30
}

/// Public listing — no auth required. `limit` is clamped to 100.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.page < 1 || query.limit < 1 {
        return Err(ApiError::validation("page and limit must be at least 1"));
    }

    let page = state
        .catalog
        .list(ListParams {
            page: query.page,
            limit: query.limit.min(100),
            date: query.date,
            category_name: query.category_name,
            category_type: query.category_type,
        })
        .await?;
    Ok(Json(page))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::validation("title must not be empty"));
    }
    if req.category.name.trim().is_empty() {
        return Err(ApiError::validation("category name must not be empty"));
    }

    let event = state
        .catalog
        .create(claims.sub, &req.title, &req.description, req.date, req.category)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .catalog
        .update(
            claims.sub,
            event_id,
            EventPatch {
                title: req.title,
                description: req.description,
                date: req.date,
                category: req.category,
            },
        )
        .await?;
    Ok(Json(UpdatedResponse { updated }))
}
