use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use tracing::error;

use gather_types::notify::{AcceptNotice, JoinRequestNotice, RejectNotice};

use crate::smtp::Mailer;
use crate::templates;

#[derive(Clone)]
pub struct AppState {
    pub mailer: Arc<Mailer>,
}

/// Each route acknowledges delivery with a JSON `true`; a failed send is a
/// 502 and the workflow on the other side treats it as a hard failure.
pub async fn join_request(
    State(state): State<AppState>,
    Json(notice): Json<JoinRequestNotice>,
) -> Result<Json<bool>, StatusCode> {
    let html = templates::join_request(
        &notice.name,
        &notice.event_title,
        &notice.event_description,
        &notice.requester_name,
        &notice.requester_email,
    );
    send(&state, &notice.email, "New Join Request for Your Event", &html).await
}

pub async fn accept_request(
    State(state): State<AppState>,
    Json(notice): Json<AcceptNotice>,
) -> Result<Json<bool>, StatusCode> {
    let html = templates::accepted(&notice.name, &notice.event_title, &notice.event_description);
    let subject = format!("{} Request Accepted", notice.event_title);
    send(&state, &notice.email, &subject, &html).await
}

pub async fn reject_request(
    State(state): State<AppState>,
    Json(notice): Json<RejectNotice>,
) -> Result<Json<bool>, StatusCode> {
    let html = templates::rejected(&notice.name, &notice.event_title);
    let subject = format!("{} Request Rejected", notice.event_title);
    send(&state, &notice.email, &subject, &html).await
}

async fn send(
    state: &AppState,
    to: &str,
    subject: &str,
    html: &str,
) -> Result<Json<bool>, StatusCode> {
    state.mailer.send(to, subject, html).await.map_err(|e| {
        error!("Could not send '{}' to {}: {:#}", subject, to, e);
        StatusCode::BAD_GATEWAY
    })?;
    Ok(Json(true))
}
