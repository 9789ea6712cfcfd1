use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use gather_core::{EventCatalog, JoinRequestWorkflow, UserDirectory};
use gather_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use gather_types::models::{User, UserSummary};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub directory: UserDirectory,
    pub catalog: EventCatalog,
    pub workflow: JoinRequestWorkflow,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::validation("email must be a valid address"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::validation("password must be at least 8 characters"));
    }

    let user = state
        .directory
        .create(req.name.trim(), &req.email, &req.password)
        .await?;

    let token = create_token(&state.jwt_secret, &user)
        .map_err(|e| ApiError::from(gather_core::Error::Storage(e)))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse { user: summary(user), token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .directory
        .find_by_credentials(&req.email, &req.password)
        .await?;

    let Some(user) = user else {
        return Err(ApiError::Unauthorized);
    };

    let token = create_token(&state.jwt_secret, &user)
        .map_err(|e| ApiError::from(gather_core::Error::Storage(e)))?;

    Ok(Json(AuthResponse { user: summary(user), token }))
}

fn summary(user: User) -> UserSummary {
    UserSummary {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
