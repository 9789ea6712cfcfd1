use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use gather_api::auth::{self, AppState, AppStateInner};
use gather_api::middleware::require_auth;
use gather_api::notify::HttpNotifier;
use gather_api::{events, requests, users};
use gather_core::{EventCatalog, JoinRequestWorkflow, UserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gather=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("GATHER_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("GATHER_DB_PATH").unwrap_or_else(|_| "gather.db".into());
    let host = std::env::var("GATHER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GATHER_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let mailer_url =
        std::env::var("GATHER_MAILER_URL").unwrap_or_else(|_| "http://127.0.0.1:3100".into());

    // Init database
    let db = Arc::new(gather_db::Database::open(&PathBuf::from(&db_path))?);

    // Wire components — explicit constructor injection, no global registry
    let directory = UserDirectory::new(db.clone());
    let catalog = EventCatalog::new(db.clone(), directory.clone());
    let notifier = Arc::new(HttpNotifier::new(mailer_url));
    let workflow = JoinRequestWorkflow::new(db, notifier);

    let state: AppState = Arc::new(AppStateInner {
        directory,
        catalog,
        workflow,
        jwt_secret,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/events", get(events::list_events))
        .route("/health", get(|| async { "ok" }))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/me", get(users::get_me))
        .route("/users/me", put(users::update_me))
        .route("/events", post(events::create_event))
        .route("/events/{event_id}", put(events::update_event))
        .route("/events/{event_id}/join", post(requests::join))
        .route(
            "/events/{event_id}/requests/{request_id}/accept",
            put(requests::accept),
        )
        .route(
            "/events/{event_id}/requests/{request_id}/reject",
            put(requests::reject),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Gather server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
