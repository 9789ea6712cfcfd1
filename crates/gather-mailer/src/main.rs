mod routes;
mod smtp;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::{get, post}};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use gather_types::notify::{ACCEPT_REQUEST_PATH, JOIN_REQUEST_PATH, REJECT_REQUEST_PATH};

use crate::routes::AppState;
use crate::smtp::{Mailer, SmtpConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gather_mailer=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("GATHER_MAILER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GATHER_MAILER_PORT")
        .unwrap_or_else(|_| "3100".into())
        .parse()?;
    let from_email =
        std::env::var("GATHER_MAIL_FROM").unwrap_or_else(|_| "no-reply@gather.local".into());
    let from_name =
        std::env::var("GATHER_MAIL_FROM_NAME").unwrap_or_else(|_| "Gather Events".into());

    let smtp = match std::env::var("GATHER_SMTP_HOST") {
        Ok(server) => Some(SmtpConfig {
            server,
            port: std::env::var("GATHER_SMTP_PORT")
                .unwrap_or_else(|_| "587".into())
                .parse()?,
            username: std::env::var("GATHER_SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("GATHER_SMTP_PASSWORD").unwrap_or_default(),
        }),
        Err(_) => {
            warn!("GATHER_SMTP_HOST unset — running in log-only mode");
            None
        }
    };

    let state = AppState {
        mailer: Arc::new(Mailer::new(smtp, from_email, from_name)),
    };

    let app = Router::new()
        .route(JOIN_REQUEST_PATH, post(routes::join_request))
        .route(ACCEPT_REQUEST_PATH, post(routes::accept_request))
        .route(REJECT_REQUEST_PATH, post(routes::reject_request))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Gather mailer listening on {}", addr);

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
