//! The platform core: user directory, event catalog, and the join-request
//! workflow. Components take their collaborators by constructor — a shared
//! [`gather_db::Database`] handle and, for the workflow, a [`Notifier`] —
//! and expose async operations; all SQLite work runs off the async runtime
//! via `spawn_blocking`.

pub mod catalog;
pub mod directory;
pub mod error;
mod map;
pub mod notify;
pub mod workflow;

pub use catalog::{EventCatalog, EventPatch, ListParams};
pub use directory::UserDirectory;
pub use error::Error;
pub use notify::Notifier;
pub use workflow::JoinRequestWorkflow;

/// Run a closure of blocking DB work on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("blocking task join: {}", e))?
}
