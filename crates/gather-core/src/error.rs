use thiserror::Error;

/// Domain errors surfaced by the core operations. Authorization misses are
/// folded into `NotFound` on purpose: the decide/update queries scope by
/// owner, so "doesn't exist", "not yours" and "already decided" are
/// indistinguishable by design.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("join request already sent")]
    DuplicateRequest,

    #[error("event owners cannot join their own event")]
    SelfRequest,

    /// Uniqueness violation on create (e.g. email already registered).
    #[error("already exists")]
    Conflict,

    /// The notification gateway did not acknowledge delivery. The operation
    /// is aborted before any state is persisted.
    #[error("notification delivery failed")]
    NotificationFailed,

    #[error("storage error")]
    Storage(#[from] anyhow::Error),
}
