use async_trait::async_trait;
use gather_types::notify::Notice;

/// Send-and-acknowledge contract for the notification gateway.
///
/// Delivery is acknowledged with `Ok(true)`; both `Ok(false)` and `Err(_)`
/// are treated as failure by callers. The workflow makes acknowledgement a
/// precondition of persisting a state change, so implementations should not
/// retry internally — a failed dispatch fails the whole operation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notice: Notice) -> anyhow::Result<bool>;
}
