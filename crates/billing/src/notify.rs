//! Operator notifications
//!
//! Fire-and-forget channel towards whoever runs the operation (email,
//! chat webhook, dashboard). The core never retries and never lets a
//! notification failure affect a billing run.

use async_trait::async_trait;

/// Notification collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_owner(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

/// Default notifier that writes notifications to the log. Used by
/// deployments without an operator channel configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_owner(&self, title: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(title = %title, body = %body, "Operator notification");
        Ok(())
    }
}
