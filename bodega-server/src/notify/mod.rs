//! Outbound notification seam
//!
//! The storefront pushes a message to the owning customer when an order's
//! status changes. Actual delivery (FCM, SMS, ...) is an external
//! collaborator; the core only speaks this trait.

use async_trait::async_trait;

/// Outbound notification collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `title`/`body` to the session(s) of `recipient`. Delivery is
    /// best-effort; failures are the collaborator's concern and must never
    /// fail the triggering mutation.
    async fn notify(&self, recipient: &str, title: &str, body: &str);
}

/// Default notifier that records the notification in the log stream
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: &str, title: &str, body: &str) {
        tracing::info!(recipient, title, body, "notification dispatched");
    }
}
