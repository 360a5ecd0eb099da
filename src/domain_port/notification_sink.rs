/// Best-effort outbound messages. Callers log a failed send and carry on.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}
