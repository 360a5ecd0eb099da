use crate::domain_port::NotificationSink;
use crate::logger::*;

/// Delivers notifications into the log. Used where no mail relay is configured.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

#[async_trait::async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%recipient, %subject, "notification: {}", body);
        Ok(())
    }
}
