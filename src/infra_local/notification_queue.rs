use crate::domain_port::NotificationSink;
use crate::logger::*;
use anyhow::anyhow;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct Notification {
    recipient: String,
    subject: String,
    body: String,
}

/// Accepts notifications without waiting on delivery. A background worker
/// drains the queue into `delivery` until cancelled.
pub struct QueuedNotificationSink {
    sender: Sender<Notification>,
}

impl QueuedNotificationSink {
    pub fn spawn(
        delivery: Arc<dyn NotificationSink>,
        capacity: usize,
        cancellation_token: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(receiver, delivery, cancellation_token));
        (QueuedNotificationSink { sender }, handle)
    }
}

#[async_trait::async_trait]
impl NotificationSink for QueuedNotificationSink {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let notification = Notification {
            recipient: recipient.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        };
        match self.sender.try_send(notification) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(anyhow!("notification queue is full")),
            Err(TrySendError::Closed(_)) => Err(anyhow!("notification worker has stopped")),
        }
    }
}

async fn deliver(delivery: &dyn NotificationSink, notification: Notification) {
    if let Err(e) = delivery
        .send(&notification.recipient, &notification.subject, &notification.body)
        .await
    {
        error!(
            recipient = %notification.recipient,
            "unable to deliver notification: {:#}", e
        );
    }
}

async fn run_worker(
    mut receiver: Receiver<Notification>,
    delivery: Arc<dyn NotificationSink>,
    cancellation_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                info!("notification worker shutting down...");
                break;
            }
            next = receiver.recv() => match next {
                Some(notification) => deliver(delivery.as_ref(), notification).await,
                None => break,
            }
        }
    }

    receiver.close();
    while let Ok(notification) = receiver.try_recv() {
        deliver(delivery.as_ref(), notification).await;
    }
}
