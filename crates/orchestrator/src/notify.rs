use async_trait::async_trait;
use telegram::TelegramClient;
use tracing::{info, warn};

/// Outbound status notifications.
///
/// Delivery is best-effort: an implementation must never let a failed send
/// abort the run it is reporting on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str);
}

/// Fallback sink when no bot is configured.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, text: &str) {
        info!("{}", text);
    }
}

pub struct TelegramNotifier {
    client: TelegramClient,
}

impl TelegramNotifier {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) {
        if let Err(e) = self.client.send_message(text).await {
            warn!(error = %e, "Failed to deliver notification");
        }
    }
}
