use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ApiFailure;

/// An open server-push subscription.
///
/// Yields raw JSON frames until the server side ends the stream. Dropping
/// the subscription closes it; transport-level reconnection is the
/// transport's concern, not the consumer's.
pub struct PushSubscription {
    frames: mpsc::Receiver<String>,
}

impl PushSubscription {
    pub fn new(frames: mpsc::Receiver<String>) -> Self {
        Self { frames }
    }

    pub async fn recv(&mut self) -> Option<String> {
        self.frames.recv().await
    }
}

/// Seam to the server-push channel, opened per session token.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open(&self, token: &str) -> Result<PushSubscription, ApiFailure>;
}
