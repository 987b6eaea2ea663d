//! In-process relay bus for tests and local runs.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::broadcast;
use tracing::warn;

use crate::bus::{RelayBus, RelayMessage, RelayStream};
use crate::error::{RelayError, Result};

const DEFAULT_CAPACITY: usize = 256;

/// A bus that lives in memory and records everything published to it.
#[derive(Debug)]
pub struct MemoryBus {
    sender: broadcast::Sender<RelayMessage>,
    published: Mutex<Vec<RelayMessage>>,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            sender,
            published: Mutex::new(Vec::new()),
        }
    }

    /// Everything published so far, oldest first.
    pub fn published(&self) -> Vec<RelayMessage> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Published messages on one channel.
    pub fn published_on(&self, channel: &str) -> Vec<RelayMessage> {
        self.published()
            .into_iter()
            .filter(|m| m.channel == channel)
            .collect()
    }

    /// Forget recorded publishes.
    pub fn clear(&self) {
        if let Ok(mut published) = self.published.lock() {
            published.clear();
        }
    }

    /// Deliver a message to subscribers as if another process published it.
    ///
    /// Not recorded in [`published`](Self::published).
    pub fn inject(&self, channel: &str, payload: impl Into<String>) {
        let _ = self.sender.send(RelayMessage::new(channel, payload));
    }
}

#[async_trait]
impl RelayBus for MemoryBus {
    async fn publish(&self, channel: &str, payload: String) -> Result<()> {
        let message = RelayMessage::new(channel, payload);
        self.published
            .lock()
            .map_err(|_| RelayError::Closed)?
            .push(message.clone());
        // No subscribers is not an error on a pub/sub bus.
        let _ = self.sender.send(message);
        Ok(())
    }

    async fn subscribe(&self, channels: &[&str]) -> Result<RelayStream> {
        let wanted: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
        let receiver = self.sender.subscribe();

        let stream = stream::unfold((receiver, wanted), |(mut receiver, wanted)| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) if wanted.contains(&message.channel) => {
                        return Some((message, (receiver, wanted)));
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Memory bus subscriber lagged, {} messages lost", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_publish_is_recorded_and_delivered() {
        let bus = MemoryBus::new();
        let mut stream = bus.subscribe(&["a"]).await.unwrap();

        bus.publish("b", "ignored".to_string()).await.unwrap();
        bus.publish("a", "hello".to_string()).await.unwrap();

        let message = stream.next().await.unwrap();
        assert_eq!(message, RelayMessage::new("a", "hello"));
        assert_eq!(bus.published().len(), 2);
        assert_eq!(bus.published_on("a").len(), 1);
    }

    #[tokio::test]
    async fn test_inject_is_not_recorded() {
        let bus = MemoryBus::new();
        let mut stream = bus.subscribe(&["a"]).await.unwrap();

        bus.inject("a", "from outside");
        assert_eq!(stream.next().await.unwrap().payload, "from outside");
        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = MemoryBus::new();
        assert!(bus.publish("a", "x".to_string()).await.is_ok());
    }
}
