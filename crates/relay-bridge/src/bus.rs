//! The pub/sub bus abstraction.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::error::Result;

/// A message seen on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    pub channel: String,
    pub payload: String,
}

impl RelayMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// A stream of bus messages. Ends when the subscription is lost.
pub type RelayStream = Pin<Box<dyn Stream<Item = RelayMessage> + Send>>;

/// A publish/subscribe bus with at-most-once delivery.
///
/// Publishing is fire-and-forget: success means the bus accepted the
/// message, not that anyone received it.
#[async_trait]
pub trait RelayBus: Send + Sync {
    /// Publish a payload on a channel.
    async fn publish(&self, channel: &str, payload: String) -> Result<()>;

    /// Subscribe to a set of channels.
    async fn subscribe(&self, channels: &[&str]) -> Result<RelayStream>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
