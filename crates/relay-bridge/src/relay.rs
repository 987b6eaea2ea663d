//! Typed access to the relay channels.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::address::RelayAddress;
use crate::bus::{RelayBus, RelayMessage};
use crate::channels;
use crate::error::Result;
use crate::types::{BotEvent, ConnectRequest, SendMessage};

/// A stream of decoded driver events.
pub type BotEventStream = std::pin::Pin<Box<dyn futures::Stream<Item = BotEvent> + Send>>;

/// Typed front for a [`RelayBus`].
#[derive(Clone)]
pub struct Relay {
    bus: Arc<dyn RelayBus>,
}

impl Relay {
    pub fn new(bus: Arc<dyn RelayBus>) -> Self {
        Self { bus }
    }

    /// The underlying bus.
    pub fn bus(&self) -> &Arc<dyn RelayBus> {
        &self.bus
    }

    /// Ask the driver to send a text message. No delivery confirmation.
    pub async fn send_text(
        &self,
        company_id: &str,
        to: &RelayAddress,
        message: &str,
    ) -> Result<()> {
        let command = SendMessage {
            company_id: company_id.to_string(),
            message: message.to_string(),
            to: to.chat_id(),
        };
        self.bus
            .publish(channels::SEND_MESSAGE, serde_json::to_string(&command)?)
            .await?;
        debug!("Relayed message for company {} to {}", company_id, to);
        Ok(())
    }

    /// Ask the driver to link a company's WhatsApp session.
    pub async fn request_connect(&self, company_id: &str) -> Result<()> {
        let request = ConnectRequest {
            company_id: company_id.to_string(),
        };
        self.bus
            .publish(channels::CONNECT, serde_json::to_string(&request)?)
            .await
    }

    /// Subscribe to every driver channel and decode what arrives.
    ///
    /// Messages that fail to decode are logged and dropped.
    pub async fn bot_events(&self) -> Result<BotEventStream> {
        let raw = self.bus.subscribe(&channels::BOT_CHANNELS).await?;

        let events = raw.filter_map(|message: RelayMessage| async move {
            match BotEvent::decode(&message) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Dropping relay message on {}: {}", message.channel, e);
                    debug!("Raw payload: {}", message.payload);
                    None
                }
            }
        });

        Ok(Box::pin(events))
    }
}
