//! Redis-backed relay bus.

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info, warn};

use crate::bus::{RelayBus, RelayMessage, RelayStream};
use crate::config::RelayConfig;
use crate::error::Result;

/// Relay bus over Redis pub/sub.
///
/// Publishing shares one multiplexed connection; every subscription opens
/// its own dedicated pub/sub connection.
#[derive(Clone)]
pub struct RedisBus {
    client: redis::Client,
    publisher: MultiplexedConnection,
}

impl RedisBus {
    /// Connect to Redis.
    pub async fn connect(config: &RelayConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let publisher = client.get_multiplexed_async_connection().await?;

        info!("Connected to Redis relay bus at {}", config.redis_url);

        Ok(Self { client, publisher })
    }
}

#[async_trait]
impl RelayBus for RedisBus {
    async fn publish(&self, channel: &str, payload: String) -> Result<()> {
        let mut conn = self.publisher.clone();
        let receivers: i64 = conn.publish(channel, payload).await?;
        debug!("Published on {} ({} receivers)", channel, receivers);
        Ok(())
    }

    async fn subscribe(&self, channels: &[&str]) -> Result<RelayStream> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        for channel in channels {
            pubsub.subscribe(*channel).await?;
        }

        info!("Subscribed to relay channels: {}", channels.join(", "));

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let channel = msg.get_channel_name().to_string();
            match msg.get_payload::<String>() {
                Ok(payload) => Some(RelayMessage { channel, payload }),
                Err(e) => {
                    warn!("Dropping non-text payload on {}: {}", channel, e);
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "redis"
    }
}
