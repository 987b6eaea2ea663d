//! Pub/sub bridge to the external WhatsApp driver.
//!
//! The driver process owns the WhatsApp session; this crate speaks to it
//! over a shared bus. It provides:
//!
//! - Channel-name constants ([`channels`])
//! - Typed outbound and inbound payloads, including the validated
//!   [`InboundEvent`] produced from the driver's raw envelope
//! - The [`RelayBus`] trait with a Redis implementation and an in-memory
//!   one for tests
//! - [`Relay`], a typed front for publishing and subscribing
//!
//! Delivery is at-most-once in both directions.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use relay_bridge::{RedisBus, Relay, RelayAddress, RelayConfig};
//!
//! # async fn example() -> Result<(), relay_bridge::RelayError> {
//! let bus = RedisBus::connect(&RelayConfig::default()).await?;
//! let relay = Relay::new(Arc::new(bus));
//!
//! relay
//!     .send_text("company-1", &RelayAddress::for_client("+1", "5550100"), "Hello!")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod bus;
pub mod channels;
pub mod config;
pub mod error;
pub mod memory_bus;
pub mod redis_bus;
pub mod relay;
pub mod types;

pub use address::RelayAddress;
pub use bus::{RelayBus, RelayMessage, RelayStream};
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use memory_bus::MemoryBus;
pub use redis_bus::RedisBus;
pub use relay::{BotEventStream, Relay};
pub use types::{BotEvent, ConnectRequest, IgnoreReason, InboundEvent, ProviderMessage, SendMessage};
