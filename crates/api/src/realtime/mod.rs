//! Realtime notifier: WebSocket hub and relay listener.

pub mod hub;
pub mod listener;
pub mod socket;

pub use hub::RealtimeHub;
pub use listener::{run_relay_listener, ReconnectConfig};
pub use socket::ws_handler;
