//! Channel names shared with the WhatsApp driver and the dashboard.
//!
//! These strings are part of the wire contract and must not change.

/// Outbound send commands (service -> driver).
pub const SEND_MESSAGE: &str = "whatsapp.send-message";

/// Inbound provider messages (driver -> service).
pub const MESSAGE_CREATE: &str = "whatsapp.message_create";

/// Request to link a company's session (service -> driver).
pub const CONNECT: &str = "whatsapp:connect";

/// Request to unlink a company's session (dashboard -> service).
pub const DISCONNECT: &str = "whatsapp:disconnect";

/// Status query (dashboard -> service).
pub const GET_STATUS: &str = "whatsapp:getStatus";

/// Pairing QR code (driver -> service -> dashboard).
pub const QR: &str = "whatsapp:qr";

/// Session ready (driver -> service -> dashboard).
pub const READY: &str = "whatsapp:ready";

/// Session lost (driver -> service).
pub const DISCONNECTED: &str = "whatsapp:disconnected";

/// Connection status push (service -> dashboard).
pub const STATUS: &str = "whatsapp:status";

/// Error push (service -> dashboard).
pub const ERROR: &str = "whatsapp:error";

/// Every channel the service listens to on the bus.
pub const BOT_CHANNELS: [&str; 4] = [MESSAGE_CREATE, QR, READY, DISCONNECTED];
