//! Payloads carried on the relay channels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::RelayAddress;
use crate::bus::RelayMessage;
use crate::channels;
use crate::error::{RelayError, Result};

/// Outbound send command published on [`channels::SEND_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub company_id: String,
    pub message: String,
    /// Driver chat id, `<digits>@c.us`.
    pub to: String,
}

/// Session link request published on [`channels::CONNECT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub company_id: String,
}

/// Raw provider message envelope received on [`channels::MESSAGE_CREATE`].
///
/// The driver forwards whatever its WhatsApp client produced, so every
/// field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub from_me: bool,
    pub from: Option<String>,
}

/// Why an inbound envelope was not turned into a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a plain chat message (media, receipts, ...).
    NotChat(Option<String>),
    /// Sent by the linked account itself.
    FromMe,
    /// Empty or missing body.
    EmptyBody,
    /// No sender.
    MissingSender,
    /// Sender is not an individual phone chat (groups, broadcasts, ...).
    UnsupportedSender(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotChat(Some(kind)) => write!(f, "message type '{}' is not chat", kind),
            IgnoreReason::NotChat(None) => write!(f, "message has no type"),
            IgnoreReason::FromMe => write!(f, "message sent by the linked account"),
            IgnoreReason::EmptyBody => write!(f, "message body is empty"),
            IgnoreReason::MissingSender => write!(f, "message has no sender"),
            IgnoreReason::UnsupportedSender(from) => write!(f, "unsupported sender '{}'", from),
        }
    }
}

/// A validated inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A text message from a client's phone.
    Chat { from: RelayAddress, body: String },
    /// Anything else; never touches domain state.
    Ignored(IgnoreReason),
}

impl InboundEvent {
    /// Classify a provider envelope.
    ///
    /// Accepted only when `type == "chat"`, the body is non-empty, the
    /// message was not sent by the linked account, and a sender is present.
    pub fn classify(message: ProviderMessage) -> Self {
        if message.kind.as_deref() != Some("chat") {
            return InboundEvent::Ignored(IgnoreReason::NotChat(message.kind));
        }
        if message.from_me {
            return InboundEvent::Ignored(IgnoreReason::FromMe);
        }
        let body = match message.body {
            Some(body) if !body.trim().is_empty() => body,
            _ => return InboundEvent::Ignored(IgnoreReason::EmptyBody),
        };
        let Some(from) = message.from else {
            return InboundEvent::Ignored(IgnoreReason::MissingSender);
        };

        match RelayAddress::parse(&from) {
            Ok(from) => InboundEvent::Chat { from, body },
            Err(_) => InboundEvent::Ignored(IgnoreReason::UnsupportedSender(from)),
        }
    }

    /// Parse and classify a raw JSON payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let message: ProviderMessage = serde_json::from_str(payload)?;
        Ok(Self::classify(message))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QrPayload {
    company_id: String,
    qr: String,
}

/// The driver names its session after the company id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    client_id: String,
}

/// Anything the driver can publish to this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    Message(InboundEvent),
    Qr { company_id: String, qr: String },
    Ready { company_id: String },
    Disconnected { company_id: String },
}

impl BotEvent {
    /// Decode a bus message by channel.
    pub fn decode(message: &RelayMessage) -> Result<Self> {
        match message.channel.as_str() {
            channels::MESSAGE_CREATE => Ok(BotEvent::Message(InboundEvent::from_json(
                &message.payload,
            )?)),
            channels::QR => {
                let QrPayload { company_id, qr } = serde_json::from_str(&message.payload)?;
                Ok(BotEvent::Qr { company_id, qr })
            }
            channels::READY => {
                let SessionPayload { client_id } = serde_json::from_str(&message.payload)?;
                Ok(BotEvent::Ready {
                    company_id: client_id,
                })
            }
            channels::DISCONNECTED => {
                let SessionPayload { client_id } = serde_json::from_str(&message.payload)?;
                Ok(BotEvent::Disconnected {
                    company_id: client_id,
                })
            }
            other => Err(RelayError::UnexpectedChannel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(body: &str, from: &str) -> ProviderMessage {
        ProviderMessage {
            kind: Some("chat".to_string()),
            body: Some(body.to_string()),
            from_me: false,
            from: Some(from.to_string()),
        }
    }

    #[test]
    fn test_classify_accepts_chat() {
        let event = InboundEvent::from_json(
            r#"{"type":"chat","body":"hi","fromMe":false,"from":"15550100@c.us","id":{"id":"x"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::Chat {
                from: RelayAddress::parse("15550100").unwrap(),
                body: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_classify_filters() {
        let mut not_chat = chat("hi", "15550100@c.us");
        not_chat.kind = Some("image".to_string());
        assert!(matches!(
            InboundEvent::classify(not_chat),
            InboundEvent::Ignored(IgnoreReason::NotChat(_))
        ));

        let mut mine = chat("hi", "15550100@c.us");
        mine.from_me = true;
        assert_eq!(
            InboundEvent::classify(mine),
            InboundEvent::Ignored(IgnoreReason::FromMe)
        );

        assert_eq!(
            InboundEvent::classify(chat("  ", "15550100@c.us")),
            InboundEvent::Ignored(IgnoreReason::EmptyBody)
        );

        let mut anonymous = chat("hi", "");
        anonymous.from = None;
        assert_eq!(
            InboundEvent::classify(anonymous),
            InboundEvent::Ignored(IgnoreReason::MissingSender)
        );

        assert!(matches!(
            InboundEvent::classify(chat("hi", "1203630@g.us")),
            InboundEvent::Ignored(IgnoreReason::UnsupportedSender(_))
        ));
    }

    #[test]
    fn test_from_me_defaults_to_false() {
        let event =
            InboundEvent::from_json(r#"{"type":"chat","body":"hi","from":"1@c.us"}"#).unwrap();
        assert!(matches!(event, InboundEvent::Chat { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            InboundEvent::from_json("not json"),
            Err(RelayError::Json(_))
        ));
    }

    #[test]
    fn test_send_message_wire_shape() {
        let json = serde_json::to_value(SendMessage {
            company_id: "c1".to_string(),
            message: "Hello".to_string(),
            to: "15550100@c.us".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"companyId": "c1", "message": "Hello", "to": "15550100@c.us"})
        );
    }

    #[test]
    fn test_decode_session_events() {
        let ready =
            BotEvent::decode(&RelayMessage::new(channels::READY, r#"{"clientId":"c1"}"#)).unwrap();
        assert_eq!(
            ready,
            BotEvent::Ready {
                company_id: "c1".to_string()
            }
        );

        let qr = BotEvent::decode(&RelayMessage::new(
            channels::QR,
            r#"{"companyId":"c1","qr":"2@abc"}"#,
        ))
        .unwrap();
        assert!(matches!(qr, BotEvent::Qr { ref qr, .. } if qr == "2@abc"));

        assert!(matches!(
            BotEvent::decode(&RelayMessage::new("other", "{}")),
            Err(RelayError::UnexpectedChannel(_))
        ));
    }
}
