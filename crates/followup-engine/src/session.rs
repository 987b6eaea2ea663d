//! WhatsApp session lifecycle per company and the relay event loop.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use database::company;
use futures::StreamExt;
use relay_bridge::{channels, BotEvent, BotEventStream, InboundEvent};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::FollowupEngine;
use crate::error::{EngineError, Result};
use crate::notifier::RealtimeEvent;

/// How long an event lane waits for more work before it shuts down.
const LANE_IDLE: Duration = Duration::from_secs(30);

/// Events sharing a key are handled one at a time, in stream order.
///
/// Chat messages are keyed by sender, session events by company. Ignored
/// messages have no key.
fn ordering_key(event: &BotEvent) -> Option<String> {
    match event {
        BotEvent::Message(InboundEvent::Chat { from, .. }) => {
            Some(format!("chat:{}", from.digits()))
        }
        BotEvent::Message(InboundEvent::Ignored(_)) => None,
        BotEvent::Qr { company_id, .. }
        | BotEvent::Ready { company_id }
        | BotEvent::Disconnected { company_id } => Some(format!("session:{}", company_id)),
    }
}

/// A worker that drains the events of one key.
struct Lane {
    tx: mpsc::UnboundedSender<BotEvent>,
    task: JoinHandle<()>,
}

/// Whether a company's WhatsApp session is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Connected,
    Disconnected,
}

impl SessionStatus {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            SessionStatus::Connected
        } else {
            SessionStatus::Disconnected
        }
    }

    /// The `whatsapp:status` event for a company.
    pub fn event(self, company_id: &str) -> RealtimeEvent {
        RealtimeEvent::company(company_id, channels::STATUS, json!({ "status": self }))
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Connected => f.write_str("connected"),
            SessionStatus::Disconnected => f.write_str("disconnected"),
        }
    }
}

impl FollowupEngine {
    /// Ask the driver to link a company's session.
    pub async fn request_connect(&self, company_id: Option<&str>) -> Result<()> {
        let company_id = company_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| EngineError::Validation("Company ID is required".to_string()))?;

        company::get_company(self.db.pool(), company_id).await?;
        self.relay.request_connect(company_id).await?;

        info!("Requested WhatsApp session for company {}", company_id);
        Ok(())
    }

    /// Mark a company's session as unlinked.
    pub async fn disconnect(&self, company_id: &str) -> Result<SessionStatus> {
        company::set_whatsapp_enabled(self.db.pool(), company_id, false).await?;
        info!("WhatsApp session disconnected for company {}", company_id);
        Ok(SessionStatus::Disconnected)
    }

    /// Stored session state of a company.
    pub async fn session_status(&self, company_id: &str) -> Result<SessionStatus> {
        let company = company::get_company(self.db.pool(), company_id).await?;
        Ok(SessionStatus::from_enabled(company.whatsapp_enabled))
    }

    /// React to one event published by the driver.
    pub async fn handle_bot_event(&self, event: BotEvent) {
        match event {
            BotEvent::Message(inbound) => {
                let outcome = self.handle_inbound(inbound).await;
                debug!("Inbound outcome: {:?}", outcome);
            }
            BotEvent::Qr { company_id, qr } => {
                debug!("QR code received for company {}", company_id);
                self.notify(RealtimeEvent::company(
                    &company_id,
                    channels::QR,
                    json!({ "qr": qr, "companyId": company_id }),
                ))
                .await;
            }
            BotEvent::Ready { company_id } => {
                if let Err(e) =
                    company::set_whatsapp_enabled(self.db.pool(), &company_id, true).await
                {
                    warn!("Session ready for unknown company {}: {}", company_id, e);
                    return;
                }
                info!("WhatsApp session ready for company {}", company_id);
                self.notify(RealtimeEvent::company(
                    &company_id,
                    channels::READY,
                    json!({ "companyId": company_id }),
                ))
                .await;
                self.notify(SessionStatus::Connected.event(&company_id)).await;
            }
            BotEvent::Disconnected { company_id } => {
                if let Err(e) =
                    company::set_whatsapp_enabled(self.db.pool(), &company_id, false).await
                {
                    warn!("Session lost for unknown company {}: {}", company_id, e);
                    return;
                }
                info!("WhatsApp session lost for company {}", company_id);
                self.notify(SessionStatus::Disconnected.event(&company_id))
                    .await;
            }
        }
    }

    /// Consume driver events until the stream ends.
    ///
    /// Events for different senders and companies are handled concurrently,
    /// so a slow reply for one client does not hold up the others. Events
    /// with the same ordering key go through one lane and keep their order.
    pub async fn consume(self: Arc<Self>, mut events: BotEventStream) {
        let mut lanes: HashMap<String, Lane> = HashMap::new();

        while let Some(event) = events.next().await {
            let Some(key) = ordering_key(&event) else {
                self.handle_bot_event(event).await;
                continue;
            };

            let event = match lanes.get(&key) {
                Some(lane) => match lane.tx.send(event) {
                    Ok(()) => continue,
                    // The lane went idle; its task may still be draining.
                    Err(mpsc::error::SendError(event)) => event,
                },
                None => event,
            };

            let previous = lanes.remove(&key).map(|lane| lane.task);
            lanes.retain(|_, lane| !lane.task.is_finished());

            let lane = self.clone().spawn_lane(key.clone(), previous);
            if lane.tx.send(event).is_err() {
                warn!("Event lane {} closed before its first event", key);
            }
            lanes.insert(key, lane);
        }

        warn!("Relay event stream ended");
        for (_, lane) in lanes.drain() {
            drop(lane.tx);
            if let Err(e) = lane.task.await {
                warn!("Event lane failed: {}", e);
            }
        }
    }

    /// Start a lane. It waits for `previous` (the lane it replaces) first,
    /// so events left over in an idle lane still run before newer ones.
    fn spawn_lane(self: Arc<Self>, key: String, previous: Option<JoinHandle<()>>) -> Lane {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    warn!("Previous event lane for {} failed: {}", key, e);
                }
            }

            loop {
                match tokio::time::timeout(LANE_IDLE, rx.recv()).await {
                    Ok(Some(event)) => self.handle_bot_event(event).await,
                    Ok(None) => break,
                    Err(_) => {
                        rx.close();
                        while let Some(event) = rx.recv().await {
                            self.handle_bot_event(event).await;
                        }
                        break;
                    }
                }
            }
            debug!("Event lane {} closed", key);
        });

        Lane { tx, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_bridge::{IgnoreReason, RelayAddress};

    #[test]
    fn test_ordering_key() {
        let chat = BotEvent::Message(InboundEvent::Chat {
            from: RelayAddress::for_client("+1", "5550100"),
            body: "hi".to_string(),
        });
        assert_eq!(ordering_key(&chat).as_deref(), Some("chat:15550100"));

        let ready = BotEvent::Ready {
            company_id: "c1".to_string(),
        };
        let lost = BotEvent::Disconnected {
            company_id: "c1".to_string(),
        };
        assert_eq!(ordering_key(&ready), ordering_key(&lost));
        assert_eq!(ordering_key(&ready).as_deref(), Some("session:c1"));

        let ignored = BotEvent::Message(InboundEvent::Ignored(IgnoreReason::FromMe));
        assert_eq!(ordering_key(&ignored), None);
    }
}
