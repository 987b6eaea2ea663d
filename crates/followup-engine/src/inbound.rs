//! Inbound relay processing.
//!
//! Nothing here returns an error: the relay is at-most-once and there is no
//! caller to report to, so every failure is logged and the event dropped.

use database::{client, followup, FollowupStatus, MessageRole};
use relay_bridge::{IgnoreReason, InboundEvent, RelayAddress};
use tracing::{debug, error, info, warn};

use crate::engine::FollowupEngine;

/// What happened to one inbound relay event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Not a client chat message.
    Ignored(IgnoreReason),
    /// The payload was not a provider envelope.
    Malformed,
    /// No open followup for the sender.
    Unmatched,
    /// Stored as a user message; no reply was due.
    Stored { followup_id: String },
    /// Stored and answered automatically.
    Replied { followup_id: String },
    /// Stored, but the automatic reply failed.
    ReplyFailed { followup_id: String },
    /// Storage failed.
    Failed,
}

impl FollowupEngine {
    /// Parse and process a raw `whatsapp.message_create` payload.
    pub async fn handle_relay_payload(&self, payload: &str) -> InboundOutcome {
        match InboundEvent::from_json(payload) {
            Ok(event) => self.handle_inbound(event).await,
            Err(e) => {
                warn!("Dropping malformed inbound payload: {}", e);
                InboundOutcome::Malformed
            }
        }
    }

    /// Process a validated inbound event.
    pub async fn handle_inbound(&self, event: InboundEvent) -> InboundOutcome {
        match event {
            InboundEvent::Ignored(reason) => {
                debug!("Ignoring inbound message: {}", reason);
                InboundOutcome::Ignored(reason)
            }
            InboundEvent::Chat { from, body } => self.handle_chat(&from, &body).await,
        }
    }

    async fn handle_chat(&self, from: &RelayAddress, body: &str) -> InboundOutcome {
        let pool = self.db.pool();

        let candidate = match followup::find_for_relay_address(pool, from.digits()).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                warn!("No open followup for inbound message from {}", from);
                return InboundOutcome::Unmatched;
            }
            Err(e) => {
                error!("Failed to look up followup for {}: {}", from, e);
                return InboundOutcome::Failed;
            }
        };

        let _guard = self.locks.lock(&candidate.id).await;

        // The followup may have changed while we waited for the lock.
        let current = match followup::get_followup(pool, &candidate.id).await {
            Ok(current) if current.status != FollowupStatus::Completed => current,
            Ok(_) => {
                info!(
                    followup_id = %candidate.id,
                    "Followup completed meanwhile, dropping message from {}",
                    from
                );
                return InboundOutcome::Unmatched;
            }
            Err(e) => {
                warn!(followup_id = %candidate.id, "Followup vanished: {}", e);
                return InboundOutcome::Unmatched;
            }
        };

        let owner = match client::get_client(pool, &current.client_id).await {
            Ok(owner) => owner,
            Err(e) => {
                error!(followup_id = %current.id, "Failed to load client: {}", e);
                return InboundOutcome::Failed;
            }
        };

        if let Err(e) = self.append(&current, MessageRole::User, body).await {
            error!(followup_id = %current.id, "Failed to store inbound message: {}", e);
            return InboundOutcome::Failed;
        }

        let followup_id = current.id.clone();
        if !current.is_auto_mode {
            debug!(followup_id = %followup_id, "Auto mode off, not replying");
            return InboundOutcome::Stored { followup_id };
        }

        match self.reply(&current, &owner).await {
            Ok(_) => InboundOutcome::Replied { followup_id },
            Err(e) => {
                error!(followup_id = %followup_id, "Automatic reply failed: {}", e);
                InboundOutcome::ReplyFailed { followup_id }
            }
        }
    }
}
