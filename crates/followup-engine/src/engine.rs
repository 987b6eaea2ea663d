//! The engine handle shared by every followup operation.

use std::sync::Arc;

use brain_core::Brain;
use database::{
    followup, followup_message, Client, Database, Followup, FollowupMessage, MessageRole,
    NewFollowupMessage,
};
use relay_bridge::{Relay, RelayAddress};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::locks::KeyedLocks;
use crate::notifier::{Notifier, RealtimeEvent};

/// Drives followups through their lifecycle.
///
/// Every mutating operation on a followup holds that followup's lock, so
/// transcript appends and status changes for one followup never
/// interleave. Operations on different followups run concurrently.
pub struct FollowupEngine {
    pub(crate) db: Database,
    pub(crate) brain: Arc<dyn Brain>,
    pub(crate) relay: Relay,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) locks: KeyedLocks,
    pub(crate) config: EngineConfig,
}

impl FollowupEngine {
    pub fn new(
        db: Database,
        brain: Arc<dyn Brain>,
        relay: Relay,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        tracing::info!(
            "Followup engine using brain {} (context window: {:?}, reply timeout: {:?})",
            brain.name(),
            config.context_window.max_turns,
            config.reply_timeout
        );

        Self {
            db,
            brain,
            relay,
            notifier,
            locks: KeyedLocks::new(),
            config,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load a followup, treating one owned by another company as missing.
    pub async fn followup_for_company(
        &self,
        company_id: &str,
        followup_id: &str,
    ) -> Result<Followup> {
        let followup = followup::get_followup(self.db.pool(), followup_id).await?;
        if followup.company_id != company_id {
            return Err(EngineError::NotFound {
                entity: "Followup",
                id: followup_id.to_string(),
            });
        }
        Ok(followup)
    }

    /// Push an event to dashboards.
    pub async fn notify(&self, event: RealtimeEvent) {
        self.notifier.notify(event).await;
    }

    /// Persist a transcript entry and push it to dashboards.
    pub(crate) async fn append(
        &self,
        followup: &Followup,
        role: MessageRole,
        content: &str,
    ) -> Result<FollowupMessage> {
        let message = followup_message::insert_message(
            self.db.pool(),
            &NewFollowupMessage {
                followup_id: followup.id.clone(),
                client_id: followup.client_id.clone(),
                role,
                content: content.to_string(),
            },
        )
        .await?;

        debug!(followup_id = %followup.id, role = %role, "Appended transcript entry");

        self.notify(RealtimeEvent::transcript(&followup.company_id, &message))
            .await;

        Ok(message)
    }

    /// Persist an assistant message, push it to dashboards and relay it to
    /// the client's phone.
    ///
    /// A failed publish is logged; the message stays in the transcript.
    pub(crate) async fn deliver_assistant(
        &self,
        followup: &Followup,
        client: &Client,
        content: &str,
    ) -> Result<FollowupMessage> {
        let message = self.append(followup, MessageRole::Assistant, content).await?;

        let to = RelayAddress::for_client(&client.country_code, &client.phone);
        if let Err(e) = self
            .relay
            .send_text(&followup.company_id, &to, content)
            .await
        {
            warn!(followup_id = %followup.id, "Failed to relay message to {}: {}", to, e);
        }

        Ok(message)
    }
}
