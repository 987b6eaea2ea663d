//! Conversation orchestration: transcript in, next assistant message out.

use brain_core::ChatTurn;
use database::{agent, followup_message, Client, Followup, FollowupMessage, MessageRole};
use tracing::debug;

use crate::engine::FollowupEngine;
use crate::error::{EngineError, Result};
use crate::prompt::render_playground_prompt;

fn to_turn(message: FollowupMessage) -> ChatTurn {
    match message.role {
        MessageRole::System => ChatTurn::system(message.content),
        MessageRole::User => ChatTurn::user(message.content),
        MessageRole::Assistant => ChatTurn::assistant(message.content),
    }
}

impl FollowupEngine {
    /// Ask the brain for the next assistant message of a followup.
    ///
    /// The stored transcript, trimmed by the configured context window, is
    /// sent in insertion order. Nothing is persisted; a call exceeding the
    /// reply timeout fails with `Upstream`.
    pub async fn generate_next_message(&self, followup_id: &str) -> Result<String> {
        let transcript = followup_message::list_messages(self.db.pool(), followup_id).await?;
        let turns = self
            .config
            .context_window
            .apply(transcript.into_iter().map(to_turn).collect());

        debug!(
            followup_id = %followup_id,
            "Generating reply from {} turns with {}",
            turns.len(),
            self.brain.name()
        );

        self.ask_brain(turns).await
    }

    /// One playground exchange: the agent prompt goes first, then the
    /// caller's turns. Nothing is stored or relayed.
    pub async fn playground_reply(
        &self,
        agent_id: &str,
        context: Option<&str>,
        turns: Vec<ChatTurn>,
    ) -> Result<String> {
        let agent = agent::get_agent(self.db.pool(), agent_id).await?;

        let mut prompt = Vec::with_capacity(turns.len() + 1);
        prompt.push(ChatTurn::system(render_playground_prompt(&agent, context)));
        prompt.extend(turns);

        debug!(agent_id = %agent_id, "Playground reply from {} turns", prompt.len());
        self.ask_brain(prompt).await
    }

    /// Call the brain under the reply timeout. Empty replies are errors.
    async fn ask_brain(&self, turns: Vec<ChatTurn>) -> Result<String> {
        let reply = tokio::time::timeout(self.config.reply_timeout, self.brain.generate(turns))
            .await
            .map_err(|_| {
                EngineError::Upstream(format!(
                    "no reply within {}s",
                    self.config.reply_timeout.as_secs_f32()
                ))
            })??;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(EngineError::Upstream("brain returned an empty reply".to_string()));
        }

        Ok(reply.to_string())
    }

    /// Generate and deliver the next assistant message. Caller holds the lock.
    pub(crate) async fn reply(
        &self,
        followup: &Followup,
        client: &Client,
    ) -> Result<FollowupMessage> {
        let content = self.generate_next_message(&followup.id).await?;
        self.deliver_assistant(followup, client, &content).await
    }
}
