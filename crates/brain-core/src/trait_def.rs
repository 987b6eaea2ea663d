//! The Brain trait definition.

use async_trait::async_trait;

use crate::error::BrainError;
use crate::turn::ChatTurn;

/// Reply generator for followup conversations.
///
/// Given the ordered transcript of a conversation, produce the content of
/// the next assistant turn. Implementations range from canned test doubles
/// to hosted language models. The trait is object-safe and is normally held
/// as `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Generate the next assistant message.
    ///
    /// # Arguments
    ///
    /// * `turns` - The conversation so far, oldest first. A leading
    ///   [`Role::System`](crate::Role::System) turn carries the agent prompt.
    async fn generate(&self, turns: Vec<ChatTurn>) -> Result<String, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to generate replies.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
