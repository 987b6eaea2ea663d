//! Scripted brain implementation - replays queued replies and records calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use brain_core::{async_trait, Brain, BrainError, ChatTurn};

/// A brain that answers from a queue of prepared results.
///
/// Every call records the turns it was given, so tests can assert exactly
/// what reached the brain. Once the queue is empty the brain fails with
/// [`BrainError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatTurn>>>,
}

impl ScriptedBrain {
    /// Create a brain with no prepared replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a brain that returns `replies` in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let brain = Self::new();
        for reply in replies {
            brain.push_reply(reply);
        }
        brain
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
    }

    /// Queue a failure, surfaced as [`BrainError::ProcessingFailed`].
    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(message.into()));
        }
    }

    /// Transcripts received so far, oldest call first.
    pub fn calls(&self) -> Vec<Vec<ChatTurn>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of times `generate` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn generate(&self, turns: Vec<ChatTurn>) -> Result<String, BrainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(turns);
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| BrainError::Unavailable("script lock poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(BrainError::ProcessingFailed(message)),
            None => Err(BrainError::Unavailable("no scripted reply left".to_string())),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
