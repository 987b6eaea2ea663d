//! Realtime notification seam.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use database::FollowupMessage;
use serde_json::{json, Value};

/// Event name for new transcript entries.
pub const TRANSCRIPT_EVENT: &str = "whatsapp-message";

/// A subscription scope for realtime events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Followup(String),
    Company(String),
}

impl Topic {
    /// Parse the `followup:<id>` / `company:<id>` form.
    pub fn parse(s: &str) -> Option<Self> {
        let (kind, id) = s.split_once(':')?;
        if id.is_empty() {
            return None;
        }
        match kind {
            "followup" => Some(Topic::Followup(id.to_string())),
            "company" => Some(Topic::Company(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Followup(id) => write!(f, "followup:{}", id),
            Topic::Company(id) => write!(f, "company:{}", id),
        }
    }
}

/// An event pushed to dashboard connections subscribed to any of `topics`.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeEvent {
    pub name: String,
    pub payload: Value,
    pub topics: Vec<Topic>,
}

impl RealtimeEvent {
    /// A new transcript entry, scoped to the followup and its company.
    pub fn transcript(company_id: &str, message: &FollowupMessage) -> Self {
        Self {
            name: TRANSCRIPT_EVENT.to_string(),
            payload: json!({
                "followupId": message.followup_id,
                "message": message,
                "type": message.role,
            }),
            topics: vec![
                Topic::Followup(message.followup_id.clone()),
                Topic::Company(company_id.to_string()),
            ],
        }
    }

    /// A company-scoped event (session lifecycle).
    pub fn company(company_id: &str, name: &str, payload: Value) -> Self {
        Self {
            name: name.to_string(),
            payload,
            topics: vec![Topic::Company(company_id.to_string())],
        }
    }

    /// The `{event, data}` frame sent over the wire.
    pub fn frame(&self) -> Value {
        json!({ "event": self.name, "data": self.payload })
    }
}

/// Pushes events to connected dashboards.
///
/// Delivery is best-effort; implementations must not block on slow
/// receivers and never fail the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: RealtimeEvent);
}

/// A notifier that logs every event.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, event: RealtimeEvent) {
        let topics: Vec<String> = event.topics.iter().map(|t| t.to_string()).collect();
        tracing::info!("[notify] {} -> {}", event.name, topics.join(", "));
    }
}

/// A notifier that keeps every event, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<RealtimeEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RealtimeEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events with the given name.
    pub fn named(&self, name: &str) -> Vec<RealtimeEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: RealtimeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
