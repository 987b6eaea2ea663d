//! Topic-scoped fan-out to connected dashboards.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use followup_engine::{Notifier, RealtimeEvent, Topic};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

#[derive(Default)]
struct HubState {
    /// Outgoing frame queue per connection.
    connections: HashMap<String, mpsc::Sender<String>>,
    /// Subscribed connection ids per topic.
    topics: HashMap<Topic, HashSet<String>>,
}

/// Routes realtime events to the connections subscribed to their topics.
///
/// Sends never block: a connection whose queue is full misses the event.
#[derive(Default)]
pub struct RealtimeHub {
    state: RwLock<HubState>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and its frame queue.
    pub async fn add(&self, connection_id: &str, sender: mpsc::Sender<String>) {
        let mut state = self.state.write().await;
        state.connections.insert(connection_id.to_string(), sender);
    }

    /// Drop a connection and all of its subscriptions.
    pub async fn remove(&self, connection_id: &str) {
        let mut state = self.state.write().await;
        state.connections.remove(connection_id);
        state.topics.retain(|_, subscribers| {
            subscribers.remove(connection_id);
            !subscribers.is_empty()
        });
    }

    pub async fn subscribe(&self, connection_id: &str, topic: Topic) {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(connection_id) {
            return;
        }
        debug!(conn_id = connection_id, topic = %topic, "subscribed");
        state
            .topics
            .entry(topic)
            .or_default()
            .insert(connection_id.to_string());
    }

    pub async fn unsubscribe(&self, connection_id: &str, topic: &Topic) {
        let mut state = self.state.write().await;
        if let Some(subscribers) = state.topics.get_mut(topic) {
            subscribers.remove(connection_id);
            if subscribers.is_empty() {
                state.topics.remove(topic);
            }
        }
    }

    /// Send a frame to one connection.
    pub async fn send_to(&self, connection_id: &str, frame: String) -> bool {
        let state = self.state.read().await;
        match state.connections.get(connection_id) {
            Some(sender) => sender.try_send(frame).is_ok(),
            None => false,
        }
    }

    /// Deliver an event once to every connection subscribed to any of its
    /// topics. Returns the number of connections reached.
    pub async fn publish(&self, event: &RealtimeEvent) -> usize {
        let frame = match serde_json::to_string(&event.frame()) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(event = %event.name, error = %e, "failed to serialize event");
                return 0;
            }
        };

        let state = self.state.read().await;
        let recipients: HashSet<&String> = event
            .topics
            .iter()
            .filter_map(|topic| state.topics.get(topic))
            .flatten()
            .collect();

        let mut delivered = 0;
        for conn_id in recipients {
            let Some(sender) = state.connections.get(conn_id) else {
                continue;
            };
            if sender.try_send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                warn!(conn_id = %conn_id, event = %event.name, "failed to send event to client");
            }
        }

        debug!(event = %event.name, recipients = delivered, "broadcast event");
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    pub async fn topic_count(&self) -> usize {
        self.state.read().await.topics.len()
    }
}

#[async_trait]
impl Notifier for RealtimeHub {
    async fn notify(&self, event: RealtimeEvent) {
        self.publish(&event).await;
    }
}
