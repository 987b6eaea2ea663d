//! Dashboard WebSocket: `{event, data}` frames in both directions.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use followup_engine::{EngineError, SessionStatus, Topic};
use futures::{SinkExt, StreamExt};
use relay_bridge::channels;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Frames queued per connection before events are dropped.
const OUTBOUND_CAPACITY: usize = 64;

pub const SUBSCRIBE: &str = "subscribe";
pub const UNSUBSCRIBE: &str = "unsubscribe";

#[derive(Debug, Deserialize)]
struct ClientFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scope {
    followup_id: Option<String>,
    company_id: Option<String>,
    /// Raw topic such as `followup:<id>`.
    topic: Option<String>,
}

impl Scope {
    fn from_data(data: Value) -> Self {
        serde_json::from_value(data).unwrap_or_default()
    }

    fn company(&self) -> Option<&str> {
        self.company_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    fn topics(&self) -> Vec<Topic> {
        let mut topics = Vec::new();
        if let Some(id) = self.followup_id.as_deref().filter(|id| !id.trim().is_empty()) {
            topics.push(Topic::Followup(id.trim().to_string()));
        }
        if let Some(id) = self.company() {
            topics.push(Topic::Company(id.to_string()));
        }
        if let Some(topic) = self.topic.as_deref().and_then(Topic::parse) {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "Dashboard connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
    state.hub.add(&conn_id, tx).await;

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if ws_tx.send(Message::Text(frame)).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(conn_id = %conn_id, "WebSocket error: {}", e);
                break;
            }
        };

        handle_frame(&state, &conn_id, &text).await;
    }

    state.hub.remove(&conn_id).await;
    send_task.abort();
    info!(conn_id = %conn_id, "Dashboard disconnected");
}

async fn reply(state: &AppState, conn_id: &str, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    if !state.hub.send_to(conn_id, frame).await {
        debug!(conn_id = %conn_id, event, "Reply dropped");
    }
}

async fn reply_error(state: &AppState, conn_id: &str, message: &str) {
    reply(state, conn_id, channels::ERROR, json!({ "message": message })).await;
}

/// Client-caused errors are echoed; anything else gets `fallback`.
fn session_error(err: &EngineError, fallback: &str) -> String {
    match err {
        EngineError::Validation(_) | EngineError::NotFound { .. } => err.to_string(),
        _ => {
            error!("{}: {}", fallback, err);
            fallback.to_string()
        }
    }
}

async fn handle_frame(state: &AppState, conn_id: &str, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(conn_id = %conn_id, "Unparseable frame: {}", e);
            reply(state, conn_id, "error", json!({ "message": "Invalid frame" })).await;
            return;
        }
    };

    let scope = Scope::from_data(frame.data);

    match frame.event.as_str() {
        SUBSCRIBE | UNSUBSCRIBE => {
            let topics = scope.topics();
            if topics.is_empty() {
                reply(
                    state,
                    conn_id,
                    "error",
                    json!({ "message": "followupId, companyId or topic is required" }),
                )
                .await;
                return;
            }
            for topic in topics {
                if frame.event == SUBSCRIBE {
                    state.hub.subscribe(conn_id, topic).await;
                } else {
                    state.hub.unsubscribe(conn_id, &topic).await;
                }
            }
        }
        channels::CONNECT => match state.engine.request_connect(scope.company()).await {
            Ok(()) => {
                if let Some(company_id) = scope.company() {
                    state
                        .hub
                        .subscribe(conn_id, Topic::Company(company_id.to_string()))
                        .await;
                }
            }
            Err(e) => {
                let message = session_error(&e, "Failed to connect to WhatsApp");
                reply_error(state, conn_id, &message).await;
            }
        },
        channels::DISCONNECT => {
            if let Some(company_id) = scope.company() {
                match state.engine.disconnect(company_id).await {
                    Ok(_) | Err(EngineError::NotFound { .. }) => {}
                    Err(e) => {
                        error!("WhatsApp disconnect error: {}", e);
                        reply_error(state, conn_id, "Failed to disconnect from WhatsApp").await;
                        return;
                    }
                }
            }
            reply(
                state,
                conn_id,
                channels::STATUS,
                json!({ "status": SessionStatus::Disconnected }),
            )
            .await;
        }
        channels::GET_STATUS => {
            let Some(company_id) = scope.company() else {
                reply_error(state, conn_id, "Company ID is required").await;
                return;
            };
            match state.engine.session_status(company_id).await {
                Ok(status) => {
                    state
                        .hub
                        .subscribe(conn_id, Topic::Company(company_id.to_string()))
                        .await;
                    reply(state, conn_id, channels::STATUS, json!({ "status": status })).await;
                }
                Err(e) => {
                    let message = session_error(&e, "Failed to get WhatsApp status");
                    reply_error(state, conn_id, &message).await;
                }
            }
        }
        other => {
            debug!(conn_id = %conn_id, "Ignoring unknown event {}", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use database::{company, Database, NewCompany};
    use followup_engine::{EngineConfig, FollowupEngine};
    use mock_brain::EchoBrain;
    use relay_bridge::{MemoryBus, Relay};

    use super::*;
    use crate::identity::LocalIdentity;
    use crate::realtime::RealtimeHub;

    async fn setup() -> (AppState, Arc<MemoryBus>, mpsc::Receiver<String>, String) {
        let db = Database::in_memory().await.unwrap();
        let bus = Arc::new(MemoryBus::new());
        let hub = Arc::new(RealtimeHub::new());
        let engine = Arc::new(FollowupEngine::new(
            db.clone(),
            Arc::new(EchoBrain::new()),
            Relay::new(bus.clone()),
            hub.clone(),
            EngineConfig::default(),
        ));

        let created = company::create_company(
            db.pool(),
            &NewCompany {
                name: "Acme".to_string(),
                location: "Lisbon".to_string(),
                external_org_id: "org_acme".to_string(),
            },
        )
        .await
        .unwrap();

        let (tx, rx) = mpsc::channel(16);
        hub.add("conn", tx).await;

        let state = AppState::new(engine, hub, Arc::new(LocalIdentity));
        (state, bus, rx, created.id)
    }

    fn next(rx: &mut mpsc::Receiver<String>) -> Value {
        serde_json::from_str(&rx.try_recv().unwrap()).unwrap()
    }

    #[test]
    fn test_scope_topics() {
        let scope = Scope::from_data(json!({"followupId": "f1", "companyId": " c1 "}));
        assert_eq!(
            scope.topics(),
            vec![Topic::Followup("f1".to_string()), Topic::Company("c1".to_string())]
        );
        assert!(Scope::from_data(json!("nonsense")).topics().is_empty());

        let raw = Scope::from_data(json!({"topic": "company:c1", "companyId": "c1"}));
        assert_eq!(raw.topics(), vec![Topic::Company("c1".to_string())]);
    }

    #[tokio::test]
    async fn test_connect_publishes_and_subscribes() {
        let (state, bus, mut rx, company_id) = setup().await;

        let frame = json!({"event": channels::CONNECT, "data": {"companyId": company_id}});
        handle_frame(&state, "conn", &frame.to_string()).await;

        assert_eq!(bus.published_on(channels::CONNECT).len(), 1);
        assert!(rx.try_recv().is_err());

        let event = SessionStatus::Connected.event(&company_id);
        assert_eq!(state.hub.publish(&event).await, 1);
    }

    #[tokio::test]
    async fn test_connect_errors() {
        let (state, bus, mut rx, _) = setup().await;

        handle_frame(&state, "conn", &json!({"event": channels::CONNECT}).to_string()).await;
        let frame = next(&mut rx);
        assert_eq!(frame["event"], channels::ERROR);
        assert_eq!(frame["data"]["message"], "Company ID is required");

        let unknown = json!({"event": channels::CONNECT, "data": {"companyId": "ghost"}});
        handle_frame(&state, "conn", &unknown.to_string()).await;
        assert_eq!(next(&mut rx)["data"]["message"], "Company not found");

        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn test_get_status_and_disconnect() {
        let (state, _bus, mut rx, company_id) = setup().await;
        company::set_whatsapp_enabled(state.db.pool(), &company_id, true)
            .await
            .unwrap();

        let status = json!({"event": channels::GET_STATUS, "data": {"companyId": company_id}});
        handle_frame(&state, "conn", &status.to_string()).await;
        let frame = next(&mut rx);
        assert_eq!(frame["event"], channels::STATUS);
        assert_eq!(frame["data"]["status"], "connected");

        let disconnect = json!({"event": channels::DISCONNECT, "data": {"companyId": company_id}});
        handle_frame(&state, "conn", &disconnect.to_string()).await;
        assert_eq!(next(&mut rx)["data"]["status"], "disconnected");

        let stored = company::get_company(state.db.pool(), &company_id).await.unwrap();
        assert!(!stored.whatsapp_enabled);

        // Unknown companies still get a disconnected reply
        let ghost = json!({"event": channels::DISCONNECT, "data": {"companyId": "ghost"}});
        handle_frame(&state, "conn", &ghost.to_string()).await;
        assert_eq!(next(&mut rx)["data"]["status"], "disconnected");
    }

    #[tokio::test]
    async fn test_get_status_errors() {
        let (state, _bus, mut rx, _) = setup().await;

        handle_frame(&state, "conn", &json!({"event": channels::GET_STATUS}).to_string()).await;
        assert_eq!(next(&mut rx)["data"]["message"], "Company ID is required");

        let unknown = json!({"event": channels::GET_STATUS, "data": {"companyId": "ghost"}});
        handle_frame(&state, "conn", &unknown.to_string()).await;
        assert_eq!(next(&mut rx)["data"]["message"], "Company not found");
    }

    #[tokio::test]
    async fn test_subscribe_requires_scope() {
        let (state, _bus, mut rx, _) = setup().await;

        handle_frame(&state, "conn", &json!({"event": SUBSCRIBE}).to_string()).await;
        assert_eq!(next(&mut rx)["event"], "error");

        handle_frame(&state, "conn", "not json").await;
        assert_eq!(next(&mut rx)["data"]["message"], "Invalid frame");

        let sub = json!({"event": SUBSCRIBE, "data": {"followupId": "f1"}});
        handle_frame(&state, "conn", &sub.to_string()).await;
        assert_eq!(state.hub.topic_count().await, 1);

        let unsub = json!({"event": UNSUBSCRIBE, "data": {"followupId": "f1"}});
        handle_frame(&state, "conn", &unsub.to_string()).await;
        assert_eq!(state.hub.topic_count().await, 0);
    }
}
