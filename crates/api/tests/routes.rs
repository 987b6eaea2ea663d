use std::sync::Arc;

use api::{app, AppState, LocalIdentity, RealtimeHub};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use database::Database;
use followup_engine::{EngineConfig, FollowupEngine, Topic};
use mock_brain::ScriptedBrain;
use relay_bridge::{channels, MemoryBus, Relay, SendMessage};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    bus: Arc<MemoryBus>,
    hub: Arc<RealtimeHub>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_brain(Arc::new(ScriptedBrain::new())).await
    }

    async fn with_brain(brain: Arc<ScriptedBrain>) -> Self {
        let db = Database::in_memory().await.unwrap();
        let bus = Arc::new(MemoryBus::new());
        let hub = Arc::new(RealtimeHub::new());

        let engine = Arc::new(FollowupEngine::new(
            db,
            brain,
            Relay::new(bus.clone()),
            hub.clone(),
            EngineConfig::default(),
        ));

        let state = AppState::new(engine, hub.clone(), Arc::new(LocalIdentity));
        Self {
            router: app(state, None),
            bus,
            hub,
        }
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 100_000)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn sent(&self) -> Vec<SendMessage> {
        self.bus
            .published_on(channels::SEND_MESSAGE)
            .into_iter()
            .map(|m| serde_json::from_str(&m.payload).unwrap())
            .collect()
    }

    /// Company, client and agent ids.
    async fn seed(&self) -> (String, String, String) {
        let (status, company) = self
            .call(
                "POST",
                "/api/company/create",
                Some(json!({"name": "Acme Staffing", "location": "Lisbon"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let company_id = company["data"]["id"].as_str().unwrap().to_string();

        let (status, client) = self
            .call(
                "POST",
                &format!("/api/company/{}/clients", company_id),
                Some(json!({"name": "Amir", "countryCode": "+1", "phone": "5550100"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let client_id = client["data"]["id"].as_str().unwrap().to_string();

        let (status, agent) = self
            .call(
                "POST",
                "/api/agent",
                Some(json!({"name": "Shift Confirmer", "systemPrompt": "Goal: {context}"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let agent_id = agent["data"]["id"].as_str().unwrap().to_string();

        (company_id, client_id, agent_id)
    }

    async fn create_followup(&self, company_id: &str, client_id: &str, agent_id: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                &format!("/api/company/{}/followups", company_id),
                Some(json!({
                    "clientId": client_id,
                    "agentId": agent_id,
                    "followupDateTime": "2025-06-26T11:24:00Z",
                    "context": "confirm tomorrow's shift",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["isAutoMode"], false);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Server is running");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_company_provisions_organisation() {
    let app = TestApp::new().await;
    let (company_id, _, agent_id) = app.seed().await;

    let (status, body) = app.call("GET", &format!("/api/company/{}", company_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let org = body["data"]["externalOrgId"].as_str().unwrap().to_string();
    assert!(org.starts_with("org_"));
    assert_eq!(body["data"]["agents"], json!([]));

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/company/{}", company_id),
            Some(json!({"name": "Acme", "location": "Porto", "agents": [agent_id]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"], "Porto");
    assert_eq!(body["data"]["agents"][0]["name"], "Shift Confirmer");

    let (status, body) = app.call("GET", &format!("/api/company/org/{}", org), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], company_id.as_str());
}

#[tokio::test]
async fn test_company_requires_location() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call("POST", "/api/company/create", Some(json!({"name": "Acme"})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "location is required");
    assert_eq!(body["error"], "Bad Request");
}

#[tokio::test]
async fn test_missing_json_body_is_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app.call("POST", "/api/agent", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_client_validation() {
    let app = TestApp::new().await;
    let (company_id, _, _) = app.seed().await;

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/company/{}/clients", company_id),
            Some(json!({"name": "Dana", "countryCode": "+351", "phone": "555-0100"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .call("GET", &format!("/api/company/{}/clients", company_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "active");
}

#[tokio::test]
async fn test_clients_of_unknown_company() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/api/company/ghost/clients", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Company not found");
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn test_duplicate_agent_name() {
    let app = TestApp::new().await;
    app.seed().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/agent",
            Some(json!({"name": "Shift Confirmer", "systemPrompt": "again"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_followup_conversation_flow() {
    let app = TestApp::new().await;
    let (company_id, client_id, agent_id) = app.seed().await;
    let followup_id = app.create_followup(&company_id, &client_id, &agent_id).await;
    let base = format!("/api/company/{}/followups/{}", company_id, followup_id);

    // Dashboard watching the company
    let (tx, mut rx) = mpsc::channel(16);
    app.hub.add("dash", tx).await;
    app.hub.subscribe("dash", Topic::Company(company_id.clone())).await;

    // System turn is hidden
    let (_, body) = app.call("GET", &format!("{}/messages", base), None).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = app.call("POST", &format!("{}/start-conversation", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");

    let sent = app.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "15550100@c.us");
    assert_eq!(sent[0].message, "Hello Amir, How are you today?");

    let frame: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
    assert_eq!(frame["event"], "whatsapp-message");
    assert_eq!(frame["data"]["followupId"], followup_id.as_str());

    // Starting twice is a client error
    let (status, body) = app.call("POST", &format!("{}/start-conversation", base), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .call("POST", &format!("{}/messages", base), Some(json!({"message": "See you at 9"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "assistant");
    let operator_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.sent().len(), 2);

    let (status, body) = app
        .call(
            "PUT",
            &format!("{}/messages/read", base),
            Some(json!({"messageIds": [operator_id]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = app.call("GET", &format!("{}/messages", base), None).await;
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["isRead"], true);

    let (status, body) = app
        .call("POST", &format!("{}/complete-conversation", base), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = app
        .call("POST", &format!("{}/restart-conversation", base), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");

    let (_, body) = app.call("GET", &format!("{}/messages", base), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_followup_envelope() {
    let app = TestApp::new().await;
    let (company_id, _, _) = app.seed().await;

    let (status, body) = app
        .call(
            "POST",
            &format!("/api/company/{}/followups/ghost/start-conversation", company_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Followup not found", "error": "Not Found"})
    );
}

#[tokio::test]
async fn test_followup_hidden_from_other_company() {
    let app = TestApp::new().await;
    let (company_id, client_id, agent_id) = app.seed().await;
    let followup_id = app.create_followup(&company_id, &client_id, &agent_id).await;

    let (_, other) = app
        .call(
            "POST",
            "/api/company/create",
            Some(json!({"name": "Other", "location": "Berlin"})),
        )
        .await;
    let other_id = other["data"]["id"].as_str().unwrap();

    let (status, _) = app
        .call("GET", &format!("/api/company/{}/followups/{}", other_id, followup_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            "DELETE",
            &format!("/api/company/{}/followups/{}", other_id, followup_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn test_followup_update_and_list() {
    let app = TestApp::new().await;
    let (company_id, client_id, agent_id) = app.seed().await;
    let followup_id = app.create_followup(&company_id, &client_id, &agent_id).await;

    let (status, body) = app
        .call(
            "PUT",
            &format!("/api/company/{}/followups/{}", company_id, followup_id),
            Some(json!({"isAutoMode": true, "followupDateTime": "2025-07-01T09:00"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isAutoMode"], true);
    assert_eq!(body["data"]["status"], "pending");

    let (status, body) = app
        .call("GET", &format!("/api/company/{}/followups", company_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["clientName"], "Amir");
    assert_eq!(body["data"][0]["agentName"], "Shift Confirmer");
}

#[tokio::test]
async fn test_knowledge_crud() {
    let app = TestApp::new().await;
    let (company_id, _, _) = app.seed().await;
    let base = format!("/api/company/{}/knowledge", company_id);

    let (status, _) = app.call("POST", &base, Some(json!({"title": "Hours"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call("POST", &base, Some(json!({"title": "Hours", "content": "9 to 5"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call("PUT", &format!("{}/{}", base, id), Some(json!({"content": "10 to 6"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Hours");
    assert_eq!(body["data"]["content"], "10 to 6");

    let (status, _) = app.call("DELETE", &format!("{}/{}", base, id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("GET", &format!("{}/{}", base, id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_users_reject_duplicate_email() {
    let app = TestApp::new().await;
    let (company_id, _, _) = app.seed().await;
    let uri = format!("/api/company/{}/users", company_id);
    let user = json!({
        "email": "dana@acme.com",
        "password": "s3cret-pass",
        "firstName": "Dana",
        "lastName": "Silva",
    });

    let (status, body) = app.call("POST", &uri, Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["externalUserId"]
        .as_str()
        .unwrap()
        .starts_with("user_"));
    assert!(body["data"].get("password").is_none());

    let (status, body) = app.call("POST", &uri, Some(user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this email already exists");

    let (_, body) = app.call("GET", &uri, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_playground_requires_messages() {
    let app = TestApp::new().await;
    let (_, _, agent_id) = app.seed().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/playground/chat",
            Some(json!({"agentId": agent_id, "context": "confirm shift"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Messages array is required");
}

#[tokio::test]
async fn test_playground_unknown_agent() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/playground/chat",
            Some(json!({
                "agentId": "ghost",
                "messages": [{"role": "user", "content": "hi"}],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Agent not found");
}

#[tokio::test]
async fn test_playground_chat() {
    let brain = Arc::new(ScriptedBrain::with_replies(["See you at 9 then."]));
    let app = TestApp::with_brain(brain.clone()).await;
    let (_, _, agent_id) = app.seed().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/playground/chat",
            Some(json!({
                "agentId": agent_id,
                "context": "confirm tomorrow's shift",
                "messages": [
                    {"role": "assistant", "content": "Hello Amir, How are you today?"},
                    {"role": "user", "content": "Fine, what time?"},
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "AI response generated successfully");
    assert_eq!(body["data"]["response"]["role"], "assistant");
    assert_eq!(body["data"]["response"]["content"], "See you at 9 then.");
    assert!(body["data"]["response"]["timestamp"].is_string());

    let conversation = body["data"]["conversation"].as_array().unwrap();
    assert_eq!(conversation.len(), 3);
    assert_eq!(conversation[0]["role"], "assistant");
    assert_eq!(conversation[2]["content"], "See you at 9 then.");

    // The brain got the rendered agent prompt first.
    let calls = brain.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 3);
    assert!(calls[0][0].is_system());
    assert_eq!(calls[0][0].content, "Goal: confirm tomorrow's shift");
    assert_eq!(calls[0][2].content, "Fine, what time?");

    // Nothing goes out to WhatsApp.
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn test_playground_lists_active_agents() {
    let app = TestApp::new().await;
    let (_, _, agent_id) = app.seed().await;

    let (status, other) = app
        .call(
            "POST",
            "/api/agent",
            Some(json!({"name": "Retired", "systemPrompt": "Old prompt"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let retired_id = other["data"]["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .call(
            "PUT",
            &format!("/api/agent/{}", retired_id),
            Some(json!({"isActive": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("GET", "/api/playground/agents", None).await;
    assert_eq!(status, StatusCode::OK);
    let agents = body["data"].as_array().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["id"], agent_id.as_str());
}
