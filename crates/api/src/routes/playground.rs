//! Playground: try an agent prompt without a followup.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use brain_core::{ChatTurn, Role};
use chrono::Utc;
use database::{agent, Agent};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::response::ApiResponse;
use crate::state::AppState;

/// One turn as the playground page sends and shows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaygroundMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaygroundChatRequest {
    pub messages: Option<Vec<PlaygroundMessage>>,
    #[serde(default)]
    pub agent_id: String,
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaygroundChatResponse {
    pub response: PlaygroundMessage,
    /// The caller's turns plus the reply; the system prompt is left out.
    pub conversation: Vec<PlaygroundMessage>,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PlaygroundChatRequest>, JsonRejection>,
) -> Result<ApiResponse<PlaygroundChatResponse>> {
    let Json(req) = payload?;
    let messages = req
        .messages
        .ok_or_else(|| ApiError::BadRequest("Messages array is required".to_string()))?;

    let turns = messages
        .iter()
        .map(|m| ChatTurn {
            role: m.role,
            content: m.content.clone(),
        })
        .collect();

    let reply = state
        .engine
        .playground_reply(&req.agent_id, req.context.as_deref(), turns)
        .await?;

    let response = PlaygroundMessage {
        role: Role::Assistant,
        content: reply,
        timestamp: Some(Utc::now().to_rfc3339()),
    };
    let mut conversation = messages;
    conversation.push(response.clone());

    Ok(ApiResponse::ok(
        "AI response generated successfully",
        PlaygroundChatResponse {
            response,
            conversation,
        },
    ))
}

/// Agents that can be picked in the playground.
pub async fn list_agents(State(state): State<AppState>) -> Result<ApiResponse<Vec<Agent>>> {
    let agents = agent::list_active_agents(state.db.pool()).await?;
    Ok(ApiResponse::ok("Agents fetched successfully", agents))
}
