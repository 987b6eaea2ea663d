//! Agent routes. Agents are shared across companies.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::validation::{validate_required, MAX_NAME_LENGTH};
use database::{agent, Agent, AgentUpdate, NewAgent};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_agents(State(state): State<AppState>) -> Result<ApiResponse<Vec<Agent>>> {
    let agents = agent::list_agents(state.db.pool()).await?;
    Ok(ApiResponse::ok("Agents fetched successfully", agents))
}

/// Create an agent. Names are unique.
pub async fn create_agent(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateAgentRequest>, JsonRejection>,
) -> Result<ApiResponse<Agent>> {
    let Json(req) = payload?;
    validate_required("name", &req.name, MAX_NAME_LENGTH)?;
    validate_required("systemPrompt", &req.system_prompt, usize::MAX)?;

    let created = agent::create_agent(
        state.db.pool(),
        &NewAgent {
            name: req.name.trim().to_string(),
            system_prompt: req.system_prompt,
            description: req.description,
            created_by: req.created_by,
        },
    )
    .await?;

    info!(agent_id = %created.id, "Created agent {}", created.name);
    Ok(ApiResponse::created("Agent created successfully", created))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<ApiResponse<Agent>> {
    let found = agent::get_agent(state.db.pool(), &agent_id).await?;
    Ok(ApiResponse::ok("Agent fetched successfully", found))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    payload: std::result::Result<Json<UpdateAgentRequest>, JsonRejection>,
) -> Result<ApiResponse<Agent>> {
    let Json(req) = payload?;
    if let Some(name) = &req.name {
        validate_required("name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(prompt) = &req.system_prompt {
        validate_required("systemPrompt", prompt, usize::MAX)?;
    }

    let update = AgentUpdate {
        name: req.name.map(|n| n.trim().to_string()),
        system_prompt: req.system_prompt,
        description: req.description,
        is_active: req.is_active,
    };
    let updated = agent::update_agent(state.db.pool(), &agent_id, &update).await?;

    info!(agent_id = %agent_id, "Updated agent");
    Ok(ApiResponse::ok("Agent updated successfully", updated))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<ApiResponse<()>> {
    agent::delete_agent(state.db.pool(), &agent_id).await?;
    info!(agent_id = %agent_id, "Deleted agent");
    Ok(ApiResponse::done("Agent deleted successfully"))
}
