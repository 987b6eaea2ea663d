//! Followup routes: CRUD, lifecycle actions and the transcript.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::{
    company, followup, followup_message, Followup, FollowupMessage, FollowupOverview,
    FollowupUpdate,
};
use followup_engine::CreateFollowup;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFollowupRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default, rename = "followupDateTime")]
    pub followup_datetime: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub is_auto_mode: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFollowupRequest {
    pub client_id: Option<String>,
    pub agent_id: Option<String>,
    #[serde(rename = "followupDateTime")]
    pub followup_datetime: Option<String>,
    pub context: Option<String>,
    pub is_auto_mode: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct OperatorMessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    #[serde(default)]
    pub message_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResult {
    pub updated: u64,
}

pub async fn list_followups(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<FollowupOverview>>> {
    company::get_company(state.db.pool(), &company_id).await?;
    let followups = followup::list_overviews(state.db.pool(), &company_id).await?;
    Ok(ApiResponse::ok("Followups fetched successfully", followups))
}

pub async fn create_followup(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    payload: std::result::Result<Json<CreateFollowupRequest>, JsonRejection>,
) -> Result<ApiResponse<Followup>> {
    let Json(req) = payload?;

    let created = state
        .engine
        .create_followup(
            &company_id,
            CreateFollowup {
                client_id: req.client_id,
                agent_id: req.agent_id,
                followup_datetime: req.followup_datetime,
                context: req.context,
                is_auto_mode: req.is_auto_mode,
            },
        )
        .await?;

    Ok(ApiResponse::created("Followup created successfully", created))
}

pub async fn get_followup(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
) -> Result<ApiResponse<Followup>> {
    let found = state.engine.followup_for_company(&company_id, &followup_id).await?;
    Ok(ApiResponse::ok("Followup fetched successfully", found))
}

/// Edit a followup. The status cannot be set here.
pub async fn update_followup(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
    payload: std::result::Result<Json<UpdateFollowupRequest>, JsonRejection>,
) -> Result<ApiResponse<Followup>> {
    let Json(req) = payload?;

    let update = FollowupUpdate {
        client_id: req.client_id,
        agent_id: req.agent_id,
        followup_datetime: req.followup_datetime,
        context: req.context,
        is_auto_mode: req.is_auto_mode,
    };
    let updated = state
        .engine
        .update_followup(&company_id, &followup_id, update)
        .await?;

    Ok(ApiResponse::ok("Followup updated successfully", updated))
}

pub async fn delete_followup(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
) -> Result<ApiResponse<()>> {
    state.engine.delete_followup(&company_id, &followup_id).await?;
    Ok(ApiResponse::done("Followup deleted successfully"))
}

pub async fn start_conversation(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
) -> Result<ApiResponse<Followup>> {
    state.engine.followup_for_company(&company_id, &followup_id).await?;
    let started = state.engine.start(&followup_id).await?;
    Ok(ApiResponse::ok("Conversation started successfully", started))
}

pub async fn restart_conversation(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
) -> Result<ApiResponse<Followup>> {
    state.engine.followup_for_company(&company_id, &followup_id).await?;
    let restarted = state.engine.restart(&followup_id).await?;
    Ok(ApiResponse::ok("Conversation restarted successfully", restarted))
}

pub async fn complete_conversation(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
) -> Result<ApiResponse<Followup>> {
    state.engine.followup_for_company(&company_id, &followup_id).await?;
    let completed = state.engine.complete(&followup_id).await?;
    Ok(ApiResponse::ok("Conversation completed successfully", completed))
}

/// Transcript without the system turn.
pub async fn list_messages(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
) -> Result<ApiResponse<Vec<FollowupMessage>>> {
    state.engine.followup_for_company(&company_id, &followup_id).await?;
    let messages = followup_message::list_visible_messages(state.db.pool(), &followup_id).await?;
    Ok(ApiResponse::ok("Messages fetched successfully", messages))
}

/// Send an operator-written message to the client.
pub async fn send_message(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
    payload: std::result::Result<Json<OperatorMessageRequest>, JsonRejection>,
) -> Result<ApiResponse<FollowupMessage>> {
    let Json(req) = payload?;
    let sent = state
        .engine
        .send_operator_message(&company_id, &followup_id, &req.message)
        .await?;
    Ok(ApiResponse::created("Message sent successfully", sent))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path((company_id, followup_id)): Path<(String, String)>,
    payload: std::result::Result<Json<MarkReadRequest>, JsonRejection>,
) -> Result<ApiResponse<MarkReadResult>> {
    let Json(req) = payload?;
    state.engine.followup_for_company(&company_id, &followup_id).await?;

    let updated =
        followup_message::mark_read(state.db.pool(), &followup_id, &req.message_ids).await?;
    Ok(ApiResponse::ok("Messages marked as read", MarkReadResult { updated }))
}
