//! Knowledge base routes. Entries are stored as given.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::validation::validate_required;
use database::{company, knowledge, Knowledge};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::response::ApiResponse;
use crate::state::AppState;

const MAX_TITLE_LENGTH: usize = 256;

#[derive(Debug, Deserialize)]
pub struct KnowledgeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

async fn knowledge_for_company(
    state: &AppState,
    company_id: &str,
    knowledge_id: &str,
) -> Result<Knowledge> {
    let found = knowledge::get_knowledge(state.db.pool(), knowledge_id).await?;
    if found.company_id != company_id {
        return Err(ApiError::NotFound("Knowledge not found".to_string()));
    }
    Ok(found)
}

pub async fn list_knowledge(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<Knowledge>>> {
    company::get_company(state.db.pool(), &company_id).await?;
    let entries = knowledge::list_knowledge(state.db.pool(), &company_id).await?;
    Ok(ApiResponse::ok("Knowledge fetched successfully", entries))
}

pub async fn create_knowledge(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    payload: std::result::Result<Json<KnowledgeRequest>, JsonRejection>,
) -> Result<ApiResponse<Knowledge>> {
    let Json(req) = payload?;
    let title = req.title.unwrap_or_default();
    let content = req.content.unwrap_or_default();
    validate_required("title", &title, MAX_TITLE_LENGTH)?;
    validate_required("content", &content, usize::MAX)?;

    company::get_company(state.db.pool(), &company_id).await?;
    let created =
        knowledge::create_knowledge(state.db.pool(), &company_id, title.trim(), &content).await?;
    Ok(ApiResponse::created("Knowledge created successfully", created))
}

pub async fn get_knowledge(
    State(state): State<AppState>,
    Path((company_id, knowledge_id)): Path<(String, String)>,
) -> Result<ApiResponse<Knowledge>> {
    let found = knowledge_for_company(&state, &company_id, &knowledge_id).await?;
    Ok(ApiResponse::ok("Knowledge fetched successfully", found))
}

/// Partial update; a supplied title or content must not be blank.
pub async fn update_knowledge(
    State(state): State<AppState>,
    Path((company_id, knowledge_id)): Path<(String, String)>,
    payload: std::result::Result<Json<KnowledgeRequest>, JsonRejection>,
) -> Result<ApiResponse<Knowledge>> {
    let Json(req) = payload?;
    if let Some(title) = &req.title {
        validate_required("title", title, MAX_TITLE_LENGTH)?;
    }
    if let Some(content) = &req.content {
        validate_required("content", content, usize::MAX)?;
    }

    knowledge_for_company(&state, &company_id, &knowledge_id).await?;
    let updated = knowledge::update_knowledge(
        state.db.pool(),
        &knowledge_id,
        req.title.as_deref().map(str::trim),
        req.content.as_deref(),
    )
    .await?;
    Ok(ApiResponse::ok("Knowledge updated successfully", updated))
}

pub async fn delete_knowledge(
    State(state): State<AppState>,
    Path((company_id, knowledge_id)): Path<(String, String)>,
) -> Result<ApiResponse<()>> {
    knowledge_for_company(&state, &company_id, &knowledge_id).await?;
    knowledge::delete_knowledge(state.db.pool(), &knowledge_id).await?;
    Ok(ApiResponse::done("Knowledge deleted successfully"))
}
