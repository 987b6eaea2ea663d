//! Client routes, scoped to a company.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::validation::{
    validate_country_code, validate_phone, validate_required, MAX_NAME_LENGTH,
};
use database::{client, company, Client, NewClient};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_STATUS: &str = "active";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub phone: String,
    pub status: Option<String>,
}

impl ClientRequest {
    fn into_new_client(self, company_id: &str) -> Result<NewClient> {
        validate_required("name", &self.name, MAX_NAME_LENGTH)?;
        validate_country_code(&self.country_code)?;
        validate_phone(&self.phone)?;

        let status = self
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        Ok(NewClient {
            company_id: company_id.to_string(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            country_code: self.country_code.trim().to_string(),
            status,
        })
    }
}

/// Fetch a client, treating one owned by another company as missing.
async fn client_for_company(state: &AppState, company_id: &str, client_id: &str) -> Result<Client> {
    let found = client::get_client(state.db.pool(), client_id).await?;
    if found.company_id != company_id {
        return Err(ApiError::NotFound("Client not found".to_string()));
    }
    Ok(found)
}

pub async fn list_clients(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<Client>>> {
    company::get_company(state.db.pool(), &company_id).await?;
    let clients = client::list_clients(state.db.pool(), &company_id).await?;
    Ok(ApiResponse::ok("Clients fetched successfully", clients))
}

pub async fn create_client(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    payload: std::result::Result<Json<ClientRequest>, JsonRejection>,
) -> Result<ApiResponse<Client>> {
    let Json(req) = payload?;
    let new_client = req.into_new_client(&company_id)?;

    company::get_company(state.db.pool(), &company_id).await?;
    let created = client::create_client(state.db.pool(), &new_client).await?;

    info!(company_id = %company_id, client_id = %created.id, "Created client");
    Ok(ApiResponse::created("Client created successfully", created))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path((company_id, client_id)): Path<(String, String)>,
) -> Result<ApiResponse<Client>> {
    let found = client_for_company(&state, &company_id, &client_id).await?;
    Ok(ApiResponse::ok("Client fetched successfully", found))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path((company_id, client_id)): Path<(String, String)>,
    payload: std::result::Result<Json<ClientRequest>, JsonRejection>,
) -> Result<ApiResponse<Client>> {
    let Json(req) = payload?;
    let replacement = req.into_new_client(&company_id)?;

    client_for_company(&state, &company_id, &client_id).await?;
    let updated = client::update_client(state.db.pool(), &client_id, &replacement).await?;

    info!(client_id = %client_id, "Updated client");
    Ok(ApiResponse::ok("Client updated successfully", updated))
}

/// Delete a client. Its followups and transcripts go with it.
pub async fn delete_client(
    State(state): State<AppState>,
    Path((company_id, client_id)): Path<(String, String)>,
) -> Result<ApiResponse<()>> {
    client_for_company(&state, &company_id, &client_id).await?;
    client::delete_client(state.db.pool(), &client_id).await?;

    info!(client_id = %client_id, "Deleted client");
    Ok(ApiResponse::done("Client deleted successfully"))
}
