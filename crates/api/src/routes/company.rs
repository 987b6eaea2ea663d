//! Company routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::validation::{validate_required, MAX_NAME_LENGTH};
use database::{agent, company, AgentSummary, Company, NewCompany};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::response::ApiResponse;
use crate::state::AppState;

/// A company with the agents assigned to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    #[serde(flatten)]
    pub company: Company,
    pub agents: Vec<AgentSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    /// Replaces the assigned agents when present.
    pub agents: Option<Vec<String>>,
}

fn validate_company(name: &str, location: &str) -> Result<()> {
    validate_required("name", name, MAX_NAME_LENGTH)?;
    validate_required("location", location, MAX_NAME_LENGTH)?;
    Ok(())
}

async fn view(state: &AppState, company: Company) -> Result<CompanyView> {
    let agents = company::list_agents(state.db.pool(), &company.id).await?;
    Ok(CompanyView { company, agents })
}

/// Provision an organisation at the identity provider, then store the company.
pub async fn create_company(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> Result<ApiResponse<Company>> {
    let Json(req) = payload?;
    validate_company(&req.name, &req.location)?;

    let name = req.name.trim();
    let external_org_id = state.identity.create_organization(name).await?;

    let created = company::create_company(
        state.db.pool(),
        &NewCompany {
            name: name.to_string(),
            location: req.location.trim().to_string(),
            external_org_id,
        },
    )
    .await?;

    info!(company_id = %created.id, org = %created.external_org_id, "Created company");
    Ok(ApiResponse::created("Company created successfully", created))
}

pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CompanyView>>> {
    let companies = company::list_companies(state.db.pool()).await?;

    let mut views = Vec::with_capacity(companies.len());
    for c in companies {
        views.push(view(&state, c).await?);
    }

    Ok(ApiResponse::ok("Companies fetched successfully", views))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<CompanyView>> {
    let found = company::get_company(state.db.pool(), &company_id).await?;
    Ok(ApiResponse::ok("Company fetched successfully", view(&state, found).await?))
}

pub async fn get_company_by_org(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<ApiResponse<CompanyView>> {
    let found = company::get_company_by_org(state.db.pool(), &org_id).await?;
    Ok(ApiResponse::ok("Company fetched successfully", view(&state, found).await?))
}

/// Update name and location, and replace the agent assignments if given.
pub async fn update_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    payload: std::result::Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> Result<ApiResponse<CompanyView>> {
    let Json(req) = payload?;
    validate_company(&req.name, &req.location)?;

    let pool = state.db.pool();
    company::get_company(pool, &company_id).await?;

    if let Some(agent_ids) = &req.agents {
        for agent_id in agent_ids {
            agent::get_agent(pool, agent_id).await?;
        }
    }

    company::update_company(pool, &company_id, req.name.trim(), req.location.trim()).await?;
    if let Some(agent_ids) = &req.agents {
        company::set_agents(pool, &company_id, agent_ids).await?;
    }

    let updated = company::get_company(pool, &company_id).await?;
    info!(company_id = %company_id, "Updated company");
    Ok(ApiResponse::ok("Company updated successfully", view(&state, updated).await?))
}
