//! Dashboard user routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use database::validation::{validate_email, validate_required, MAX_NAME_LENGTH};
use database::{company, user, NewUser, User};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::identity::NewIdentityUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<User>>> {
    company::get_company(state.db.pool(), &company_id).await?;
    let users = user::list_users(state.db.pool(), &company_id).await?;
    Ok(ApiResponse::ok("Users fetched successfully", users))
}

/// Create a login at the identity provider, as admin of the company's
/// organisation, and record the user. The password is not stored.
pub async fn create_user(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiResponse<User>> {
    let Json(req) = payload?;
    validate_email(&req.email)?;
    validate_required("password", &req.password, usize::MAX)?;
    validate_required("firstName", &req.first_name, MAX_NAME_LENGTH)?;
    validate_required("lastName", &req.last_name, MAX_NAME_LENGTH)?;

    let pool = state.db.pool();
    let owner = company::get_company(pool, &company_id).await?;

    let email = req.email.trim();
    if user::find_user_by_email(pool, email).await?.is_some() {
        return Err(ApiError::BadRequest(
            "User with this email already exists".to_string(),
        ));
    }

    let external_user_id = state
        .identity
        .create_user(NewIdentityUser {
            email,
            password: &req.password,
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            organization_id: &owner.external_org_id,
        })
        .await?;

    let created = user::create_user(
        pool,
        &NewUser {
            company_id: company_id.clone(),
            email: email.to_string(),
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            external_user_id: Some(external_user_id),
        },
    )
    .await?;

    info!(company_id = %company_id, user_id = %created.id, "Created user");
    Ok(ApiResponse::created("User created successfully", created))
}
