//! Company CRUD operations and agent assignments.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::{AgentSummary, Company, NewCompany};

const COMPANY_COLUMNS: &str =
    "id, name, location, external_org_id, whatsapp_enabled, created_at, updated_at";

/// Create a new company.
pub async fn create_company(pool: &SqlitePool, company: &NewCompany) -> Result<Company> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO companies (id, name, location, external_org_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&company.name)
    .bind(&company.location)
    .bind(&company.external_org_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::unique_or(e, "Company", &company.external_org_id))?;

    get_company(pool, &id).await
}

/// Get a company by ID.
pub async fn get_company(pool: &SqlitePool, id: &str) -> Result<Company> {
    sqlx::query_as::<_, Company>(&format!(
        "SELECT {} FROM companies WHERE id = ?",
        COMPANY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Company",
        id: id.to_string(),
    })
}

/// Get a company by its identity-provider organisation id.
pub async fn get_company_by_org(pool: &SqlitePool, external_org_id: &str) -> Result<Company> {
    sqlx::query_as::<_, Company>(&format!(
        "SELECT {} FROM companies WHERE external_org_id = ?",
        COMPANY_COLUMNS
    ))
    .bind(external_org_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Company",
        id: external_org_id.to_string(),
    })
}

/// List all companies.
pub async fn list_companies(pool: &SqlitePool) -> Result<Vec<Company>> {
    let companies = sqlx::query_as::<_, Company>(&format!(
        "SELECT {} FROM companies ORDER BY created_at",
        COMPANY_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(companies)
}

/// Update a company's name and location.
pub async fn update_company(pool: &SqlitePool, id: &str, name: &str, location: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE companies
        SET name = ?, location = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(location)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Company",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Set the WhatsApp session flag for a company.
pub async fn set_whatsapp_enabled(pool: &SqlitePool, id: &str, enabled: bool) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE companies
        SET whatsapp_enabled = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(enabled)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Company",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Replace the set of agents assigned to a company.
///
/// Unknown agent ids are reported as `NotFound` and nothing is changed.
pub async fn set_agents(pool: &SqlitePool, company_id: &str, agent_ids: &[String]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for agent_id in agent_ids {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM agents WHERE id = ?")
            .bind(agent_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Agent",
                id: agent_id.clone(),
            });
        }
    }

    sqlx::query("DELETE FROM company_agents WHERE company_id = ?")
        .bind(company_id)
        .execute(&mut *tx)
        .await?;

    for agent_id in agent_ids {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO company_agents (company_id, agent_id)
            VALUES (?, ?)
            "#,
        )
        .bind(company_id)
        .bind(agent_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// List the agents assigned to a company.
pub async fn list_agents(pool: &SqlitePool, company_id: &str) -> Result<Vec<AgentSummary>> {
    let agents = sqlx::query_as::<_, AgentSummary>(
        r#"
        SELECT a.id, a.name, a.description, a.is_active
        FROM company_agents ca
        JOIN agents a ON a.id = ca.agent_id
        WHERE ca.company_id = ?
        ORDER BY a.name
        "#,
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(agents)
}
