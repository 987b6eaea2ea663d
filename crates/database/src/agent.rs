//! Agent CRUD operations.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::{Agent, AgentUpdate, NewAgent};

const AGENT_COLUMNS: &str =
    "id, name, system_prompt, description, is_active, created_by, created_at, updated_at";

/// Create a new agent. Names are unique.
pub async fn create_agent(pool: &SqlitePool, agent: &NewAgent) -> Result<Agent> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO agents (id, name, system_prompt, description, created_by)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&agent.name)
    .bind(&agent.system_prompt)
    .bind(&agent.description)
    .bind(&agent.created_by)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::unique_or(e, "Agent", &agent.name))?;

    get_agent(pool, &id).await
}

/// Get an agent by ID.
pub async fn get_agent(pool: &SqlitePool, id: &str) -> Result<Agent> {
    sqlx::query_as::<_, Agent>(&format!("SELECT {} FROM agents WHERE id = ?", AGENT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Agent",
            id: id.to_string(),
        })
}

/// List all agents, newest first.
pub async fn list_agents(pool: &SqlitePool) -> Result<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>(&format!(
        "SELECT {} FROM agents ORDER BY created_at DESC, rowid DESC",
        AGENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(agents)
}

/// List agents that are switched on, by name.
pub async fn list_active_agents(pool: &SqlitePool) -> Result<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>(&format!(
        "SELECT {} FROM agents WHERE is_active = 1 ORDER BY name",
        AGENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(agents)
}

/// Apply a partial update to an agent.
pub async fn update_agent(pool: &SqlitePool, id: &str, update: &AgentUpdate) -> Result<Agent> {
    let result = sqlx::query(
        r#"
        UPDATE agents
        SET name = COALESCE(?, name),
            system_prompt = COALESCE(?, system_prompt),
            description = COALESCE(?, description),
            is_active = COALESCE(?, is_active),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&update.name)
    .bind(&update.system_prompt)
    .bind(&update.description)
    .bind(update.is_active)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::unique_or(e, "Agent", update.name.as_deref().unwrap_or(id)))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Agent",
            id: id.to_string(),
        });
    }

    get_agent(pool, id).await
}

/// Delete an agent by ID.
pub async fn delete_agent(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM agents WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Agent",
            id: id.to_string(),
        });
    }

    Ok(())
}
