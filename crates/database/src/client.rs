//! Client CRUD operations.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::{Client, NewClient};

const CLIENT_COLUMNS: &str =
    "id, company_id, name, phone, country_code, status, created_at, updated_at";

/// Create a new client.
pub async fn create_client(pool: &SqlitePool, client: &NewClient) -> Result<Client> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO clients (id, company_id, name, phone, country_code, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&client.company_id)
    .bind(&client.name)
    .bind(&client.phone)
    .bind(&client.country_code)
    .bind(&client.status)
    .execute(pool)
    .await?;

    get_client(pool, &id).await
}

/// Get a client by ID.
pub async fn get_client(pool: &SqlitePool, id: &str) -> Result<Client> {
    sqlx::query_as::<_, Client>(&format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Client",
            id: id.to_string(),
        })
}

/// List the clients of a company.
pub async fn list_clients(pool: &SqlitePool, company_id: &str) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(&format!(
        "SELECT {} FROM clients WHERE company_id = ? ORDER BY created_at",
        CLIENT_COLUMNS
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Replace a client's editable fields. The client must belong to the company.
pub async fn update_client(pool: &SqlitePool, id: &str, client: &NewClient) -> Result<Client> {
    let result = sqlx::query(
        r#"
        UPDATE clients
        SET name = ?, phone = ?, country_code = ?, status = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND company_id = ?
        "#,
    )
    .bind(&client.name)
    .bind(&client.phone)
    .bind(&client.country_code)
    .bind(&client.status)
    .bind(id)
    .bind(&client.company_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Client",
            id: id.to_string(),
        });
    }

    get_client(pool, id).await
}

/// Delete a client by ID. Its followups go with it.
pub async fn delete_client(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Client",
            id: id.to_string(),
        });
    }

    Ok(())
}
