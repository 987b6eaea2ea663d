//! Dashboard user records.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, company_id, email, first_name, last_name, external_user_id, \
     is_active, created_at, updated_at";

/// Create a new user. Emails are unique across companies.
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<User> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO users (id, company_id, email, first_name, last_name, external_user_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&user.company_id)
    .bind(user.email.trim().to_lowercase())
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.external_user_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::unique_or(e, "User", &user.email))?;

    get_user(pool, &id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        })
}

/// Look up a user by email, case-insensitively.
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// List the users of a company.
pub async fn list_users(pool: &SqlitePool, company_id: &str) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE company_id = ? ORDER BY created_at DESC, rowid DESC",
        USER_COLUMNS
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
