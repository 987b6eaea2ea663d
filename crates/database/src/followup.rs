//! Followup CRUD operations and status transitions.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::{
    Followup, FollowupOverview, FollowupStatus, FollowupUpdate, MessageRole, NewFollowup,
};

const FOLLOWUP_COLUMNS: &str = "f.id, f.client_id, f.company_id, f.agent_id, f.followup_datetime, \
     f.context, f.is_auto_mode, f.status, f.created_at, f.updated_at";

/// Create a new followup in the `pending` state.
pub async fn create_followup(pool: &SqlitePool, followup: &NewFollowup) -> Result<Followup> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO followups
            (id, client_id, company_id, agent_id, followup_datetime, context, is_auto_mode, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&followup.client_id)
    .bind(&followup.company_id)
    .bind(&followup.agent_id)
    .bind(&followup.followup_datetime)
    .bind(&followup.context)
    .bind(followup.is_auto_mode)
    .bind(FollowupStatus::Pending)
    .execute(pool)
    .await?;

    get_followup(pool, &id).await
}

/// Create a `pending` followup together with its system turn.
///
/// Both rows are written in one transaction, so no reader ever sees the
/// followup without its system turn. `render` builds the system turn from
/// the stored followup.
pub async fn create_with_system_turn<F>(
    pool: &SqlitePool,
    followup: &NewFollowup,
    render: F,
) -> Result<Followup>
where
    F: FnOnce(&Followup) -> String,
{
    let id = new_id();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO followups
            (id, client_id, company_id, agent_id, followup_datetime, context, is_auto_mode, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&followup.client_id)
    .bind(&followup.company_id)
    .bind(&followup.agent_id)
    .bind(&followup.followup_datetime)
    .bind(&followup.context)
    .bind(followup.is_auto_mode)
    .bind(FollowupStatus::Pending)
    .execute(&mut *tx)
    .await?;

    let created = sqlx::query_as::<_, Followup>(&format!(
        "SELECT {} FROM followups f WHERE f.id = ?",
        FOLLOWUP_COLUMNS
    ))
    .bind(&id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO followup_messages (id, followup_id, client_id, role, content)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_id())
    .bind(&created.id)
    .bind(&created.client_id)
    .bind(MessageRole::System)
    .bind(render(&created))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
}

/// Get a followup by ID.
pub async fn get_followup(pool: &SqlitePool, id: &str) -> Result<Followup> {
    sqlx::query_as::<_, Followup>(&format!(
        "SELECT {} FROM followups f WHERE f.id = ?",
        FOLLOWUP_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Followup",
        id: id.to_string(),
    })
}

/// List a company's followups with client and agent names, newest first.
pub async fn list_overviews(pool: &SqlitePool, company_id: &str) -> Result<Vec<FollowupOverview>> {
    let rows = sqlx::query_as::<_, FollowupOverview>(&format!(
        r#"
        SELECT {},
               c.name AS client_name,
               c.phone AS client_phone,
               c.country_code AS client_country_code,
               a.name AS agent_name
        FROM followups f
        JOIN clients c ON c.id = f.client_id
        LEFT JOIN agents a ON a.id = f.agent_id
        WHERE f.company_id = ?
        ORDER BY f.created_at DESC, f.rowid DESC
        "#,
        FOLLOWUP_COLUMNS
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Apply a partial update to a followup's editable fields.
///
/// Status cannot be changed here; use the lifecycle operations.
pub async fn update_followup(
    pool: &SqlitePool,
    id: &str,
    update: &FollowupUpdate,
) -> Result<Followup> {
    let result = sqlx::query(
        r#"
        UPDATE followups
        SET client_id = COALESCE(?, client_id),
            agent_id = COALESCE(?, agent_id),
            followup_datetime = COALESCE(?, followup_datetime),
            context = COALESCE(?, context),
            is_auto_mode = COALESCE(?, is_auto_mode),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&update.client_id)
    .bind(&update.agent_id)
    .bind(&update.followup_datetime)
    .bind(&update.context)
    .bind(update.is_auto_mode)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Followup",
            id: id.to_string(),
        });
    }

    get_followup(pool, id).await
}

/// Delete a followup and its transcript.
pub async fn delete_followup(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM followups WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Followup",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Unconditionally set a followup's status.
pub async fn set_status(pool: &SqlitePool, id: &str, status: FollowupStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE followups
        SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Followup",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Move a followup to `to` only if its current status is one of `expected`.
///
/// Returns `false` when the row exists but was in another state, and
/// `NotFound` when there is no such followup.
pub async fn compare_and_set_status(
    pool: &SqlitePool,
    id: &str,
    expected: &[FollowupStatus],
    to: FollowupStatus,
) -> Result<bool> {
    if expected.is_empty() {
        get_followup(pool, id).await?;
        return Ok(false);
    }

    let placeholders = vec!["?"; expected.len()].join(", ");
    let sql = format!(
        r#"
        UPDATE followups
        SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status IN ({})
        "#,
        placeholders
    );

    let mut query = sqlx::query(&sql).bind(to).bind(id);
    for status in expected {
        query = query.bind(*status);
    }
    let result = query.execute(pool).await?;

    if result.rows_affected() == 0 {
        // Distinguish a lost race from a missing row.
        get_followup(pool, id).await?;
        return Ok(false);
    }

    Ok(true)
}

/// Find the followup an inbound message from `address` belongs to.
///
/// Only non-completed followups are considered. An `in_progress` followup
/// wins over a `pending` one; ties go to the most recently created.
pub async fn find_for_relay_address(pool: &SqlitePool, address: &str) -> Result<Option<Followup>> {
    let followup = sqlx::query_as::<_, Followup>(&format!(
        r#"
        SELECT {}
        FROM followups f
        JOIN clients c ON c.id = f.client_id
        WHERE replace(c.country_code, '+', '') || c.phone = ?
          AND f.status != 'completed'
        ORDER BY CASE f.status WHEN 'in_progress' THEN 0 ELSE 1 END,
                 f.created_at DESC,
                 f.rowid DESC
        LIMIT 1
        "#,
        FOLLOWUP_COLUMNS
    ))
    .bind(address)
    .fetch_optional(pool)
    .await?;

    Ok(followup)
}
