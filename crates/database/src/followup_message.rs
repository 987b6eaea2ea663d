//! Followup transcript operations.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::{FollowupMessage, MessageRole, NewFollowupMessage};

const MESSAGE_COLUMNS: &str =
    "id, followup_id, client_id, channel, content_type, role, content, is_read, created_at";

/// Append a transcript entry.
pub async fn insert_message(
    pool: &SqlitePool,
    message: &NewFollowupMessage,
) -> Result<FollowupMessage> {
    let id = new_id();

    sqlx::query(
        r#"
        INSERT INTO followup_messages (id, followup_id, client_id, role, content)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&message.followup_id)
    .bind(&message.client_id)
    .bind(message.role)
    .bind(&message.content)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, FollowupMessage>(&format!(
        "SELECT {} FROM followup_messages WHERE id = ?",
        MESSAGE_COLUMNS
    ))
    .bind(&id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "FollowupMessage",
        id,
    })
}

/// Full transcript of a followup in insertion order, system turn included.
pub async fn list_messages(pool: &SqlitePool, followup_id: &str) -> Result<Vec<FollowupMessage>> {
    let messages = sqlx::query_as::<_, FollowupMessage>(&format!(
        r#"
        SELECT {}
        FROM followup_messages
        WHERE followup_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
        MESSAGE_COLUMNS
    ))
    .bind(followup_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Transcript as shown to operators: user and assistant turns only.
pub async fn list_visible_messages(
    pool: &SqlitePool,
    followup_id: &str,
) -> Result<Vec<FollowupMessage>> {
    let messages = sqlx::query_as::<_, FollowupMessage>(&format!(
        r#"
        SELECT {}
        FROM followup_messages
        WHERE followup_id = ? AND role != ?
        ORDER BY created_at ASC, rowid ASC
        "#,
        MESSAGE_COLUMNS
    ))
    .bind(followup_id)
    .bind(MessageRole::System)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Delete every user and assistant turn of a followup, keeping system turns.
pub async fn delete_conversation_turns(pool: &SqlitePool, followup_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM followup_messages
        WHERE followup_id = ? AND role IN (?, ?)
        "#,
    )
    .bind(followup_id)
    .bind(MessageRole::User)
    .bind(MessageRole::Assistant)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Mark the given messages of a followup as read. Unknown ids are skipped.
pub async fn mark_read(
    pool: &SqlitePool,
    followup_id: &str,
    message_ids: &[String],
) -> Result<u64> {
    if message_ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; message_ids.len()].join(", ");
    let sql = format!(
        "UPDATE followup_messages SET is_read = 1 WHERE followup_id = ? AND id IN ({})",
        placeholders
    );

    let mut query = sqlx::query(&sql).bind(followup_id);
    for id in message_ids {
        query = query.bind(id);
    }
    let result = query.execute(pool).await?;

    Ok(result.rows_affected())
}
