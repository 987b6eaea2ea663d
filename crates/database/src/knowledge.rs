//! Knowledge-base entries.

use sqlx::SqlitePool;

use crate::error::{new_id, DatabaseError, Result};
use crate::models::Knowledge;

const KNOWLEDGE_COLUMNS: &str = "id, company_id, title, content, created_at, updated_at";

pub async fn create_knowledge(
    pool: &SqlitePool,
    company_id: &str,
    title: &str,
    content: &str,
) -> Result<Knowledge> {
    let id = new_id();

    sqlx::query("INSERT INTO knowledge (id, company_id, title, content) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(company_id)
        .bind(title)
        .bind(content)
        .execute(pool)
        .await?;

    get_knowledge(pool, &id).await
}

pub async fn get_knowledge(pool: &SqlitePool, id: &str) -> Result<Knowledge> {
    sqlx::query_as::<_, Knowledge>(&format!(
        "SELECT {} FROM knowledge WHERE id = ?",
        KNOWLEDGE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Knowledge",
        id: id.to_string(),
    })
}

pub async fn list_knowledge(pool: &SqlitePool, company_id: &str) -> Result<Vec<Knowledge>> {
    let entries = sqlx::query_as::<_, Knowledge>(&format!(
        "SELECT {} FROM knowledge WHERE company_id = ? ORDER BY created_at DESC, rowid DESC",
        KNOWLEDGE_COLUMNS
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn update_knowledge(
    pool: &SqlitePool,
    id: &str,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<Knowledge> {
    let result = sqlx::query(
        r#"
        UPDATE knowledge
        SET title = COALESCE(?, title),
            content = COALESCE(?, content),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Knowledge",
            id: id.to_string(),
        });
    }

    get_knowledge(pool, id).await
}

pub async fn delete_knowledge(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM knowledge WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Knowledge",
            id: id.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_knowledge_crud() {
        let db = test_db().await;
        let company = seed_company(&db, "org_1").await;

        let entry = create_knowledge(db.pool(), &company.id, "Hours", "9 to 5")
            .await
            .unwrap();

        let updated = update_knowledge(db.pool(), &entry.id, None, Some("10 to 6"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Hours");
        assert_eq!(updated.content, "10 to 6");

        assert_eq!(list_knowledge(db.pool(), &company.id).await.unwrap().len(), 1);

        delete_knowledge(db.pool(), &entry.id).await.unwrap();
        assert!(get_knowledge(db.pool(), &entry.id)
            .await
            .unwrap_err()
            .is_not_found());
    }
}
