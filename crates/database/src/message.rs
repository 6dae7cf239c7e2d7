//! Append-only message storage.

use analyst_core::{Role, ValidationError};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::Message;
use crate::validation::prepare_content;

/// Append a message to a conversation.
///
/// Content is length-checked and sanitized before the insert, and the
/// conversation's `updated_at` is bumped afterwards. Existing rows are never
/// modified.
pub async fn append_message(
    pool: &SqlitePool,
    conversation_id: &str,
    role: Role,
    content: &str,
) -> Result<Message> {
    if role == Role::System {
        return Err(ValidationError::InvalidRole {
            field: "role".to_string(),
            role: role.to_string(),
        }
        .into());
    }

    let content = prepare_content(content)?;
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO messages (id, conversation_id, role, content)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(conversation_id)
    .bind(role.as_str())
    .bind(&content)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::NotFound {
                    entity: "Conversation",
                    id: conversation_id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    crate::conversation::touch_conversation(pool, conversation_id).await?;

    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, role, content, created_at
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(&id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

/// All messages of a conversation in the order they were written.
pub async fn list_messages(pool: &SqlitePool, conversation_id: &str) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, role, content, created_at
        FROM messages
        WHERE conversation_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Number of messages stored for a conversation.
pub async fn count_messages(pool: &SqlitePool, conversation_id: &str) -> Result<i64> {
    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM messages
        WHERE conversation_id = ?
        "#,
    )
    .bind(conversation_id)
    .fetch_one(pool)
    .await?;

    Ok(count.0)
}
