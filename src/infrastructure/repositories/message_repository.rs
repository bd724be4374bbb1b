use super::traits::MessageRepository;
use crate::domain::{ConversationId, Message, NewMessage};
use crate::error::AppResult;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, receiver_id, listing_id, body, is_read, created_at";

pub struct MessageRepositoryImpl {
    pool: PgPool,
}

impl MessageRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for MessageRepositoryImpl {
    async fn insert(&self, message: &NewMessage) -> AppResult<Message> {
        let created = sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (conversation_id, sender_id, receiver_id, listing_id, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message.conversation_id.as_str())
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.listing_id)
        .bind(&message.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> AppResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn find_by_participant(&self, user_id: Uuid) -> AppResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE sender_id = $1 OR receiver_id = $1
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn mark_read(
        &self,
        conversation_id: &ConversationId,
        receiver_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE conversation_id = $1 AND receiver_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(conversation_id.as_str())
        .bind(receiver_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
