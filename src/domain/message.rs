use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ConversationId;

/// A stored message. Everything except `is_read` is fixed at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub conversation_id: ConversationId,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Uuid,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    pub fn is_unread_for(&self, user_id: Uuid) -> bool {
        self.receiver_id == user_id && !self.is_read
    }

    /// The other side of the exchange as seen from `user_id`.
    pub fn counterpart_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.sender_id == user_id {
            Some(self.receiver_id)
        } else if self.receiver_id == user_id {
            Some(self.sender_id)
        } else {
            None
        }
    }
}

/// Insert payload; the store assigns `id`, `created_at` and `is_read`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub listing_id: Uuid,
    pub body: String,
}
